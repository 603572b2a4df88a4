//! Catalog browsing: services, reviews and subscription plans.
//!
//! Reads go through the fallback policy, so a failed load prints the
//! sample dataset with a banner instead of an error.

use serde_json::json;

use common::AppResult;
use domain::NewReview;
use marketplace_service::{fallback, load_or_fallback, parallel, DataSource, Loaded};

use crate::cli::args::{ReviewsAction, ServicesAction, SubscriptionsAction};
use crate::context::AppContext;
use crate::output;

pub async fn services(action: ServicesAction, ctx: &AppContext) -> AppResult<()> {
    let catalog = ctx.services.catalog();

    match action {
        ServicesAction::List => {
            let loaded = load_or_fallback(catalog.get_services().await, fallback::services);
            ctx.output.notice_source(&loaded);
            let page_size = ctx.config.default_page_size;
            ctx.output.emit(&loaded.data, |services| {
                let shown = &services[..services.len().min(page_size)];
                let mut text = output::service_list(shown);
                if services.len() > shown.len() {
                    text.push_str(&format!("\n... {} more", services.len() - shown.len()));
                }
                text
            })
        }
        ServicesAction::Search { query } => {
            let loaded = load_or_fallback(catalog.search_services(&query).await, || {
                fallback::search_services(&query)
            });
            ctx.output.notice_source(&loaded);
            ctx.output
                .emit(&loaded.data, |services| output::service_list(services))
        }
        ServicesAction::Show { id } => {
            let reviews = ctx.services.reviews();
            let result = parallel::join2(catalog.get_service(id), reviews.get_reviews(id)).await;

            let loaded = match result {
                Ok(data) => Loaded {
                    data,
                    source: DataSource::Backend,
                },
                Err(e) if e.is_not_found() => return Err(e),
                Err(e) => match fallback::service(id) {
                    Some(service) => load_or_fallback(Err(e), || (service, fallback::reviews(id))),
                    None => return Err(e),
                },
            };
            ctx.output.notice_source(&loaded);

            let (service, reviews) = &loaded.data;
            ctx.output.emit(
                &json!({ "service": service, "reviews": reviews }),
                |_| output::service_detail(service, reviews),
            )
        }
    }
}

pub async fn reviews(action: ReviewsAction, ctx: &AppContext) -> AppResult<()> {
    let reviews = ctx.services.reviews();

    match action {
        ReviewsAction::List { service } => {
            let loaded = load_or_fallback(reviews.get_reviews(service).await, || {
                fallback::reviews(service)
            });
            ctx.output.notice_source(&loaded);
            ctx.output.emit(&loaded.data, |reviews| {
                if reviews.is_empty() {
                    "No reviews yet".to_string()
                } else {
                    reviews
                        .iter()
                        .map(output::review_line)
                        .collect::<Vec<_>>()
                        .join("\n")
                }
            })
        }
        ReviewsAction::Add {
            service,
            rating,
            comment,
        } => {
            let review = NewReview {
                service_id: service,
                user_id: ctx.identity().await?,
                rating,
                comment,
            };
            let created = reviews.create_review(review).await?;
            ctx.output.emit(&created, |r| format!("Review posted: {}", r.stars()))
        }
    }
}

pub async fn subscriptions(action: SubscriptionsAction, ctx: &AppContext) -> AppResult<()> {
    match action {
        SubscriptionsAction::List => {
            let loaded = load_or_fallback(
                ctx.services.subscriptions().get_subscriptions().await,
                fallback::subscriptions,
            );
            ctx.output.notice_source(&loaded);
            ctx.output.emit(&loaded.data, |plans| {
                plans
                    .iter()
                    .map(output::plan_line)
                    .collect::<Vec<_>>()
                    .join("\n\n")
            })
        }
    }
}
