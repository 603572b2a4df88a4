//! Terminal rendering: plain text by default, JSON with `--json`.

use serde::Serialize;

use common::{AppError, AppResult};
use domain::{Booking, Review, Service, Subscription, UserProfile};
use marketplace_service::{DataSource, Loaded};

#[derive(Debug, Clone, Copy, Default)]
pub struct Output {
    json: bool,
}

impl Output {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    /// Print `value` as JSON, or as the text `render` produces.
    pub fn emit<T: Serialize>(
        &self,
        value: &T,
        render: impl FnOnce(&T) -> String,
    ) -> AppResult<()> {
        if self.json {
            let json = serde_json::to_string_pretty(value)
                .map_err(|e| AppError::storage(format!("failed to encode output: {}", e)))?;
            println!("{}", json);
        } else {
            println!("{}", render(value));
        }
        Ok(())
    }

    /// One-line confirmation
    pub fn message(&self, text: &str) -> AppResult<()> {
        self.emit(&serde_json::json!({ "message": text }), |_| text.to_string())
    }

    /// Banner on stderr when a load was served from the sample dataset.
    pub fn notice_source<T>(&self, loaded: &Loaded<T>) {
        if let DataSource::Fallback { error } = &loaded.source {
            eprintln!("Showing sample data: {}", error.user_message());
        }
    }
}

pub fn price(amount: f64) -> String {
    format!("${:.2}", amount)
}

pub fn service_line(service: &Service) -> String {
    format!(
        "{}  {:<32} {:<14} {:>10}  {:.1} ({} reviews)",
        service.id,
        service.title,
        service.category,
        price(service.price),
        service.rating,
        service.reviews_count
    )
}

pub fn service_list(services: &[Service]) -> String {
    if services.is_empty() {
        return "No services found".to_string();
    }
    services
        .iter()
        .map(service_line)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn service_detail(service: &Service, reviews: &[Review]) -> String {
    let mut lines = vec![
        service.title.clone(),
        format!("{} | {} | {}", service.category, service.duration, price(service.price)),
        format!("Rating {:.1} from {} reviews", service.rating, service.reviews_count),
    ];
    if !service.description.is_empty() {
        lines.push(String::new());
        lines.push(service.description.clone());
    }
    lines.push(String::new());
    if reviews.is_empty() {
        lines.push("No reviews yet".to_string());
    } else {
        lines.extend(reviews.iter().map(review_line));
    }
    lines.join("\n")
}

pub fn review_line(review: &Review) -> String {
    let author = review
        .user
        .as_ref()
        .map(|u| u.name.as_str())
        .unwrap_or("Anonymous");
    format!("{} {}: {}", review.stars(), author, review.comment)
}

pub fn booking_line(booking: &Booking) -> String {
    let title = booking
        .service
        .as_ref()
        .map(|s| s.title.as_str())
        .unwrap_or("Unknown service");
    format!(
        "{}  {} {:<9} {:<28} {:<12} {:>10}",
        booking.id,
        booking.date,
        booking.time,
        title,
        booking.status.label(),
        price(booking.price)
    )
}

/// Bookings split into the current and history tabs
pub fn booking_tabs(current: &[Booking], history: &[Booking]) -> String {
    let section = |title: &str, items: &[Booking]| {
        let body = if items.is_empty() {
            "  none".to_string()
        } else {
            items
                .iter()
                .map(|b| format!("  {}", booking_line(b)))
                .collect::<Vec<_>>()
                .join("\n")
        };
        format!("{} ({})\n{}", title, items.len(), body)
    };
    format!("{}\n\n{}", section("Current", current), section("History", history))
}

pub fn plan_line(plan: &Subscription) -> String {
    let badge = if plan.popular { "  [popular]" } else { "" };
    format!(
        "{} {}/month{}\n{}",
        plan.name,
        price(plan.price),
        badge,
        plan.features
            .iter()
            .map(|f| format!("  - {}", f))
            .collect::<Vec<_>>()
            .join("\n")
    )
}

pub fn profile_text(profile: &UserProfile) -> String {
    let or_dash = |value: &str| {
        if value.is_empty() {
            "-".to_string()
        } else {
            value.to_string()
        }
    };
    format!(
        "{} ({})\nEmail: {}\nPhone: {}\nMember since {}",
        profile.name,
        profile.initials(),
        or_dash(&profile.email),
        or_dash(&profile.phone),
        profile.created_at.format("%B %Y")
    )
}
