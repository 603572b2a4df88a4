//! Review service. Reviews are append-only.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use common::AppResult;
use data_client::{DataClient, Embed, Filter, Order, Query, Select, Table};
use domain::{
    NewReview, Review, Validated, COLUMN_CREATED_AT, COLUMN_SERVICE_ID, COLUMN_USER_ID,
};

use crate::rows::{decode_all, decode_first, encode};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ReviewService: Send + Sync {
    /// Reviews for a service, newest first, with author name and avatar
    async fn get_reviews(&self, service_id: Uuid) -> AppResult<Vec<Review>>;

    async fn create_review(&self, review: NewReview) -> AppResult<Review>;
}

pub struct ReviewManager {
    client: Arc<dyn DataClient>,
}

impl ReviewManager {
    pub fn new(client: Arc<dyn DataClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ReviewService for ReviewManager {
    async fn get_reviews(&self, service_id: Uuid) -> AppResult<Vec<Review>> {
        let author = Embed::new("user", Table::Users, COLUMN_USER_ID).columns(["name", "avatar"]);
        let query = Query::new()
            .select(Select::all().embed(author))
            .filter(Filter::eq(COLUMN_SERVICE_ID, service_id))
            .order(Order::desc(COLUMN_CREATED_AT));

        let rows = self.client.query(Table::Reviews, query).await?;
        decode_all(Table::Reviews, rows)
    }

    async fn create_review(&self, review: NewReview) -> AppResult<Review> {
        let review = review.validated()?;

        let rows = self
            .client
            .insert(Table::Reviews, vec![encode(&review)?])
            .await?;
        let created: Review = decode_first(Table::Reviews, rows)?;

        info!("Review {} added to service {}", created.id, created.service_id);
        Ok(created)
    }
}
