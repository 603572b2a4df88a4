//! Catalog service - read-only access to the services table.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use common::AppResult;
use data_client::{query_single, DataClient, Filter, Order, Query, Table};
use domain::{Service, COLUMN_CREATED_AT, COLUMN_ID, SEARCH_COLUMNS};

use crate::rows::{decode, decode_all};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Catalog service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// All services, newest first
    async fn get_services(&self) -> AppResult<Vec<Service>>;

    /// Exactly one service; fails with not-found when absent
    async fn get_service(&self, id: Uuid) -> AppResult<Service>;

    /// Services whose title, description or category contains `query`
    async fn search_services(&self, query: &str) -> AppResult<Vec<Service>>;
}

/// Concrete implementation of CatalogService over a data client.
pub struct Catalog {
    client: Arc<dyn DataClient>,
}

impl Catalog {
    pub fn new(client: Arc<dyn DataClient>) -> Self {
        Self { client }
    }
}

/// OR group matching `term` in every searchable column.
fn search_filter(term: &str) -> Filter {
    Filter::or(
        SEARCH_COLUMNS
            .iter()
            .map(|column| Filter::contains(*column, term))
            .collect(),
    )
}

#[async_trait]
impl CatalogService for Catalog {
    async fn get_services(&self) -> AppResult<Vec<Service>> {
        let query = Query::new().order(Order::desc(COLUMN_CREATED_AT));
        let rows = self.client.query(Table::Services, query).await?;
        decode_all(Table::Services, rows)
    }

    async fn get_service(&self, id: Uuid) -> AppResult<Service> {
        let query = Query::new().filter(Filter::eq(COLUMN_ID, id));
        let row = query_single(self.client.as_ref(), Table::Services, query).await?;
        decode(Table::Services, row)
    }

    async fn search_services(&self, query: &str) -> AppResult<Vec<Service>> {
        let term = query.trim();
        if term.is_empty() {
            return self.get_services().await;
        }

        debug!("Searching services for '{}'", term);
        let query = Query::new()
            .filter(search_filter(term))
            .order(Order::desc(COLUMN_CREATED_AT));
        let rows = self.client.query(Table::Services, query).await?;
        decode_all(Table::Services, rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{AppError, BackendError};
    use data_client::MockDataClient;
    use serde_json::json;

    fn service_row(id: u128, title: &str) -> serde_json::Value {
        json!({
            "id": Uuid::from_u128(id),
            "title": title,
            "description": null,
            "price": 50,
            "category": "Machining",
            "created_at": "2024-01-01T00:00:00Z"
        })
    }

    #[tokio::test]
    async fn test_get_services_orders_newest_first() {
        let mut client = MockDataClient::new();
        client
            .expect_query()
            .withf(|table, query| {
                *table == Table::Services
                    && query.order == Some(Order::desc("created_at"))
                    && query.filters.is_empty()
            })
            .times(1)
            .returning(|_, _| Ok(vec![service_row(1, "CNC Machining")]));

        let catalog = Catalog::new(Arc::new(client));
        let services = catalog.get_services().await.unwrap();

        assert_eq!(services.len(), 1);
        assert_eq!(services[0].title, "CNC Machining");
        assert_eq!(services[0].description, "");
    }

    #[tokio::test]
    async fn test_get_service_not_found() {
        let mut client = MockDataClient::new();
        client.expect_query().returning(|_, _| Ok(vec![]));

        let catalog = Catalog::new(Arc::new(client));
        let err = catalog.get_service(Uuid::from_u128(9)).await.unwrap_err();

        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_search_builds_or_group() {
        let mut client = MockDataClient::new();
        client
            .expect_query()
            .withf(|_, query| {
                query.filters
                    == vec![Filter::or(vec![
                        Filter::contains("title", "weld"),
                        Filter::contains("description", "weld"),
                        Filter::contains("category", "weld"),
                    ])]
            })
            .times(1)
            .returning(|_, _| Ok(vec![service_row(3, "Welding Services")]));

        let catalog = Catalog::new(Arc::new(client));
        let services = catalog.search_services("  weld ").await.unwrap();

        assert_eq!(services[0].title, "Welding Services");
    }

    #[tokio::test]
    async fn test_blank_search_lists_everything() {
        let mut client = MockDataClient::new();
        client
            .expect_query()
            .withf(|_, query| query.filters.is_empty())
            .times(1)
            .returning(|_, _| Ok(vec![]));

        let catalog = Catalog::new(Arc::new(client));
        assert!(catalog.search_services("   ").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_backend_error_propagates() {
        let mut client = MockDataClient::new();
        client
            .expect_query()
            .returning(|_, _| Err(BackendError::Network("timed out".to_string())));

        let catalog = Catalog::new(Arc::new(client));
        let err = catalog.get_services().await.unwrap_err();

        assert_eq!(
            err,
            AppError::Backend(BackendError::Network("timed out".to_string()))
        );
    }
}
