//! Data client contract.

use async_trait::async_trait;
use serde_json::Value;

use common::BackendError;

use crate::query::{Filter, Query};
use crate::table::Table;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Result type for table operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Generic executor for table operations.
///
/// Every call is a single request/response round trip; nothing is cached.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait DataClient: Send + Sync {
    /// Read rows matching `query`
    async fn query(&self, table: Table, query: Query) -> BackendResult<Vec<Value>>;

    /// Insert rows and return them as stored
    async fn insert(&self, table: Table, rows: Vec<Value>) -> BackendResult<Vec<Value>>;

    /// Apply `patch` to every row matching `filters` and return the updated rows
    async fn update(
        &self,
        table: Table,
        filters: Vec<Filter>,
        patch: Value,
    ) -> BackendResult<Vec<Value>>;

    /// Delete every row matching `filters`
    async fn remove(&self, table: Table, filters: Vec<Filter>) -> BackendResult<()>;
}

/// Read exactly one row; zero rows is `NotFound`, several is a rejection.
pub async fn query_single(
    client: &dyn DataClient,
    table: Table,
    query: Query,
) -> BackendResult<Value> {
    let mut rows = client.query(table, query).await?;
    match rows.len() {
        0 => Err(BackendError::not_found(table.as_str())),
        1 => Ok(rows.remove(0)),
        n => Err(BackendError::Rejected {
            code: common::error::CODE_NO_ROWS.to_string(),
            message: format!("expected a single {} row, got {}", table, n),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_query_single_one_row() {
        let mut client = MockDataClient::new();
        client
            .expect_query()
            .returning(|_, _| Ok(vec![json!({ "id": "a" })]));

        let row = query_single(&client, Table::Services, Query::new()).await.unwrap();
        assert_eq!(row["id"], "a");
    }

    #[tokio::test]
    async fn test_query_single_zero_rows() {
        let mut client = MockDataClient::new();
        client.expect_query().returning(|_, _| Ok(vec![]));

        let err = query_single(&client, Table::Services, Query::new())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_query_single_many_rows() {
        let mut client = MockDataClient::new();
        client
            .expect_query()
            .returning(|_, _| Ok(vec![json!({}), json!({})]));

        let err = query_single(&client, Table::Users, Query::new())
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Rejected { .. }));
    }
}
