//! Subscription plan service.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use common::AppResult;
use data_client::{DataClient, Order, Query, Table};
use domain::{NewSubscription, Subscription, Validated};

use crate::rows::{decode_all, decode_first, encode};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

const COLUMN_PRICE: &str = "price";

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait SubscriptionService: Send + Sync {
    /// Plans, cheapest first
    async fn get_subscriptions(&self) -> AppResult<Vec<Subscription>>;

    async fn create_subscription(&self, plan: NewSubscription) -> AppResult<Subscription>;
}

pub struct SubscriptionManager {
    client: Arc<dyn DataClient>,
}

impl SubscriptionManager {
    pub fn new(client: Arc<dyn DataClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SubscriptionService for SubscriptionManager {
    async fn get_subscriptions(&self) -> AppResult<Vec<Subscription>> {
        let query = Query::new().order(Order::asc(COLUMN_PRICE));
        let rows = self.client.query(Table::Subscriptions, query).await?;
        decode_all(Table::Subscriptions, rows)
    }

    async fn create_subscription(&self, plan: NewSubscription) -> AppResult<Subscription> {
        let plan = plan.validated()?;

        let rows = self
            .client
            .insert(Table::Subscriptions, vec![encode(&plan)?])
            .await?;
        let created: Subscription = decode_first(Table::Subscriptions, rows)?;

        info!("Subscription plan '{}' created", created.name);
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_client::MockDataClient;
    use serde_json::json;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_get_subscriptions_orders_by_price() {
        let mut client = MockDataClient::new();
        client
            .expect_query()
            .withf(|table, query| {
                *table == Table::Subscriptions && query.order == Some(Order::asc("price"))
            })
            .times(1)
            .returning(|_, _| {
                Ok(vec![json!({
                    "id": Uuid::from_u128(1),
                    "name": "Basic Plan",
                    "price": 99,
                    "features": null
                })])
            });

        let manager = SubscriptionManager::new(Arc::new(client));
        let plans = manager.get_subscriptions().await.unwrap();

        assert_eq!(plans[0].price, 99.0);
        assert!(plans[0].features.is_empty());
        assert!(!plans[0].popular);
    }

    #[tokio::test]
    async fn test_create_subscription_returns_inserted_row() {
        let mut client = MockDataClient::new();
        client
            .expect_insert()
            .withf(|table, rows| {
                *table == Table::Subscriptions
                    && rows
                        == &vec![json!({
                            "name": "Enterprise Plan",
                            "price": 499.0,
                            "features": ["Dedicated engineer", "24/7 support"]
                        })]
            })
            .times(1)
            .returning(|_, rows| {
                let mut row = rows[0].clone();
                row["id"] = json!(Uuid::from_u128(0x204));
                row["popular"] = json!(false);
                Ok(vec![row])
            });

        let manager = SubscriptionManager::new(Arc::new(client));
        let created = manager
            .create_subscription(NewSubscription {
                name: "Enterprise Plan".to_string(),
                price: 499.0,
                features: vec!["Dedicated engineer".to_string(), "24/7 support".to_string()],
            })
            .await
            .unwrap();

        assert_eq!(
            created,
            Subscription {
                id: Uuid::from_u128(0x204),
                name: "Enterprise Plan".to_string(),
                price: 499.0,
                features: vec!["Dedicated engineer".to_string(), "24/7 support".to_string()],
                popular: false,
            }
        );
    }

    #[tokio::test]
    async fn test_create_subscription_requires_name() {
        let manager = SubscriptionManager::new(Arc::new(MockDataClient::new()));
        let plan = NewSubscription {
            name: String::new(),
            price: 10.0,
            features: vec![],
        };

        assert!(manager.create_subscription(plan).await.is_err());
    }
}
