//! Profile service - the `users` row that mirrors an auth identity.
//!
//! Both operations recover from a missing row: reads synthesize a
//! placeholder profile, writes fall back to inserting the row.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use common::{AppError, AppResult};
use data_client::{query_single, DataClient, Filter, Query, Table};
use domain::{ProfileUpdate, UserProfile, Validated, COLUMN_ID};

use crate::rows::{decode, decode_first, encode};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ProfileService: Send + Sync {
    /// Profile for `id`, or a placeholder when no row exists yet
    async fn get_user_profile(&self, id: Uuid) -> AppResult<UserProfile>;

    /// Update the row, inserting it when it does not exist
    async fn update_user_profile(&self, id: Uuid, update: ProfileUpdate) -> AppResult<UserProfile>;
}

pub struct ProfileManager {
    client: Arc<dyn DataClient>,
}

impl ProfileManager {
    pub fn new(client: Arc<dyn DataClient>) -> Self {
        Self { client }
    }

    async fn insert_profile(&self, id: Uuid, patch: Value) -> AppResult<UserProfile> {
        let mut row = match patch {
            Value::Object(map) => map,
            _ => return Err(AppError::validation("Profile update must be an object")),
        };
        row.insert(COLUMN_ID.to_string(), Value::String(id.to_string()));

        let rows = self
            .client
            .insert(Table::Users, vec![Value::Object(row)])
            .await?;
        info!("Profile row created for {}", id);
        decode_first(Table::Users, rows)
    }
}

#[async_trait]
impl ProfileService for ProfileManager {
    async fn get_user_profile(&self, id: Uuid) -> AppResult<UserProfile> {
        let query = Query::new().filter(Filter::eq(COLUMN_ID, id));
        match query_single(self.client.as_ref(), Table::Users, query).await {
            Ok(row) => decode(Table::Users, row),
            Err(e) if e.is_not_found() => {
                warn!("No profile row for {}, using placeholder", id);
                Ok(UserProfile::placeholder(id))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn update_user_profile(&self, id: Uuid, update: ProfileUpdate) -> AppResult<UserProfile> {
        if update.is_empty() {
            return Err(AppError::validation("Profile update has no changes"));
        }
        let update = update.validated()?;
        let patch = encode(&update)?;

        let updated = self
            .client
            .update(Table::Users, vec![Filter::eq(COLUMN_ID, id)], patch.clone())
            .await;

        match updated {
            Ok(rows) if !rows.is_empty() => decode_first(Table::Users, rows),
            Ok(_) => self.insert_profile(id, patch).await,
            Err(e) if e.is_not_found() => self.insert_profile(id, patch).await,
            Err(e) => Err(e.into()),
        }
    }
}
