//! Catalog service entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::serde_helpers::nullable;

/// A manufacturing service offered in the catalog. Read-only for clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: Uuid,
    pub title: String,
    #[serde(default, deserialize_with = "nullable")]
    pub description: String,
    /// Starting hourly price
    #[serde(default, deserialize_with = "nullable")]
    pub price: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub category: String,
    /// Typical turnaround, e.g. "2-5 days"
    #[serde(default, deserialize_with = "nullable")]
    pub duration: String,
    #[serde(default, deserialize_with = "nullable")]
    pub rating: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub reviews_count: u32,
    #[serde(default, deserialize_with = "nullable")]
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Service {
    /// Case-insensitive substring match over title, description and category.
    pub fn matches_query(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        [&self.title, &self.description, &self.category]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}
