//! Review entity. Reviews are append-only from the client's side.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::constants::MAX_RATING;
use crate::serde_helpers::nullable;

/// Reviewer details joined from `users(name, avatar)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewAuthor {
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub service_id: Uuid,
    pub user_id: Uuid,
    pub rating: u8,
    #[serde(default, deserialize_with = "nullable")]
    pub comment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<ReviewAuthor>,
}

impl Review {
    /// Five-slot star bar, e.g. "★★★★☆"
    pub fn stars(&self) -> String {
        let slots = usize::from(MAX_RATING);
        let filled = usize::from(self.rating.min(MAX_RATING));
        format!("{}{}", "★".repeat(filled), "☆".repeat(slots - filled))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct NewReview {
    pub service_id: Uuid,
    pub user_id: Uuid,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: u8,
    #[validate(length(min = 1, message = "Comment cannot be empty"))]
    pub comment: String,
}
