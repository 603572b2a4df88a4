//! Subscription plan entity.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::serde_helpers::nullable;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: Uuid,
    pub name: String,
    /// Monthly price
    pub price: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub features: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub popular: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct NewSubscription {
    #[validate(length(min = 1, message = "Plan name cannot be empty"))]
    pub name: String,
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: f64,
    #[serde(default)]
    pub features: Vec<String>,
}
