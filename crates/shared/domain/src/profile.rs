//! User profile entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::constants::DEFAULT_PROFILE_NAME;
use crate::serde_helpers::nullable;

/// Profile row in the `users` table, keyed by the auth identity id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    #[serde(default, deserialize_with = "nullable")]
    pub email: String,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub phone: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    /// Profile synthesized when the identity has no backing row yet.
    pub fn placeholder(id: Uuid) -> Self {
        Self {
            id,
            email: String::new(),
            name: DEFAULT_PROFILE_NAME.to_string(),
            phone: String::new(),
            created_at: Utc::now(),
        }
    }

    /// Up to two uppercase initials for an avatar badge
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .flat_map(char::to_uppercase)
            .take(2)
            .collect()
    }
}

/// Profile patch; unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl ProfileUpdate {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Check if the patch changes nothing
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.phone.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Validated;

    #[test]
    fn test_placeholder_profile() {
        let id = Uuid::new_v4();
        let profile = UserProfile::placeholder(id);

        assert_eq!(profile.id, id);
        assert_eq!(profile.name, "User");
        assert_eq!(profile.email, "");
        assert_eq!(profile.phone, "");
    }

    #[test]
    fn test_initials() {
        let mut profile = UserProfile::placeholder(Uuid::new_v4());
        profile.name = "john doe".to_string();
        assert_eq!(profile.initials(), "JD");

        profile.name = "Ada".to_string();
        assert_eq!(profile.initials(), "A");
    }

    #[test]
    fn test_profile_update_serializes_only_set_fields() {
        let patch = ProfileUpdate::name("X");
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({ "name": "X" }));
    }

    #[test]
    fn test_profile_update_validation() {
        assert!(ProfileUpdate::name("").validated().is_err());
        let bad_email = ProfileUpdate {
            email: Some("nope".to_string()),
            ..Default::default()
        };
        assert!(bad_email.validated().is_err());
        assert!(ProfileUpdate::default().is_empty());
    }

    #[test]
    fn test_decode_sparse_row() {
        let id = Uuid::new_v4();
        let row = serde_json::json!({ "id": id, "name": "X", "phone": null });
        let profile: UserProfile = serde_json::from_value(row).unwrap();
        assert_eq!(profile.id, id);
        assert_eq!(profile.phone, "");
    }
}
