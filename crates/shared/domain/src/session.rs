//! Authenticated session held by the session store.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An authenticated identity with its bearer and refresh tokens.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub identity_id: Uuid,
    pub email: String,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("identity_id", &self.identity_id)
            .field("email", &self.email)
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl Session {
    /// Check whether the access token lapses within `margin` of `now`
    pub fn expires_within(&self, margin: Duration, now: DateTime<Utc>) -> bool {
        self.expires_at - margin <= now
    }

    /// Time left before the token should be refreshed, zero if already due
    pub fn refresh_delay(&self, margin: Duration, now: DateTime<Utc>) -> std::time::Duration {
        (self.expires_at - margin - now)
            .to_std()
            .unwrap_or(std::time::Duration::ZERO)
    }
}
