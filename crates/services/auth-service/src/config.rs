//! Session store configuration.

use std::path::PathBuf;
use std::time::Duration as StdDuration;

use chrono::Duration;

use common::{AppConfig, DEFAULT_REFRESH_MARGIN_SECS, DEFAULT_SESSION_FILE};

/// Pause before retrying a refresh that failed on the network
pub const REFRESH_RETRY_SECS: u64 = 30;

/// Session store configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Where the session is persisted between runs
    pub session_file: PathBuf,
    /// Refresh the access token this long before it expires
    pub refresh_margin: Duration,
    /// Wait after a refresh attempt that could not reach the backend
    pub retry_delay: StdDuration,
}

impl SessionConfig {
    /// Derive from the application configuration.
    pub fn from_app(config: &AppConfig) -> Self {
        Self {
            session_file: config.session_file.clone(),
            refresh_margin: Duration::seconds(config.refresh_margin_secs.max(0)),
            retry_delay: StdDuration::from_secs(REFRESH_RETRY_SECS),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_file: PathBuf::from(DEFAULT_SESSION_FILE),
            refresh_margin: Duration::seconds(DEFAULT_REFRESH_MARGIN_SECS),
            retry_delay: StdDuration::from_secs(REFRESH_RETRY_SECS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_app_clamps_negative_margin() {
        let mut app = AppConfig::default();
        app.refresh_margin_secs = -5;
        let config = SessionConfig::from_app(&app);

        assert_eq!(config.refresh_margin, Duration::zero());
        assert_eq!(config.retry_delay, StdDuration::from_secs(30));
    }
}
