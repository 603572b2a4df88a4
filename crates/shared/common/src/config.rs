//! Application configuration loaded from environment variables.
//!
//! Every value has a static fallback so the client can start without any
//! environment at all (pointing at a local backend).

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::{AppError, AppResult};

// =============================================================================
// Defaults
// =============================================================================

/// Local backend started by the backend CLI
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:54321";

pub const DEFAULT_APP_NAME: &str = "Fabtech";

pub const DEFAULT_APP_VERSION: &str = "1.0.0";

/// Default number of items per page
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Maximum upload size (5 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_SESSION_FILE: &str = ".fabtech/session.json";

/// Refresh the access token this long before it expires
pub const DEFAULT_REFRESH_MARGIN_SECS: i64 = 60;

const REST_PATH: &str = "rest/v1/";
const AUTH_PATH: &str = "auth/v1/";

/// Client configuration
#[derive(Clone)]
pub struct AppConfig {
    pub backend_url: String,
    api_key: String,
    pub app_name: String,
    pub app_version: String,
    pub default_page_size: usize,
    pub max_upload_bytes: u64,
    pub request_timeout_secs: u64,
    pub session_file: PathBuf,
    pub refresh_margin_secs: i64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("backend_url", &self.backend_url)
            .field("api_key", &"[REDACTED]")
            .field("app_name", &self.app_name)
            .field("app_version", &self.app_version)
            .field("default_page_size", &self.default_page_size)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("session_file", &self.session_file)
            .field("refresh_margin_secs", &self.refresh_margin_secs)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            api_key: String::new(),
            app_name: DEFAULT_APP_NAME.to_string(),
            app_version: DEFAULT_APP_VERSION.to_string(),
            default_page_size: DEFAULT_PAGE_SIZE,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            session_file: PathBuf::from(DEFAULT_SESSION_FILE),
            refresh_margin_secs: DEFAULT_REFRESH_MARGIN_SECS,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            backend_url: env::var("FABTECH_BACKEND_URL")
                .or_else(|_| env::var("SUPABASE_URL"))
                .unwrap_or_else(|_| DEFAULT_BACKEND_URL.to_string()),
            api_key: env::var("FABTECH_API_KEY")
                .or_else(|_| env::var("EXPO_PUBLIC_SUPABASE_ANON_KEY"))
                .or_else(|_| env::var("SUPABASE_ANON_KEY"))
                .unwrap_or_default(),
            app_name: env::var("FABTECH_APP_NAME")
                .unwrap_or_else(|_| DEFAULT_APP_NAME.to_string()),
            app_version: env::var("FABTECH_APP_VERSION")
                .unwrap_or_else(|_| DEFAULT_APP_VERSION.to_string()),
            default_page_size: env::var("FABTECH_PAGE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_PAGE_SIZE),
            max_upload_bytes: env::var("FABTECH_MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            request_timeout_secs: env::var("FABTECH_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            session_file: env::var("FABTECH_SESSION_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_SESSION_FILE)),
            refresh_margin_secs: env::var("FABTECH_REFRESH_MARGIN_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_REFRESH_MARGIN_SECS),
        }
    }

    /// Point the config at another backend (tests, local stacks).
    pub fn with_backend(mut self, url: impl Into<String>, api_key: impl Into<String>) -> Self {
        self.backend_url = url.into();
        self.api_key = api_key.into();
        self
    }

    pub fn with_session_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_file = path.into();
        self
    }

    /// Check values that would otherwise fail on first use.
    pub fn validate(&self) -> AppResult<()> {
        self.base_url()?;
        if self.default_page_size == 0 {
            return Err(AppError::config("default page size must be greater than zero"));
        }
        if self.refresh_margin_secs < 0 {
            return Err(AppError::config("refresh margin cannot be negative"));
        }
        Ok(())
    }

    /// Get the API key sent as `apikey` on every request.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// `X-Client-Info` header value
    pub fn client_info(&self) -> String {
        format!("{}/{}", self.app_name, self.app_version)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Table endpoint root, always with a trailing slash
    pub fn rest_url(&self) -> AppResult<Url> {
        self.join(REST_PATH)
    }

    /// Auth endpoint root, always with a trailing slash
    pub fn auth_url(&self) -> AppResult<Url> {
        self.join(AUTH_PATH)
    }

    fn base_url(&self) -> AppResult<Url> {
        let mut raw = self.backend_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        Url::parse(&raw).map_err(|e| {
            AppError::config(format!("invalid backend URL '{}': {}", self.backend_url, e))
        })
    }

    fn join(&self, path: &str) -> AppResult<Url> {
        self.base_url()?
            .join(path)
            .map_err(|e| AppError::config(format!("invalid backend path '{}': {}", path, e)))
    }
}
