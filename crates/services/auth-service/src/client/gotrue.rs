//! HTTP client for the hosted auth endpoint.

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::Response;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;
use url::Url;
use uuid::Uuid;

use common::{AppConfig, AppError, AppResult, AuthError};
use domain::{Credentials, Session, SignUpRequest, BEARER_TOKEN_PREFIX};

use super::{AuthApi, AuthResult, SignUpOutcome};

const HEADER_API_KEY: &str = "apikey";
const HEADER_CLIENT_INFO: &str = "x-client-info";

/// Lifetime assumed when the backend omits both expiry fields
const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: Uuid,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    /// Unix seconds
    #[serde(default)]
    expires_at: Option<i64>,
    user: AuthUser,
}

impl TokenResponse {
    fn into_session(self, fallback_email: &str, now: DateTime<Utc>) -> Session {
        let expires_at = self
            .expires_at
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
            .or_else(|| {
                self.expires_in
                    .and_then(Duration::try_seconds)
                    .and_then(|lifetime| now.checked_add_signed(lifetime))
            })
            .unwrap_or_else(|| now + Duration::seconds(DEFAULT_EXPIRES_IN_SECS));

        Session {
            identity_id: self.user.id,
            email: self
                .user
                .email
                .unwrap_or_else(|| fallback_email.to_string()),
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
        }
    }
}

/// Error body; older deployments send `error`/`error_description`,
/// newer ones `error_code`/`msg`.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    error_description: Option<String>,
    error_code: Option<String>,
    msg: Option<String>,
    message: Option<String>,
}

impl ErrorBody {
    fn into_error(self, status: u16) -> AuthError {
        let code = self.error_code.or(self.error).unwrap_or_default();
        let message = self
            .error_description
            .or(self.msg)
            .or(self.message)
            .unwrap_or_default();
        AuthError::from_backend_code(status, &code, &message)
    }
}

/// Auth API client speaking the GoTrue dialect.
pub struct GoTrueClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
    client_info: String,
}

impl GoTrueClient {
    pub fn new(config: &AppConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| AppError::config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.auth_url()?,
            api_key: config.api_key().to_string(),
            client_info: config.client_info(),
        })
    }

    fn endpoint(&self, path: &str, grant_type: Option<&str>) -> AuthResult<Url> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| AuthError::Network(format!("bad auth URL: {}", e)))?;
        if let Some(grant_type) = grant_type {
            url.query_pairs_mut().append_pair("grant_type", grant_type);
        }
        Ok(url)
    }

    fn headers(&self, bearer: Option<&str>) -> AuthResult<HeaderMap> {
        let bearer = bearer.unwrap_or(self.api_key.as_str());
        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static(HEADER_API_KEY), header_value(&self.api_key)?);
        headers.insert(
            AUTHORIZATION,
            header_value(&format!("{}{}", BEARER_TOKEN_PREFIX, bearer))?,
        );
        headers.insert(
            HeaderName::from_static(HEADER_CLIENT_INFO),
            header_value(&self.client_info)?,
        );
        Ok(headers)
    }

    async fn post(&self, url: Url, bearer: Option<&str>, body: &Value) -> AuthResult<Response> {
        debug!("AUTH POST {}", url.path());
        let response = self
            .http
            .post(url)
            .headers(self.headers(bearer)?)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let body: ErrorBody = serde_json::from_str(&text).unwrap_or_default();
        Err(body.into_error(status.as_u16()))
    }

    async fn token_grant(&self, grant_type: &str, body: Value, email: &str) -> AuthResult<Session> {
        let url = self.endpoint("token", Some(grant_type))?;
        let response = self.post(url, None, &body).await?;
        let token: TokenResponse = response.json().await.map_err(invalid_body)?;
        Ok(token.into_session(email, Utc::now()))
    }
}

fn header_value(value: &str) -> AuthResult<HeaderValue> {
    HeaderValue::from_str(value).map_err(|_| AuthError::Rejected {
        code: "invalid_header".to_string(),
        message: "header value contains invalid characters".to_string(),
    })
}

fn invalid_body(err: reqwest::Error) -> AuthError {
    AuthError::Rejected {
        code: "invalid_response".to_string(),
        message: err.to_string(),
    }
}

#[async_trait]
impl AuthApi for GoTrueClient {
    async fn sign_in(&self, credentials: &Credentials) -> AuthResult<Session> {
        let body = json!({
            "email": credentials.email,
            "password": credentials.password,
        });
        self.token_grant("password", body, &credentials.email).await
    }

    async fn sign_up(&self, request: &SignUpRequest) -> AuthResult<SignUpOutcome> {
        let url = self.endpoint("signup", None)?;
        let body = json!({
            "email": request.email,
            "password": request.password,
            "data": request.metadata,
        });
        let response = self.post(url, None, &body).await?;
        let value: Value = response.json().await.map_err(invalid_body)?;

        // Tokens are only issued when the backend does not require confirmation
        if value.get("access_token").is_some() {
            let token: TokenResponse =
                serde_json::from_value(value).map_err(|e| AuthError::Rejected {
                    code: "invalid_response".to_string(),
                    message: e.to_string(),
                })?;
            return Ok(SignUpOutcome::SignedIn(
                token.into_session(&request.email, Utc::now()),
            ));
        }

        let user = value.get("user").cloned().unwrap_or(value);
        let user: AuthUser = serde_json::from_value(user).map_err(|e| AuthError::Rejected {
            code: "invalid_response".to_string(),
            message: e.to_string(),
        })?;
        Ok(SignUpOutcome::ConfirmationPending {
            identity_id: user.id,
            email: user.email.unwrap_or_else(|| request.email.clone()),
        })
    }

    async fn sign_out(&self, access_token: &str) -> AuthResult<()> {
        let url = self.endpoint("logout", None)?;
        self.post(url, Some(access_token), &json!({})).await?;
        Ok(())
    }

    async fn reset_password(&self, email: &str) -> AuthResult<()> {
        let url = self.endpoint("recover", None)?;
        self.post(url, None, &json!({ "email": email })).await?;
        Ok(())
    }

    async fn refresh(&self, refresh_token: &str) -> AuthResult<Session> {
        let body = json!({ "refresh_token": refresh_token });
        self.token_grant("refresh_token", body, "").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const IDENTITY: &str = "6f1b8a52-2f4e-4c55-9d0b-8a1e0f5d2c11";

    fn client_for(server: &MockServer) -> GoTrueClient {
        let config = AppConfig::default().with_backend(server.uri(), "anon-key");
        GoTrueClient::new(&config).unwrap()
    }

    fn token_body(access: &str) -> Value {
        json!({
            "access_token": access,
            "token_type": "bearer",
            "expires_in": 3600,
            "expires_at": 1_900_000_000,
            "refresh_token": "refresh-1",
            "user": { "id": IDENTITY, "email": "ana@example.com" }
        })
    }

    #[tokio::test]
    async fn test_sign_in_password_grant() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "password"))
            .and(header("apikey", "anon-key"))
            .and(body_json(json!({ "email": "ana@example.com", "password": "secret1" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("access-1")))
            .expect(1)
            .mount(&server)
            .await;

        let session = client_for(&server)
            .sign_in(&Credentials::new("ana@example.com", "secret1"))
            .await
            .unwrap();

        assert_eq!(session.identity_id.to_string(), IDENTITY);
        assert_eq!(session.access_token, "access-1");
        assert_eq!(session.refresh_token, "refresh-1");
        assert_eq!(session.expires_at.timestamp(), 1_900_000_000);
    }

    #[test]
    fn test_expiry_out_of_range_uses_default_lifetime() {
        let now = Utc::now();
        let token: TokenResponse = serde_json::from_value(json!({
            "access_token": "a",
            "refresh_token": "r",
            "expires_in": i64::MAX,
            "user": { "id": IDENTITY }
        }))
        .unwrap();

        let session = token.into_session("ana@example.com", now);

        assert_eq!(session.expires_at, now + Duration::seconds(DEFAULT_EXPIRES_IN_SECS));
        assert_eq!(session.email, "ana@example.com");
    }

    #[tokio::test]
    async fn test_refresh_tolerates_huge_expires_in() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "refresh_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "access-2",
                "refresh_token": "refresh-2",
                "expires_in": i64::MAX,
                "user": { "id": IDENTITY, "email": "ana@example.com" }
            })))
            .mount(&server)
            .await;

        let session = client_for(&server).refresh("refresh-1").await.unwrap();

        assert_eq!(session.access_token, "access-2");
        assert!(session.expires_at > Utc::now());
    }

    #[tokio::test]
    async fn test_sign_in_invalid_credentials_both_shapes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "invalid_grant",
                "error_description": "Invalid login credentials"
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "code": 400,
                "error_code": "invalid_credentials",
                "msg": "Invalid login credentials"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let credentials = Credentials::new("ana@example.com", "wrong");

        for _ in 0..2 {
            let err = client.sign_in(&credentials).await.unwrap_err();
            assert_eq!(err, AuthError::InvalidCredentials);
        }
    }

    #[tokio::test]
    async fn test_sign_up_pending_confirmation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/signup"))
            .and(body_json(json!({
                "email": "new@example.com",
                "password": "secret1",
                "data": { "name": "New User" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": IDENTITY,
                "email": "new@example.com",
                "confirmation_sent_at": "2024-10-01T00:00:00Z"
            })))
            .mount(&server)
            .await;

        let request =
            SignUpRequest::new("new@example.com", "secret1").with_metadata("name", "New User");
        let outcome = client_for(&server).sign_up(&request).await.unwrap();

        assert!(matches!(
            outcome,
            SignUpOutcome::ConfirmationPending { ref email, .. } if email == "new@example.com"
        ));
    }

    #[tokio::test]
    async fn test_sign_up_signed_in_and_duplicate() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/signup"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("access-2")))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/signup"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({
                "code": 422,
                "error_code": "user_already_exists",
                "msg": "User already registered"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let request = SignUpRequest::new("ana@example.com", "secret1");

        let outcome = client.sign_up(&request).await.unwrap();
        assert!(matches!(outcome, SignUpOutcome::SignedIn(ref s) if s.access_token == "access-2"));

        let err = client.sign_up(&request).await.unwrap_err();
        assert_eq!(err, AuthError::EmailTaken);
    }

    #[tokio::test]
    async fn test_refresh_rejected_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "refresh_token"))
            .and(body_json(json!({ "refresh_token": "stale" })))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "invalid_grant",
                "error_description": "Invalid Refresh Token: Refresh Token Not Found"
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).refresh("stale").await.unwrap_err();
        assert!(err.ends_session());
    }

    #[tokio::test]
    async fn test_sign_out_sends_user_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/logout"))
            .and(header("authorization", "Bearer access-1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server).sign_out("access-1").await.unwrap();
    }

    #[tokio::test]
    async fn test_recover_posts_email() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/recover"))
            .and(body_json(json!({ "email": "ana@example.com" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server)
            .reset_password("ana@example.com")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_network_error() {
        let config = AppConfig::default().with_backend("http://127.0.0.1:9", "");
        let client = GoTrueClient::new(&config).unwrap();

        let err = client.reset_password("ana@example.com").await.unwrap_err();
        assert!(matches!(err, AuthError::Network(_)));
    }
}
