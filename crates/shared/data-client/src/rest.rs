//! HTTP data client for the hosted REST endpoint.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::{Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use common::{AppConfig, AppError, AppResult, BackendError};
use domain::BEARER_TOKEN_PREFIX;

use crate::client::{BackendResult, DataClient};
use crate::query::{Filter, Query};
use crate::table::Table;
use crate::token::AccessToken;

const HEADER_API_KEY: &str = "apikey";
const HEADER_CLIENT_INFO: &str = "x-client-info";
const HEADER_PREFER: &str = "prefer";
const RETURN_REPRESENTATION: &str = "return=representation";
const RETURN_MINIMAL: &str = "return=minimal";

/// Error body returned by the REST endpoint
#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: Option<String>,
    message: Option<String>,
    details: Option<String>,
    hint: Option<String>,
}

/// Data client speaking the PostgREST dialect over HTTPS.
pub struct RestClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
    client_info: String,
    token: AccessToken,
}

impl RestClient {
    /// Create a client for `config`, authenticating with `token` when one is set.
    pub fn new(config: &AppConfig, token: AccessToken) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| AppError::config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.rest_url()?,
            api_key: config.api_key().to_string(),
            client_info: config.client_info(),
            token,
        })
    }

    fn table_url(&self, table: Table, params: &[(String, String)]) -> BackendResult<Url> {
        let mut url = self
            .base_url
            .join(table.as_str())
            .map_err(|e| BackendError::invalid_response(format!("bad table URL: {}", e)))?;
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
        Ok(url)
    }

    /// Headers every request carries; the bearer falls back to the API key.
    async fn headers(&self) -> BackendResult<HeaderMap> {
        let bearer = self
            .token
            .get()
            .await
            .unwrap_or_else(|| self.api_key.clone());

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

    async fn request(&self, method: Method, url: Url) -> BackendResult<RequestBuilder> {
        debug!("REST {} {}", method, url.path());
        Ok(self.http.request(method, url).headers(self.headers().await?))
    }

    /// Send and map non-success statuses into `BackendError`.
    async fn send(&self, request: RequestBuilder) -> BackendResult<Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let error = match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) => {
                let mut message = body.message.unwrap_or_else(|| status.to_string());
                if let Some(details) = body.details.filter(|d| !d.is_empty()) {
                    message = format!("{} ({})", message, details);
                }
                if let Some(hint) = body.hint.filter(|h| !h.is_empty()) {
                    debug!("REST error hint: {}", hint);
                }
                BackendError::from_response(status.as_u16(), body.code.as_deref(), message)
            }
            Err(_) => {
                let message = if text.is_empty() {
                    status.to_string()
                } else {
                    text
                };
                BackendError::from_response(status.as_u16(), None, message)
            }
        };
        Err(error)
    }

    async fn rows(response: Response) -> BackendResult<Vec<Value>> {
        response.json::<Vec<Value>>().await.map_err(BackendError::from)
    }
}

fn header_value(value: &str) -> BackendResult<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|_| BackendError::invalid_response("header value contains invalid characters"))
}

fn filter_params(filters: &[Filter]) -> Vec<(String, String)> {
    filters.iter().map(Filter::to_param).collect()
}

#[async_trait]
impl DataClient for RestClient {
    async fn query(&self, table: Table, query: Query) -> BackendResult<Vec<Value>> {
        let url = self.table_url(table, &query.to_params())?;
        let response = self.send(self.request(Method::GET, url).await?).await?;
        Self::rows(response).await
    }

    async fn insert(&self, table: Table, rows: Vec<Value>) -> BackendResult<Vec<Value>> {
        let url = self.table_url(table, &[])?;
        let request = self
            .request(Method::POST, url)
            .await?
            .header(HEADER_PREFER, RETURN_REPRESENTATION)
            .json(&rows);
        Self::rows(self.send(request).await?).await
    }

    async fn update(
        &self,
        table: Table,
        filters: Vec<Filter>,
        patch: Value,
    ) -> BackendResult<Vec<Value>> {
        let url = self.table_url(table, &filter_params(&filters))?;
        let request = self
            .request(Method::PATCH, url)
            .await?
            .header(HEADER_PREFER, RETURN_REPRESENTATION)
            .json(&patch);
        Self::rows(self.send(request).await?).await
    }

    async fn remove(&self, table: Table, filters: Vec<Filter>) -> BackendResult<()> {
        let url = self.table_url(table, &filter_params(&filters))?;
        let request = self
            .request(Method::DELETE, url)
            .await?
            .header(HEADER_PREFER, RETURN_MINIMAL);
        self.send(request).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::query::{Embed, Order, Select};

    async fn client_for(server: &MockServer, token: AccessToken) -> RestClient {
        let config = AppConfig::default().with_backend(server.uri(), "anon-key");
        RestClient::new(&config, token).unwrap()
    }

    #[tokio::test]
    async fn test_query_renders_postgrest_params() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/bookings"))
            .and(query_param("select", "*,service:services(*)"))
            .and(query_param("user_id", "eq.u1"))
            .and(query_param("order", "created_at.desc"))
            .and(header("apikey", "anon-key"))
            .and(header("authorization", "Bearer anon-key"))
            .and(header("x-client-info", "Fabtech/1.0.0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": "b1" }])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, AccessToken::new()).await;
        let query = Query::new()
            .select(Select::all().embed(Embed::new("service", Table::Services, "service_id")))
            .filter(Filter::eq("user_id", "u1"))
            .order(Order::desc("created_at"));

        let rows = client.query(Table::Bookings, query).await.unwrap();
        assert_eq!(rows, vec![json!({ "id": "b1" })]);
    }

    #[tokio::test]
    async fn test_search_sends_or_group() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/services"))
            .and(query_param(
                "or",
                "(title.ilike.%weld%,description.ilike.%weld%,category.ilike.%weld%)",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, AccessToken::new()).await;
        let query = Query::new().filter(Filter::or(vec![
            Filter::contains("title", "weld"),
            Filter::contains("description", "weld"),
            Filter::contains("category", "weld"),
        ]));

        assert!(client.query(Table::Services, query).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_session_token_used_as_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("authorization", "Bearer user-jwt"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let token = AccessToken::new();
        token.set("user-jwt").await;
        let client = client_for(&server, token).await;

        client.query(Table::Subscriptions, Query::new()).await.unwrap();
    }

    #[tokio::test]
    async fn test_insert_requests_representation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/reviews"))
            .and(header("prefer", "return=representation"))
            .and(body_json(json!([{ "rating": 5 }])))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(json!([{ "id": "r1", "rating": 5 }])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, AccessToken::new()).await;
        let rows = client
            .insert(Table::Reviews, vec![json!({ "rating": 5 })])
            .await
            .unwrap();
        assert_eq!(rows[0]["id"], "r1");
    }

    #[tokio::test]
    async fn test_update_and_remove_use_filters() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/rest/v1/bookings"))
            .and(query_param("id", "eq.b1"))
            .and(body_json(json!({ "status": "cancelled" })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{ "id": "b1", "status": "cancelled" }])),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/rest/v1/bookings"))
            .and(query_param("id", "eq.b1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, AccessToken::new()).await;
        let rows = client
            .update(
                Table::Bookings,
                vec![Filter::eq("id", "b1")],
                json!({ "status": "cancelled" }),
            )
            .await
            .unwrap();
        assert_eq!(rows[0]["status"], "cancelled");

        client
            .remove(Table::Bookings, vec![Filter::eq("id", "b1")])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_error_body_mapped() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "code": "23505",
                "message": "duplicate key value violates unique constraint",
                "details": "Key (id)=(x) already exists.",
                "hint": null
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, AccessToken::new()).await;
        let err = client
            .insert(Table::Users, vec![json!({ "id": "x" })])
            .await
            .unwrap_err();

        assert!(matches!(err, BackendError::Constraint { .. }));
        assert_eq!(err.code(), "23505");
        assert!(err.message().contains("already exists"));
    }

    #[tokio::test]
    async fn test_unauthorized_without_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = client_for(&server, AccessToken::new()).await;
        let err = client.query(Table::Bookings, Query::new()).await.unwrap_err();
        assert!(matches!(err, BackendError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn test_network_failure() {
        let config = AppConfig::default().with_backend("http://127.0.0.1:9", "");
        let client = RestClient::new(&config, AccessToken::new()).unwrap();

        let err = client.query(Table::Services, Query::new()).await.unwrap_err();
        assert!(matches!(err, BackendError::Network(_)));
    }
}
