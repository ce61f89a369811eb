//! Blocking HTTPS implementation of [`NotionApi`].

use reqwest::Method;
use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::api::{NotionApi, QueryRequest, QueryResponse};
use crate::config::{API_KEY_ENV, ClientConfig};
use crate::error::{KanbanError, Result};

const NOTION_VERSION: HeaderName = HeaderName::from_static("notion-version");

/// API client sending authenticated JSON requests.
///
/// Every request carries the bearer credential, the `Notion-Version` header
/// and the configured timeout. A response with a 4xx/5xx status becomes
/// [`KanbanError::Api`] using the body's `message` member, or `HTTP <status>`
/// when the body has none.
#[derive(Debug, Clone)]
pub struct HttpClient {
    http: Client,
    base_url: String,
}

impl HttpClient {
    /// Builds the underlying HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`Config`](KanbanError::Config) if the credential or API
    /// version cannot be sent as a header, or
    /// [`Transport`](KanbanError::Transport) if the client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|_| KanbanError::Config(format!("{API_KEY_ENV} is not a valid header value")))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            NOTION_VERSION,
            HeaderValue::from_str(&config.api_version).map_err(|_| {
                KanbanError::Config(format!("invalid API version '{}'", config.api_version))
            })?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value> {
        let url = format!("{}{path}", self.base_url);
        debug!(%method, %url, "Sending API request");

        let mut request = self.http.request(method, &url);
        if let Some(body) = &body {
            request = request.json(body);
        }
        let response = request.send()?;

        let status = response.status();
        let text = response.text()?;
        let data: Option<Value> = serde_json::from_str(&text).ok();
        debug!(status = status.as_u16(), "Received API response");

        if status.is_client_error() || status.is_server_error() {
            let message = data
                .as_ref()
                .and_then(|d| d.get("message"))
                .and_then(Value::as_str)
                .map(String::from)
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            return Err(KanbanError::Api {
                status: status.as_u16(),
                message,
                body: data,
            });
        }

        Ok(data.unwrap_or_else(|| Value::Object(Map::new())))
    }
}

impl NotionApi for HttpClient {
    fn get_page(&self, page_id: &str) -> Result<Value> {
        self.request(Method::GET, &format!("/pages/{page_id}"), None)
    }

    fn get_database(&self, database_id: &str) -> Result<Value> {
        self.request(Method::GET, &format!("/databases/{database_id}"), None)
    }

    fn query_database(&self, database_id: &str, query: &QueryRequest) -> Result<QueryResponse> {
        let body = serde_json::to_value(query)?;
        let raw = self.request(
            Method::POST,
            &format!("/databases/{database_id}/query"),
            Some(body),
        )?;
        Ok(serde_json::from_value(raw)?)
    }

    fn update_page(&self, page_id: &str, properties: Value) -> Result<Value> {
        self.request(
            Method::PATCH,
            &format!("/pages/{page_id}"),
            Some(json!({ "properties": properties })),
        )
    }
}
