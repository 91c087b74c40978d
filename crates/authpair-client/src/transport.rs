//! Request/response types and the HTTP transport seam

use crate::error::{ClientError, Result};
use async_trait::async_trait;
use reqwest::{header, Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// An outgoing API request
///
/// `retried` is owned by the request itself, so concurrent requests each get
/// their own single-retry budget.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the API base URL, e.g. `/auth/profile`
    pub path: String,
    pub body: Option<Value>,
    /// Full `Authorization` header value
    pub authorization: Option<String>,
    /// Set once the request has been replayed after a refresh
    pub retried: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            authorization: None,
            retried: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            body: Some(body),
            ..Self::new(Method::POST, path)
        }
    }

    /// Attach (or replace) a bearer token
    pub fn set_bearer(&mut self, token: &str) {
        self.authorization = Some(format!("Bearer {token}"));
    }
}

/// A decoded API response
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    /// JSON body, `Value::Null` when empty or not JSON
    pub body: Value,
}

impl ApiResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == StatusCode::UNAUTHORIZED.as_u16()
    }

    /// Server-provided error message, falling back to the status code
    pub fn error_message(&self) -> String {
        self.body
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .unwrap_or_else(|| format!("HTTP {}", self.status))
    }

    /// Deserialize a successful body, or turn the failure into `ClientError::Api`
    pub fn into_result<T: DeserializeOwned>(self) -> Result<T> {
        if !self.is_success() {
            return Err(ClientError::Api {
                status: self.status,
                message: self.error_message(),
            });
        }
        Ok(serde_json::from_value(self.body)?)
    }
}

/// Sends a single request with no retry logic of its own
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse>;
}

/// reqwest-backed transport
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let url = self.url(&request.path);
        let mut req = self.client.request(request.method.clone(), &url);

        if let Some(authorization) = &request.authorization {
            req = req.header(header::AUTHORIZATION, authorization);
        }
        if let Some(body) = &request.body {
            req = req.json(body);
        }

        tracing::debug!(method = %request.method, %url, retried = request.retried, "Sending request");

        let resp = req.send().await?;
        let status = resp.status().as_u16();
        let text = resp.text().await?;
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);

        Ok(ApiResponse::new(status, body))
    }
}
