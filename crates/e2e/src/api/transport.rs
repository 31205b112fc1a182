//! HTTP transport for the Pump Master API
//!
//! The transport never judges a status code. It hands back an
//! [`ApiResponse`] and the caller decides what counts as success through
//! [`ApiResponse::expect_status`].

use std::time::Duration;

use bytes::Bytes;
use pumpmaster_common::FailureResponse;
use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::error::{E2eError, E2eResult};

/// How a request authenticates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode<'a> {
    /// Use the stored session token, if any
    Session,
    /// Send no Authorization header
    Anonymous,
    /// Send this bearer token regardless of the session
    Bearer(&'a str),
}

/// Raw outcome of one HTTP exchange
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Bytes,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Body as JSON; plain text becomes a JSON string and an empty body becomes null
    pub fn json_value(&self) -> Value {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Value::Null;
        }
        serde_json::from_slice(&self.body).unwrap_or_else(|_| Value::String(self.text()))
    }

    /// Decode the body into `T`, naming `operation` on failure
    pub fn json<T: DeserializeOwned>(&self, operation: &str) -> E2eResult<T> {
        serde_json::from_slice(&self.body).map_err(|e| E2eError::Decode {
            operation: operation.to_string(),
            reason: e.to_string(),
        })
    }

    /// Pass the response through only when it carries `expected`
    pub fn expect_status(self, expected: u16, operation: &str) -> E2eResult<Self> {
        if self.status == expected {
            Ok(self)
        } else {
            Err(E2eError::UnexpectedStatus {
                operation: operation.to_string(),
                expected,
                actual: self.status,
                body: self.text(),
            })
        }
    }

    pub fn into_failure(self) -> FailureResponse {
        FailureResponse {
            status: self.status,
            error: self.json_value(),
        }
    }
}

/// Owns the HTTP client, base URL, and the single session token
#[derive(Debug, Clone)]
pub struct ApiTransport {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiTransport {
    pub fn new(base_url: impl Into<String>) -> E2eResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("pumpmaster-e2e/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    pub fn clear_token(&mut self) {
        self.token = None;
    }

    /// JSON request with the Authorization header chosen by `auth`
    pub fn request(&self, method: Method, path: &str, auth: AuthMode<'_>) -> RequestBuilder {
        self.bare_request(method, path, auth)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
    }

    /// Request without a preset content type, for multipart bodies
    pub fn bare_request(&self, method: Method, path: &str, auth: AuthMode<'_>) -> RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        let token = match auth {
            AuthMode::Session => self.token.as_deref(),
            AuthMode::Anonymous => None,
            AuthMode::Bearer(token) => Some(token),
        };
        match token {
            Some(token) => builder.header(AUTHORIZATION, format!("Bearer {}", token)),
            None => builder,
        }
    }

    /// Send and collect status plus body
    pub async fn send(&self, builder: RequestBuilder) -> E2eResult<ApiResponse> {
        let request = builder.build()?;
        let method = request.method().clone();
        let url = request.url().clone();

        let response = self.client.execute(request).await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;

        debug!("{} {} -> {} ({} bytes)", method, url, status, body.len());
        Ok(ApiResponse { status, body })
    }
}
