//! Raw HTTP exchange used by the request pipeline.
//!
//! The pipeline builds an `ApiRequest`, hands it to an `HttpTransport` and
//! gets an `ApiResponse` back for any status the server answered with.
//! A transport only fails when no response arrived at all.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, Method, StatusCode};
use serde::de::DeserializeOwned;

use super::ApiError;

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    /// Bearer credential, `None` for an unauthenticated call
    pub bearer: Option<String>,
    pub body: Option<serde_json::Value>,
    pub query: Vec<(String, String)>,
}

/// A response exactly as the server sent it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_str(&self.body).map_err(|e| {
            ApiError::InvalidResponse(format!("status {}: {}", self.status, e))
        })
    }
}

#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Perform the request. Only a missing response is an error.
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError>;
}

/// `reqwest`-backed transport.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let mut builder = self
            .client
            .request(request.method.clone(), &request.url)
            .header(header::ACCEPT, "application/json");

        if let Some(ref token) = request.bearer {
            builder = builder.bearer_auth(token);
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            ApiError::Network(format!("{} {}: {}", request.method, request.url, e))
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            ApiError::Network(format!("Failed to read response from {}: {}", request.url, e))
        })?;

        Ok(ApiResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Token {
        access_token: String,
    }

    #[test]
    fn test_response_json() {
        let response = ApiResponse::new(StatusCode::OK, r#"{"access_token":"xyz"}"#);
        let token: Token = response.json().unwrap();
        assert_eq!(token.access_token, "xyz");
    }

    #[test]
    fn test_response_json_invalid() {
        let response = ApiResponse::new(StatusCode::OK, "<html></html>");
        let err = response.json::<Token>().unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)));
    }

    #[test]
    fn test_response_is_success() {
        assert!(ApiResponse::new(StatusCode::CREATED, "").is_success());
        assert!(!ApiResponse::new(StatusCode::UNAUTHORIZED, "").is_success());
    }
}
