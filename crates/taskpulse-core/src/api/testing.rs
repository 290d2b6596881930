//! In-process transport for exercising the pipeline without a server.
//!
//! Built for this crate's tests and, with the `test-utils` feature, for
//! downstream crates' tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::StatusCode;

use super::transport::{ApiRequest, ApiResponse, HttpTransport};
use super::ApiError;

/// Replays queued outcomes in order and records every request it sees.
#[derive(Default)]
pub struct FakeTransport {
    outcomes: Mutex<VecDeque<Result<ApiResponse, String>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, status: StatusCode, body: &str) {
        self.outcomes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(Ok(ApiResponse::new(status, body)));
    }

    /// Queue a failure where no response arrives
    pub fn fail(&self, message: &str) {
        self.outcomes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(Err(message.to_string()));
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl HttpTransport for FakeTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).push(request);
        match self.outcomes.lock().unwrap_or_else(|e| e.into_inner()).pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(ApiError::Network(message)),
            None => Err(ApiError::Network("no response queued".to_string())),
        }
    }
}
