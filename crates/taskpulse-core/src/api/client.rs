//! Typed client for the dashboard API.
//!
//! Every method goes through the `RequestPipeline`, so authorization and
//! forced logout behave the same no matter which endpoint is called.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use reqwest::Method;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::info;

use crate::auth::{SessionData, SessionStore, User};
use crate::models::{
    Board, BoardInput, BoardList, Card, CardMove, CheckTriggered, DashboardMetrics, Monitor,
    NewCard, NewList, NewMonitor, StatusPage, Uptime,
};

use super::pipeline::RequestPipeline;
use super::ApiError;

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct TokenClaims {
    sub: Option<String>,
}

/// Subject claim of a JWT, if the token is one.
/// The signature is not checked; the server stays the authority.
fn token_subject(token: &str) -> Option<String> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .ok()?;
    let claims: TokenClaims = serde_json::from_slice(&bytes).ok()?;
    claims.sub.filter(|s| !s.is_empty())
}

pub struct ApiClient {
    pipeline: RequestPipeline,
}

impl ApiClient {
    pub fn new(pipeline: RequestPipeline) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &RequestPipeline {
        &self.pipeline
    }

    pub fn session(&self) -> &SessionStore {
        self.pipeline.session()
    }

    fn to_body<B: Serialize>(body: &B) -> Result<serde_json::Value, ApiError> {
        serde_json::to_value(body)
            .map_err(|e| ApiError::InvalidRequest(format!("Failed to encode request body: {}", e)))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.pipeline
            .request(Method::GET, path, None, &[])
            .await?
            .json()
    }

    async fn send_json<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = Self::to_body(body)?;
        self.pipeline
            .request(method, path, Some(body), &[])
            .await?
            .json()
    }

    // ===== Auth =====

    /// Exchange credentials for a token and start a session with it
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionData, ApiError> {
        let token: TokenResponse = self
            .send_json(Method::POST, "auth/login", &Credentials { email, password })
            .await?;
        if token.access_token.trim().is_empty() {
            return Err(ApiError::InvalidResponse(
                "login response carried an empty access_token".to_string(),
            ));
        }

        let id = token_subject(&token.access_token).unwrap_or_else(|| email.to_string());
        let user = User::new(id, email);

        self.session()
            .set_session(token.access_token, user)
            .map_err(|e| ApiError::Session(format!("{:#}", e)))?;
        info!(email = email, "Logged in");

        self.session()
            .snapshot()
            .ok_or_else(|| ApiError::Session("session was cleared during login".to_string()))
    }

    /// Create an account. The response shape is up to the server.
    pub async fn register(&self, email: &str, password: &str) -> Result<serde_json::Value, ApiError> {
        self.send_json(Method::POST, "auth/register", &Credentials { email, password })
            .await
    }

    /// End the local session. The server keeps no session state to revoke.
    pub fn logout(&self) -> anyhow::Result<()> {
        self.session().clear_session()?;
        info!("Logged out");
        Ok(())
    }

    // ===== Boards =====

    pub async fn list_boards(&self) -> Result<Vec<Board>, ApiError> {
        self.get("boards").await
    }

    pub async fn get_board(&self, board_id: &str) -> Result<Board, ApiError> {
        self.get(&format!("boards/{}", board_id)).await
    }

    pub async fn create_board(&self, input: &BoardInput) -> Result<Board, ApiError> {
        self.send_json(Method::POST, "boards", input).await
    }

    pub async fn update_board(&self, board_id: &str, input: &BoardInput) -> Result<Board, ApiError> {
        self.send_json(Method::PUT, &format!("boards/{}", board_id), input)
            .await
    }

    pub async fn delete_board(&self, board_id: &str) -> Result<(), ApiError> {
        self.pipeline
            .request(Method::DELETE, &format!("boards/{}", board_id), None, &[])
            .await?;
        Ok(())
    }

    pub async fn create_list(&self, board_id: &str, list: &NewList) -> Result<BoardList, ApiError> {
        self.send_json(Method::POST, &format!("boards/{}/lists", board_id), list)
            .await
    }

    pub async fn create_card(&self, list_id: &str, card: &NewCard) -> Result<Card, ApiError> {
        self.send_json(Method::POST, &format!("lists/{}/cards", list_id), card)
            .await
    }

    pub async fn move_card(&self, card_id: &str, target: &CardMove) -> Result<Card, ApiError> {
        self.send_json(Method::PUT, &format!("cards/{}/move", card_id), target)
            .await
    }

    // ===== Monitors =====

    pub async fn list_monitors(&self) -> Result<Vec<Monitor>, ApiError> {
        self.get("monitors").await
    }

    pub async fn get_monitor(&self, monitor_id: &str) -> Result<Monitor, ApiError> {
        self.get(&format!("monitors/{}", monitor_id)).await
    }

    pub async fn create_monitor(&self, monitor: &NewMonitor) -> Result<Monitor, ApiError> {
        self.send_json(Method::POST, "monitors", monitor).await
    }

    pub async fn monitor_uptime(&self, monitor_id: &str, hours: u32) -> Result<Uptime, ApiError> {
        let hours = hours.to_string();
        self.pipeline
            .request(
                Method::GET,
                &format!("monitors/{}/uptime", monitor_id),
                None,
                &[("hours", hours.as_str())],
            )
            .await?
            .json()
    }

    pub async fn trigger_check(&self, monitor_id: &str) -> Result<CheckTriggered, ApiError> {
        self.pipeline
            .request(Method::POST, &format!("monitors/{}/check", monitor_id), None, &[])
            .await?
            .json()
    }

    // ===== Dashboard =====

    pub async fn dashboard_metrics(&self) -> Result<DashboardMetrics, ApiError> {
        self.get("metrics/dashboard").await
    }

    pub async fn status_page(&self) -> Result<StatusPage, ApiError> {
        self.get("status-page").await
    }
}

// ============================================================================
// Tests
// ============================================================================
