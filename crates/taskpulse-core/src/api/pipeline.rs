//! The single path every API call takes.
//!
//! Each call reads the session token at send time, attaches it as a bearer
//! credential, and on a 401 tears the session down and sends the user to the
//! login view before the error reaches the caller. Nothing is retried or
//! cached; every other outcome is handed back as the server produced it.

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use tracing::{debug, warn};

use crate::auth::SessionStore;
use crate::navigation::{Navigator, Route};

use super::transport::{ApiRequest, ApiResponse, HttpTransport};
use super::ApiError;

/// Path prefix every endpoint lives under
pub const API_ROOT: &str = "/api";

pub struct RequestPipeline {
    transport: Arc<dyn HttpTransport>,
    session: SessionStore,
    navigator: Arc<dyn Navigator>,
    base_url: String,
}

impl RequestPipeline {
    pub fn new(
        server_url: &str,
        transport: Arc<dyn HttpTransport>,
        session: SessionStore,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            transport,
            session,
            navigator,
            base_url: format!("{}{}", server_url.trim_end_matches('/'), API_ROOT),
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a resource path such as `boards/42` or `/boards/42`
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Send one request and return the raw response on success.
    ///
    /// A 401 clears the session and navigates to the login view, then still
    /// returns `ApiError::Unauthorized`. Other failures leave the session as is.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
        query: &[(&str, &str)],
    ) -> Result<ApiResponse, ApiError> {
        let request = ApiRequest {
            method,
            url: self.url(path),
            bearer: self.session.token(),
            body,
            query: query
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        };

        debug!(
            method = %request.method,
            url = %request.url,
            authenticated = request.bearer.is_some(),
            "Sending API request"
        );

        let response = self.transport.send(request).await?;

        if response.is_success() {
            return Ok(response);
        }

        if response.status == StatusCode::UNAUTHORIZED {
            self.force_logout(path);
        }

        Err(ApiError::from_status(response.status, response.body))
    }

    fn force_logout(&self, path: &str) {
        warn!(path = path, "Session rejected by server, logging out");
        if let Err(e) = self.session.clear_session() {
            warn!(error = %e, "Failed to persist cleared session");
        }
        self.navigator.navigate(Route::Login);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::FakeTransport;
    use crate::auth::User;
    use crate::navigation::NavigationLog;

    struct Harness {
        transport: Arc<FakeTransport>,
        navigator: Arc<NavigationLog>,
        session: SessionStore,
        pipeline: RequestPipeline,
    }

    fn harness() -> Harness {
        let transport = Arc::new(FakeTransport::new());
        let navigator = Arc::new(NavigationLog::new());
        let session = SessionStore::ephemeral();
        let pipeline = RequestPipeline::new(
            "http://localhost:8000/",
            transport.clone(),
            session.clone(),
            navigator.clone(),
        );
        Harness {
            transport,
            navigator,
            session,
            pipeline,
        }
    }

    fn login(session: &SessionStore, token: &str) {
        session
            .set_session(token, User::new("u1", "a@b.com"))
            .unwrap();
    }

    #[test]
    fn test_url_joins_api_root() {
        let h = harness();
        assert_eq!(h.pipeline.base_url(), "http://localhost:8000/api");
        assert_eq!(h.pipeline.url("boards"), "http://localhost:8000/api/boards");
        assert_eq!(
            h.pipeline.url("/monitors/1/uptime"),
            "http://localhost:8000/api/monitors/1/uptime"
        );
    }

    #[tokio::test]
    async fn test_authenticated_request_carries_bearer() {
        let h = harness();
        login(&h.session, "abc");
        h.transport.respond(StatusCode::OK, "[]");

        h.pipeline
            .request(Method::GET, "boards", None, &[])
            .await
            .unwrap();

        let sent = h.transport.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].bearer.as_deref(), Some("abc"));
        assert_eq!(sent[0].url, "http://localhost:8000/api/boards");
    }

    #[tokio::test]
    async fn test_unauthenticated_request_has_no_bearer() {
        let h = harness();
        h.transport.respond(StatusCode::OK, "{}");

        h.pipeline
            .request(Method::GET, "status-page", None, &[])
            .await
            .unwrap();

        assert_eq!(h.transport.requests()[0].bearer, None);
    }

    #[tokio::test]
    async fn test_token_is_read_at_send_time() {
        let h = harness();
        h.transport.respond(StatusCode::OK, "[]");
        h.transport.respond(StatusCode::OK, "[]");

        login(&h.session, "first");
        h.pipeline.request(Method::GET, "boards", None, &[]).await.unwrap();
        login(&h.session, "second");
        h.pipeline.request(Method::GET, "boards", None, &[]).await.unwrap();

        let tokens: Vec<_> = h
            .transport
            .requests()
            .into_iter()
            .map(|r| r.bearer)
            .collect();
        assert_eq!(
            tokens,
            vec![Some("first".to_string()), Some("second".to_string())]
        );
    }

    #[tokio::test]
    async fn test_success_is_returned_unmodified() {
        let h = harness();
        h.transport
            .respond(StatusCode::CREATED, r#"{"id":"b1","name":"Roadmap"}"#);

        let body = serde_json::json!({"name": "Roadmap"});
        let response = h
            .pipeline
            .request(Method::POST, "boards", Some(body.clone()), &[])
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::CREATED);
        assert_eq!(response.body, r#"{"id":"b1","name":"Roadmap"}"#);
        assert_eq!(h.transport.requests()[0].body, Some(body));
    }

    #[tokio::test]
    async fn test_query_is_forwarded() {
        let h = harness();
        login(&h.session, "abc");
        h.transport.respond(StatusCode::OK, "{}");

        h.pipeline
            .request(Method::GET, "monitors/7/uptime", None, &[("hours", "48")])
            .await
            .unwrap();

        assert_eq!(
            h.transport.requests()[0].query,
            vec![("hours".to_string(), "48".to_string())]
        );
    }

    #[tokio::test]
    async fn test_unauthorized_clears_session_and_redirects() {
        let h = harness();
        login(&h.session, "abc");
        h.transport
            .respond(StatusCode::UNAUTHORIZED, r#"{"detail":"Token expired"}"#);

        let err = h
            .pipeline
            .request(Method::GET, "monitors/123", None, &[])
            .await
            .unwrap_err();

        assert!(err.is_unauthorized());
        assert_eq!(err.detail().as_deref(), Some("Token expired"));
        assert_eq!(h.session.token(), None);
        assert_eq!(h.session.user(), None);
        assert_eq!(h.navigator.last(), Some(Route::Login));
        assert_eq!(h.navigator.last().map(|r| r.path()), Some("/login"));
    }

    #[tokio::test]
    async fn test_server_error_leaves_session_alone() {
        let h = harness();
        login(&h.session, "abc");
        h.transport
            .respond(StatusCode::INTERNAL_SERVER_ERROR, "database down");

        let err = h
            .pipeline
            .request(Method::GET, "boards", None, &[])
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
        assert_eq!(err.body(), Some("database down"));
        assert_eq!(h.session.token().as_deref(), Some("abc"));
        assert!(h.navigator.history().is_empty());
    }

    #[tokio::test]
    async fn test_forbidden_is_not_a_logout() {
        let h = harness();
        login(&h.session, "abc");
        h.transport.respond(StatusCode::FORBIDDEN, "nope");

        let err = h
            .pipeline
            .request(Method::DELETE, "boards/1", None, &[])
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::AccessDenied(_)));
        assert!(h.session.is_authenticated());
        assert!(h.navigator.history().is_empty());
    }

    #[tokio::test]
    async fn test_network_failure_leaves_session_alone() {
        let h = harness();
        login(&h.session, "abc");
        h.transport.fail("connection refused");

        let err = h
            .pipeline
            .request(Method::GET, "boards", None, &[])
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Network(_)));
        assert_eq!(h.session.token().as_deref(), Some("abc"));
        assert!(h.navigator.history().is_empty());
    }

    #[tokio::test]
    async fn test_no_retry_on_failure() {
        let h = harness();
        h.transport.respond(StatusCode::TOO_MANY_REQUESTS, "");
        h.transport.respond(StatusCode::OK, "[]");

        let err = h
            .pipeline
            .request(Method::GET, "boards", None, &[])
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::RateLimited(_)));
        assert_eq!(h.transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_unauthorized_while_logged_out_still_redirects() {
        let h = harness();
        h.transport.respond(StatusCode::UNAUTHORIZED, "");

        let err = h
            .pipeline
            .request(Method::GET, "metrics/dashboard", None, &[])
            .await
            .unwrap_err();

        assert!(err.is_unauthorized());
        assert!(!h.session.is_authenticated());
        assert_eq!(h.navigator.history(), vec![Route::Login]);
    }

    #[tokio::test]
    async fn test_concurrent_requests_each_complete() {
        let h = harness();
        login(&h.session, "abc");
        for _ in 0..3 {
            h.transport.respond(StatusCode::OK, "[]");
        }

        let results = futures::future::join_all(vec![
            h.pipeline.request(Method::GET, "boards", None, &[]),
            h.pipeline.request(Method::GET, "monitors", None, &[]),
            h.pipeline.request(Method::GET, "metrics/dashboard", None, &[]),
        ])
        .await;

        assert!(results.iter().all(|r| r.is_ok()));
        assert!(h
            .transport
            .requests()
            .iter()
            .all(|r| r.bearer.as_deref() == Some("abc")));
    }
}
