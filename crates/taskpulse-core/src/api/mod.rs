//! REST access to the dashboard backend.
//!
//! Every call goes through `RequestPipeline`, which attaches the session's
//! bearer token and turns a 401 into a forced logout. `ApiClient` layers
//! typed endpoints for boards, monitors and metrics on top of it.

pub mod client;
pub mod error;
pub mod pipeline;
pub mod transport;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use client::ApiClient;
pub use error::ApiError;
pub use pipeline::{RequestPipeline, API_ROOT};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, ReqwestTransport, DEFAULT_TIMEOUT_SECS};
