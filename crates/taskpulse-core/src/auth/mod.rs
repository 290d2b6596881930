//! Authentication state for the dashboard client.
//!
//! This module provides:
//! - `SessionStore`: the process-wide token + user pair every request reads
//! - `SessionStorage` backends: session file, OS keychain, or memory only
//!
//! Sessions have no local expiry. A session ends on logout or when the
//! server rejects the token.

pub mod session;
pub mod storage;

pub use session::{AuthState, SessionData, SessionStore, User};
pub use storage::{FileStorage, KeyringStorage, LoadError, MemoryStorage, SessionStorage};
