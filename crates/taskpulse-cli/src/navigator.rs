use std::sync::atomic::{AtomicBool, Ordering};

use taskpulse_core::navigation::{Navigator, Route};
use tracing::info;

/// Shell hint shown instead of an error when a session is needed
pub const LOGIN_HINT: &str = "You are not logged in. Run `taskpulse login` to sign in.";

/// Navigator for a one-shot terminal command.
///
/// There is nothing to redirect to mid-command, so a login request is
/// remembered and turned into a hint once the command finishes.
#[derive(Debug, Default)]
pub struct TerminalNavigator {
    login_requested: AtomicBool,
}

impl TerminalNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn login_requested(&self) -> bool {
        self.login_requested.load(Ordering::SeqCst)
    }
}

impl Navigator for TerminalNavigator {
    fn navigate(&self, route: Route) {
        info!(route = %route, "Navigation requested");
        if route == Route::Login {
            self.login_requested.store(true, Ordering::SeqCst);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_is_remembered() {
        let navigator = TerminalNavigator::new();
        assert!(!navigator.login_requested());

        navigator.navigate(Route::Dashboard);
        assert!(!navigator.login_requested());

        navigator.navigate(Route::Login);
        assert!(navigator.login_requested());
    }
}
