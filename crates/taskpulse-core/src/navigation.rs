//! Views the client can show and the hook used to switch between them.
//!
//! The request pipeline never renders anything itself. When the server
//! rejects the session it asks a `Navigator` to show the login view, and the
//! front-end decides what that means (a redirect, a prompt, a hint).

use std::fmt;
use std::sync::Mutex;

use crate::auth::SessionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Dashboard,
    Tasks,
    Monitoring,
    Status,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Dashboard => "/",
            Route::Tasks => "/tasks",
            Route::Monitoring => "/monitoring",
            Route::Status => "/status",
        }
    }

    /// Whether the view needs a logged-in user
    pub fn requires_auth(&self) -> bool {
        !matches!(self, Route::Login | Route::Status)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Resolve the route that should actually be shown.
/// Private views without a session land on the login view.
pub fn guard(route: Route, session: &SessionStore) -> Route {
    if route.requires_auth() && !session.is_authenticated() {
        Route::Login
    } else {
        route
    }
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Navigator that only remembers where it was sent.
#[derive(Debug, Default)]
pub struct NavigationLog {
    history: Mutex<Vec<Route>>,
}

impl NavigationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Vec<Route> {
        self.history.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn last(&self) -> Option<Route> {
        self.history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last()
            .copied()
    }
}

impl Navigator for NavigationLog {
    fn navigate(&self, route: Route) {
        self.history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(route);
    }
}
