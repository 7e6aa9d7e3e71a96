//! Client-side routing: the route table, the navigation guard, and the
//! navigator that applies one to the other.
//!
//! SYSTEM CONTEXT
//! ==============
//! The navigator is the only consumer of route metadata. It consults the
//! shared session on every navigation; nothing about a previous decision
//! is cached.

#[cfg(test)]
#[path = "router_test.rs"]
mod router_test;

pub mod guard;
pub mod routes;

use std::sync::Arc;

pub use guard::GuardDecision;
pub use routes::{AUTHENTICATED_LANDING, LOGIN_ROUTE, Route, RouteMeta};

use crate::state::session::SessionStore;

/// Upper bound on guard redirects followed for a single navigation.
const MAX_REDIRECTS: usize = 4;

#[derive(Debug, thiserror::Error)]
pub enum NavigationError {
    #[error("no view at {0}")]
    NotFound(String),
}

pub struct Navigator {
    session: Arc<SessionStore>,
    current: Option<Route>,
}

impl Navigator {
    #[must_use]
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self { session, current: None }
    }

    /// Route the last navigation settled on, if any.
    #[must_use]
    pub fn current(&self) -> Option<Route> {
        self.current
    }

    /// Navigate to `target`, following guard redirects. Returns the route
    /// actually reached.
    pub fn navigate(&mut self, target: Route) -> Route {
        let authenticated = self.session.is_authenticated();
        let (reached, settled) = follow_redirects(target, authenticated, Route::meta);
        if !settled {
            tracing::warn!(from = %target, to = %reached, "redirect limit reached; guard never approved the route");
        }
        self.current = Some(reached);
        reached
    }

    /// # Errors
    ///
    /// Returns [`NavigationError::NotFound`] for a path with no route; the
    /// current route is left unchanged.
    pub fn navigate_path(&mut self, path: &str) -> Result<Route, NavigationError> {
        let route = Route::resolve(path).ok_or_else(|| NavigationError::NotFound(path.to_owned()))?;
        Ok(self.navigate(route))
    }
}

/// Apply the guard from `target` until a route proceeds or the redirect
/// limit runs out. The flag is false when the limit ran out.
fn follow_redirects(target: Route, authenticated: bool, meta_of: impl Fn(Route) -> RouteMeta) -> (Route, bool) {
    let mut target = target;
    for _ in 0..MAX_REDIRECTS {
        match guard::check(meta_of(target), authenticated) {
            GuardDecision::Proceed => return (target, true),
            GuardDecision::Redirect(next) => {
                tracing::debug!(from = %target, to = %next, "navigation redirected");
                target = next;
            }
        }
    }
    (target, false)
}
