//! Access check run before every route change.
//!
//! Pure and synchronous: the decision depends only on the target's metadata
//! and the session's current `is_authenticated`, read fresh each time.

use super::routes::{AUTHENTICATED_LANDING, LOGIN_ROUTE, Route, RouteMeta};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    Proceed,
    Redirect(Route),
}

/// Routes carrying neither flag always proceed.
#[must_use]
pub fn check(meta: RouteMeta, is_authenticated: bool) -> GuardDecision {
    if meta.requires_auth && !is_authenticated {
        GuardDecision::Redirect(LOGIN_ROUTE)
    } else if meta.requires_guest && is_authenticated {
        GuardDecision::Redirect(AUTHENTICATED_LANDING)
    } else {
        GuardDecision::Proceed
    }
}
