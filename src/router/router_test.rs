use serde_json::json;

use super::*;
use crate::net::types::User;
use crate::state::storage::MemoryStorage;

fn navigator() -> (Navigator, Arc<SessionStore>) {
    let (session, _events) = SessionStore::initialize(Arc::new(MemoryStorage::new()));
    let session = Arc::new(session);
    (Navigator::new(session.clone()), session)
}

// =============================================================================
// guard
// =============================================================================

#[test]
fn guard_table() {
    let auth_only = RouteMeta { requires_auth: true, requires_guest: false };
    let guest_only = RouteMeta { requires_auth: false, requires_guest: true };
    let open = RouteMeta::default();

    assert_eq!(guard::check(auth_only, false), GuardDecision::Redirect(Route::Login));
    assert_eq!(guard::check(auth_only, true), GuardDecision::Proceed);
    assert_eq!(guard::check(guest_only, true), GuardDecision::Redirect(Route::Dashboard));
    assert_eq!(guard::check(guest_only, false), GuardDecision::Proceed);
    assert_eq!(guard::check(open, false), GuardDecision::Proceed);
    assert_eq!(guard::check(open, true), GuardDecision::Proceed);
}

#[test]
fn guard_with_both_flags_checks_auth_first() {
    let both = RouteMeta { requires_auth: true, requires_guest: true };
    assert_eq!(guard::check(both, false), GuardDecision::Redirect(Route::Login));
    assert_eq!(guard::check(both, true), GuardDecision::Redirect(Route::Dashboard));
}

// =============================================================================
// routes
// =============================================================================

#[test]
fn every_layout_child_requires_auth() {
    for route in Route::ALL {
        let meta = route.meta();
        if route == Route::Login {
            assert!(meta.requires_guest && !meta.requires_auth);
        } else {
            assert!(meta.requires_auth && !meta.requires_guest, "{route}");
        }
    }
}

#[test]
fn resolve_paths() {
    assert_eq!(Route::resolve("/"), Some(Route::Home));
    assert_eq!(Route::resolve("/dashboard/"), Some(Route::Dashboard));
    assert_eq!(Route::resolve("/RecipeRequest"), Some(Route::RecipeRequests));
    assert_eq!(Route::resolve("/login"), Some(Route::Login));
    assert_eq!(Route::resolve("/nowhere"), None);
    assert_eq!(Route::resolve(""), None);
    for route in Route::ALL {
        assert_eq!(Route::resolve(route.path()), Some(route));
    }
}

// =============================================================================
// navigator
// =============================================================================

#[test]
fn unauthenticated_navigation_lands_on_login() {
    let (mut nav, _) = navigator();
    assert_eq!(nav.current(), None);
    assert_eq!(nav.navigate(Route::Dashboard), Route::Login);
    assert_eq!(nav.navigate(Route::Login), Route::Login);
    assert_eq!(nav.current(), Some(Route::Login));
}

#[test]
fn authenticated_navigation_skips_login() {
    let (mut nav, session) = navigator();
    session.login(User(json!({ "id": 1 })), "tok").unwrap();

    assert_eq!(nav.navigate(Route::Recipes), Route::Recipes);
    assert_eq!(nav.navigate(Route::Login), Route::Dashboard);
}

#[test]
fn decision_is_reevaluated_after_session_changes() {
    let (mut nav, session) = navigator();
    session.login(User(json!({ "id": 1 })), "tok").unwrap();
    assert_eq!(nav.navigate(Route::NewRecipe), Route::NewRecipe);

    session.expire();
    assert_eq!(nav.navigate(Route::NewRecipe), Route::Login);
}

#[test]
fn navigate_path_unknown_keeps_current() {
    let (mut nav, _) = navigator();
    nav.navigate(Route::Login);
    let err = nav.navigate_path("/missing").unwrap_err();
    assert_eq!(err.to_string(), "no view at /missing");
    assert_eq!(nav.current(), Some(Route::Login));
    assert_eq!(nav.navigate_path("/").unwrap(), Route::Login);
}

#[test]
fn redirects_settle_on_an_approved_route() {
    assert_eq!(follow_redirects(Route::Login, true, Route::meta), (Route::Dashboard, true));
    assert_eq!(follow_redirects(Route::Recipes, false, Route::meta), (Route::Login, true));
    assert_eq!(follow_redirects(Route::Home, true, Route::meta), (Route::Home, true));
}

#[test]
fn redirect_loop_stops_at_limit_unsettled() {
    let everything_needs_auth = |_: Route| RouteMeta { requires_auth: true, requires_guest: false };
    assert_eq!(follow_redirects(Route::Dashboard, false, everything_needs_auth), (Route::Login, false));
}
