//! Route table for the admin views.
//!
//! Every view except `/login` sits under the authenticated layout at `/`
//! and inherits its `requires_auth` flag. `/` itself redirects to `/home`.

use std::fmt;

/// Access requirements attached to a route.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RouteMeta {
    pub requires_auth: bool,
    pub requires_guest: bool,
}

const LAYOUT_META: RouteMeta = RouteMeta { requires_auth: true, requires_guest: false };
const GUEST_META: RouteMeta = RouteMeta { requires_auth: false, requires_guest: true };

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Recipes,
    RecipeRequests,
    Dashboard,
    NewRecipe,
    Login,
}

/// Where the guard sends unauthenticated navigation.
pub const LOGIN_ROUTE: Route = Route::Login;

/// Where the guard sends authenticated users away from guest-only views,
/// and where a fresh login lands.
pub const AUTHENTICATED_LANDING: Route = Route::Dashboard;

impl Route {
    pub const ALL: [Route; 6] =
        [Route::Home, Route::Recipes, Route::RecipeRequests, Route::Dashboard, Route::NewRecipe, Route::Login];

    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Home => "/home",
            Self::Recipes => "/recipe",
            Self::RecipeRequests => "/reciperequest",
            Self::Dashboard => "/dashboard",
            Self::NewRecipe => "/createrecipe",
            Self::Login => "/login",
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Recipes => "recipe",
            Self::RecipeRequests => "recipeRequest",
            Self::Dashboard => "Dashboard",
            Self::NewRecipe => "NewRecipe",
            Self::Login => "Login",
        }
    }

    #[must_use]
    pub fn meta(self) -> RouteMeta {
        match self {
            Self::Login => GUEST_META,
            Self::Home | Self::Recipes | Self::RecipeRequests | Self::Dashboard | Self::NewRecipe => LAYOUT_META,
        }
    }

    /// Resolve a path to its route. `/` resolves to `/home`; a trailing slash
    /// and letter case are ignored. Unknown paths yield `None`.
    #[must_use]
    pub fn resolve(path: &str) -> Option<Self> {
        let trimmed = path.trim();
        let normalized = trimmed.trim_end_matches('/');
        if normalized.is_empty() && trimmed.starts_with('/') {
            return Some(Self::Home);
        }
        Self::ALL.into_iter().find(|route| route.path().eq_ignore_ascii_case(normalized))
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
