//! Top-level coordinator: owns navigation and reacts to session events.
//!
//! DESIGN
//! ======
//! The HTTP client and the session never navigate. They emit
//! [`SessionEvent`]s; `AdminApp` drains them and moves the navigator:
//! a login lands on the dashboard, a logout or an expired session lands on
//! the login view.

#[cfg(test)]
#[path = "app_test.rs"]
mod app_test;

use std::sync::Arc;

use crate::config::AdminConfig;
use crate::net::ApiClient;
use crate::net::auth;
use crate::net::types::{ApiError, Credentials};
use crate::router::{AUTHENTICATED_LANDING, LOGIN_ROUTE, NavigationError, Navigator, Route};
use crate::state::session::{SessionError, SessionEvent, SessionEvents, SessionStore};
use crate::state::storage::SessionStorage;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Navigation(#[from] NavigationError),
}

pub struct AdminApp {
    session: Arc<SessionStore>,
    client: ApiClient,
    navigator: Navigator,
    events: SessionEvents,
}

impl AdminApp {
    /// Restore the session from `storage` and wire client and navigator to it.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Api`] if the HTTP client cannot be built.
    pub fn new(config: &AdminConfig, storage: Arc<dyn SessionStorage>) -> Result<Self, AppError> {
        let (session, events) = SessionStore::initialize(storage);
        let session = Arc::new(session);
        let client = ApiClient::new(config, session.clone())?;
        let navigator = Navigator::new(session.clone());
        Ok(Self { session, client, navigator, events })
    }

    #[must_use]
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    #[must_use]
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    #[must_use]
    pub fn current_route(&self) -> Option<Route> {
        self.navigator.current()
    }

    /// Navigate to `route` after applying any pending session events.
    pub fn open(&mut self, route: Route) -> Route {
        self.process_events();
        self.navigator.navigate(route)
    }

    /// # Errors
    ///
    /// Returns [`AppError::Navigation`] for an unknown path.
    pub fn open_path(&mut self, path: &str) -> Result<Route, AppError> {
        self.process_events();
        Ok(self.navigator.navigate_path(path)?)
    }

    /// Drain pending session events, navigating for each. Returns the route
    /// reached by the last one, if any arrived.
    pub fn process_events(&mut self) -> Option<Route> {
        let mut reached = None;
        while let Ok(event) = self.events.try_recv() {
            let target = landing_for(event);
            tracing::debug!(?event, %target, "session event");
            reached = Some(self.navigator.navigate(target));
        }
        reached
    }

    /// Authenticate, store the credentials and land on the dashboard.
    ///
    /// # Errors
    ///
    /// Returns the API error from `POST /login`, or the session error if the
    /// response lacks a usable user or token or cannot be persisted. The
    /// session is unchanged on error.
    pub async fn sign_in(&mut self, credentials: &Credentials) -> Result<Route, AppError> {
        let response = auth::login(&self.client, credentials).await?;
        self.session.login(response.user, response.token)?;
        tracing::info!(email = %credentials.email, "signed in");
        Ok(self.process_events().unwrap_or_else(|| self.navigator.navigate(AUTHENTICATED_LANDING)))
    }

    /// Log out (remote best-effort, local always) and land on the login view.
    pub async fn sign_out(&mut self) -> Route {
        self.session.logout(&self.client).await;
        self.process_events().unwrap_or_else(|| self.navigator.navigate(LOGIN_ROUTE))
    }
}

/// Navigation consequence of a session event.
#[must_use]
pub fn landing_for(event: SessionEvent) -> Route {
    match event {
        SessionEvent::LoggedIn => AUTHENTICATED_LANDING,
        SessionEvent::LoggedOut | SessionEvent::Expired => LOGIN_ROUTE,
    }
}
