//! Auth-session state for the current operator.
//!
//! SYSTEM CONTEXT
//! ==============
//! One `SessionStore` is constructed at startup and shared by `Arc` with the
//! HTTP client (which reads the token and expires the session on 401) and
//! the app coordinator (which turns session events into navigation).
//!
//! INVARIANTS
//! ==========
//! User and token are written and cleared together. `is_authenticated` is
//! derived from both on every read.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::mpsc;

use super::storage::{SessionStorage, StorageError, TOKEN_KEY, USER_KEY};
use crate::net::ApiClient;
use crate::net::auth;
use crate::net::types::User;

/// Snapshot of the current credentials.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Session {
    pub user: Option<User>,
    pub token: Option<String>,
}

impl Session {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.as_ref().is_some_and(|u| !u.0.is_null()) && self.token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// A null user or a blank token would persist a session that no reader
    /// treats as authenticated.
    #[error("login response carried no usable user or token")]
    IncompleteCredentials,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Lifecycle signals consumed by the coordinator, which owns navigation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    LoggedIn,
    LoggedOut,
    /// The server rejected the token; credentials were cleared locally.
    Expired,
}

pub type SessionEvents = mpsc::UnboundedReceiver<SessionEvent>;

pub struct SessionStore {
    storage: Arc<dyn SessionStorage>,
    current: RwLock<Session>,
    events: mpsc::UnboundedSender<SessionEvent>,
}

impl SessionStore {
    /// Restore the session mirrored in `storage`.
    ///
    /// A persisted user that is not valid JSON means the mirror is corrupt:
    /// both entries are removed and the session starts logged out. This is
    /// logged and never reported to the caller.
    pub fn initialize(storage: Arc<dyn SessionStorage>) -> (Self, SessionEvents) {
        let (tx, rx) = mpsc::unbounded_channel();
        let token = storage.get(TOKEN_KEY).filter(|t| !t.is_empty());

        let session = match storage.get(USER_KEY) {
            None => Session { user: None, token },
            Some(raw) => match serde_json::from_str::<serde_json::Value>(&raw) {
                Ok(serde_json::Value::Null) => Session { user: None, token },
                Ok(value) => Session { user: Some(User(value)), token },
                Err(e) => {
                    tracing::error!(error = %e, "persisted user is corrupt; clearing stored session");
                    remove_logged(storage.as_ref(), USER_KEY);
                    remove_logged(storage.as_ref(), TOKEN_KEY);
                    Session::default()
                }
            },
        };

        tracing::debug!(authenticated = session.is_authenticated(), "session restored");
        let store = Self { storage, current: RwLock::new(session), events: tx };
        (store, rx)
    }

    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.current.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.current.read().unwrap_or_else(PoisonError::into_inner).token.clone()
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.current.read().unwrap_or_else(PoisonError::into_inner).user.clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.current.read().unwrap_or_else(PoisonError::into_inner).is_authenticated()
    }

    /// Store user and token durably and in memory, then emit
    /// [`SessionEvent::LoggedIn`].
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::IncompleteCredentials`] for a null user or a
    /// blank token, before anything is written. Returns the storage error if
    /// either entry cannot be persisted; any entry already written is rolled
    /// back. The in-memory session is left untouched on every error.
    pub fn login(&self, user: User, token: impl Into<String>) -> Result<(), SessionError> {
        let token = token.into();
        if user.0.is_null() || token.trim().is_empty() {
            tracing::warn!(null_user = user.0.is_null(), "refusing incomplete credentials");
            return Err(SessionError::IncompleteCredentials);
        }
        let raw_user = serde_json::to_string(&user).map_err(StorageError::from)?;

        let persisted = self
            .storage
            .set(TOKEN_KEY, &token)
            .and_then(|()| self.storage.set(USER_KEY, &raw_user));
        if let Err(e) = persisted {
            tracing::error!(error = %e, "failed to persist session; rolling back");
            remove_logged(self.storage.as_ref(), TOKEN_KEY);
            remove_logged(self.storage.as_ref(), USER_KEY);
            return Err(e.into());
        }

        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Session { user: Some(user), token: Some(token) };
        tracing::info!("session started");
        self.emit(SessionEvent::LoggedIn);
        Ok(())
    }

    /// Best-effort server-side invalidation, then unconditional local logout.
    ///
    /// The remote call's failure is logged and swallowed; local state is
    /// always cleared and [`SessionEvent::LoggedOut`] always emitted.
    pub async fn logout(&self, client: &ApiClient) {
        match auth::logout(client).await {
            Ok(()) => tracing::info!("server-side logout succeeded"),
            Err(e) => tracing::warn!(error = %e, "server-side logout failed; clearing local session anyway"),
        }
        self.clear();
        self.emit(SessionEvent::LoggedOut);
    }

    /// Drop credentials after the server rejected them. Idempotent.
    pub fn expire(&self) {
        self.clear();
        tracing::warn!("session expired");
        self.emit(SessionEvent::Expired);
    }

    fn clear(&self) {
        remove_logged(self.storage.as_ref(), TOKEN_KEY);
        remove_logged(self.storage.as_ref(), USER_KEY);
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Session::default();
    }

    fn emit(&self, event: SessionEvent) {
        if self.events.send(event).is_err() {
            tracing::debug!(?event, "no listener for session event");
        }
    }
}

fn remove_logged(storage: &dyn SessionStorage, key: &str) {
    if let Err(e) = storage.remove(key) {
        tracing::warn!(key, error = %e, "failed to remove persisted session entry");
    }
}
