//! Authentication endpoints.
//!
//! These only talk to the server; storing the returned credentials is the
//! session's job (see `SessionStore::login`).

use serde_json::json;

use super::http::{ApiClient, expect_body};
use super::types::{ApiError, Credentials, LoginResponse, RequestBody};

pub const LOGIN_PATH: &str = "/login";
pub const LOGOUT_PATH: &str = "/logout";

/// Exchange credentials for a user record and bearer token via `POST /login`.
///
/// # Errors
///
/// Returns the client error, or [`ApiError::Decode`] if the response lacks
/// `user` or `token`.
pub async fn login(client: &ApiClient, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
    let body = expect_body(client.post(LOGIN_PATH, RequestBody::json(credentials)?).await?)?;
    serde_json::from_value(body).map_err(|e| ApiError::Decode(format!("login response: {e}")))
}

/// Invalidate the current token server-side via `POST /logout`.
///
/// # Errors
///
/// Returns the client error unchanged.
pub async fn logout(client: &ApiClient) -> Result<(), ApiError> {
    client.post(LOGOUT_PATH, RequestBody::Json(json!({}))).await.map(|_| ())
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;
