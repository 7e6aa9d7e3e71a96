//! Uniform request/response handling for every API call.
//!
//! ERROR HANDLING
//! ==============
//! Responses are classified in a fixed order: 401 expires the session and
//! fails with [`ApiError::SessionExpired`]; any other non-success fails with
//! the server's `message` when it sent one; 204 resolves to `None`; anything
//! else resolves to the parsed JSON body. Transport failures are logged here
//! and handed back unchanged. Nothing is retried.

#[cfg(test)]
#[path = "http_test.rs"]
mod http_test;

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderValue};
use reqwest::{Method, StatusCode, Url};
use serde_json::Value;

use super::types::{ApiError, FormPayload, GENERIC_FAILURE_MESSAGE, METHOD_OVERRIDE_FIELD, Query, RequestBody};
use crate::config::AdminConfig;
use crate::state::session::SessionStore;

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<SessionStore>,
    form_method_override: bool,
}

impl ApiClient {
    /// # Errors
    ///
    /// Returns [`ApiError::ClientBuild`] if the underlying reqwest client
    /// cannot be constructed.
    pub fn new(config: &AdminConfig, session: Arc<SessionStore>) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeouts.request_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = config.timeouts.connect_secs {
            builder = builder.connect_timeout(Duration::from_secs(secs));
        }
        let http = builder.build().map_err(|e| ApiError::ClientBuild(e.to_string()))?;
        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_owned(),
            session,
            form_method_override: config.form_method_override,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Absolute URL for `path`, with present query entries appended.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] if base URL and path do not form a URL.
    pub fn url(&self, path: &str, query: &Query) -> Result<Url, ApiError> {
        let raw = format!("{}{}", self.base_url, path);
        let mut url = Url::parse(&raw).map_err(|e| ApiError::InvalidUrl { url: raw.clone(), reason: e.to_string() })?;
        let pairs = query.pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        Ok(url)
    }

    /// # Errors
    ///
    /// See the module docs for the error classification.
    pub async fn get(&self, path: &str, query: &Query) -> Result<Option<Value>, ApiError> {
        self.send(Method::GET, path, query, RequestBody::Empty).await
    }

    /// # Errors
    ///
    /// See the module docs for the error classification.
    pub async fn post(&self, path: &str, body: RequestBody) -> Result<Option<Value>, ApiError> {
        self.send(Method::POST, path, &Query::new(), body).await
    }

    /// Replace a resource. Uses a native `PUT` unless form method override
    /// is configured, in which case the body is sent as a form `POST`
    /// carrying `_method=PUT`.
    ///
    /// # Errors
    ///
    /// See the module docs for the error classification.
    pub async fn put(&self, path: &str, body: RequestBody) -> Result<Option<Value>, ApiError> {
        if !self.form_method_override {
            return self.send(Method::PUT, path, &Query::new(), body).await;
        }
        let mut form = match body {
            RequestBody::Empty => FormPayload::new(),
            RequestBody::Json(value) => FormPayload::from_json(&value),
            RequestBody::Form(form) => form,
        };
        form.push_text(METHOD_OVERRIDE_FIELD, "PUT");
        self.send(Method::POST, path, &Query::new(), RequestBody::Form(form)).await
    }

    /// Partial update. Always a native `PATCH`.
    ///
    /// # Errors
    ///
    /// See the module docs for the error classification.
    pub async fn patch(&self, path: &str, body: RequestBody) -> Result<Option<Value>, ApiError> {
        self.send(Method::PATCH, path, &Query::new(), body).await
    }

    /// # Errors
    ///
    /// See the module docs for the error classification.
    pub async fn delete(&self, path: &str) -> Result<Option<Value>, ApiError> {
        self.send(Method::DELETE, path, &Query::new(), RequestBody::Empty).await
    }

    async fn send(&self, method: Method, path: &str, query: &Query, body: RequestBody) -> Result<Option<Value>, ApiError> {
        let url = self.url(path, query)?;
        tracing::debug!(%method, %url, "api request");

        let mut request = self
            .http
            .request(method.clone(), url)
            .header(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = self.session.token() {
            request = request.bearer_auth(token);
        }
        request = match body {
            RequestBody::Empty => request,
            RequestBody::Json(value) => request.json(&value),
            RequestBody::Form(form) => request.multipart(form.into_multipart()?),
        };

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(%method, path, error = %e, "api request failed");
                return Err(ApiError::Transport(e));
            }
        };
        self.handle_response(&method, path, response).await
    }

    async fn handle_response(
        &self,
        method: &Method,
        path: &str,
        response: reqwest::Response,
    ) -> Result<Option<Value>, ApiError> {
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!(%method, path, "api answered 401; expiring session");
            self.session.expire();
            return Err(ApiError::SessionExpired);
        }

        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            let message = rejection_message(status, &body);
            tracing::warn!(%method, path, status = status.as_u16(), %message, "api rejected request");
            return Err(ApiError::Rejected { status: status.as_u16(), message });
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                tracing::error!(%method, path, error = %e, "reading api response failed");
                return Err(ApiError::Transport(e));
            }
        };
        serde_json::from_slice(&body).map(Some).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// Human-readable message for a rejected response.
///
/// A JSON body's `message` wins; JSON without one names the status; a body
/// that is not JSON at all gets the generic message.
fn rejection_message(status: StatusCode, body: &[u8]) -> String {
    let Ok(parsed) = serde_json::from_slice::<Value>(body) else {
        return GENERIC_FAILURE_MESSAGE.to_owned();
    };
    match parsed.get("message").and_then(Value::as_str).filter(|m| !m.is_empty()) {
        Some(message) => message.to_owned(),
        None => format!("API error: {}", status.canonical_reason().unwrap_or(status.as_str())),
    }
}

/// Unwrap a response that must carry a body.
///
/// # Errors
///
/// Returns [`ApiError::Decode`] when the server answered with no content.
pub fn expect_body(value: Option<Value>) -> Result<Value, ApiError> {
    value.ok_or_else(|| ApiError::Decode("expected a response body, got none".to_owned()))
}
