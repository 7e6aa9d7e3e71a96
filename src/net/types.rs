//! Request/response shapes shared by the HTTP client and the domain modules.
//!
//! DESIGN
//! ======
//! Server records (users, recipes, recipe requests) stay as opaque JSON; the
//! client only types what it builds itself: credentials, list parameters,
//! request bodies and the error taxonomy.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Form field a PHP-style backend reads to treat a `POST` as another verb.
pub const METHOD_OVERRIDE_FIELD: &str = "_method";

/// Fallback message when a rejected response carries no readable JSON body.
pub const GENERIC_FAILURE_MESSAGE: &str = "An error occurred.";

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by API calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The server answered 401; the local session has already been cleared.
    #[error("session expired, please log in again")]
    SessionExpired,

    /// The server answered with another non-success status.
    #[error("{message} (HTTP {status})")]
    Rejected { status: u16, message: String },

    /// The request never produced a response (DNS, refused, timeout, ...).
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// A success response body was not the expected JSON.
    #[error("response decode failed: {0}")]
    Decode(String),

    /// A request body could not be serialized.
    #[error("request encode failed: {0}")]
    Encode(String),

    #[error("invalid request URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),
}

// =============================================================================
// AUTH
// =============================================================================

/// Opaque user record as returned by the API and mirrored in storage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct User(pub Value);

impl User {
    /// Best human label for the user: `name`, then `email`.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        ["name", "email"].iter().find_map(|key| self.0.get(key).and_then(Value::as_str))
    }
}

impl From<Value> for User {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

#[derive(Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials").field("email", &self.email).field("password", &"<redacted>").finish()
    }
}

/// Body of a successful `POST /login`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct LoginResponse {
    pub user: User,
    #[serde(alias = "access_token")]
    pub token: String,
}

// =============================================================================
// QUERY
// =============================================================================

/// Flat GET parameters. Entries whose value is `None` are kept here but
/// never reach the query string.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Query(Vec<(String, Option<String>)>);

impl Query {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.push(key, Some(value.to_string()));
        self
    }

    #[must_use]
    pub fn maybe<V: ToString>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
        self.push(key, value.map(|v| v.to_string()));
        self
    }

    pub fn push(&mut self, key: impl Into<String>, value: Option<String>) {
        self.0.push((key.into(), value));
    }

    /// Present entries only, in insertion order.
    #[must_use]
    pub fn pairs(&self) -> Vec<(&str, &str)> {
        self.0.iter().filter_map(|(k, v)| v.as_deref().map(|v| (k.as_str(), v))).collect()
    }
}

impl<K, V> FromIterator<(K, Option<V>)> for Query
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, Option<V>)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.map(Into::into))).collect())
    }
}

/// Pagination, sorting and `filter[<field>]` parameters understood by the
/// list endpoints.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub sort: Option<String>,
    pub filters: BTreeMap<String, String>,
}

impl ListParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    #[must_use]
    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    #[must_use]
    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    #[must_use]
    pub fn filter(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(field.into(), value.into());
        self
    }

    #[must_use]
    pub fn to_query(&self) -> Query {
        let mut query = Query::new()
            .maybe("page", self.page)
            .maybe("per_page", self.per_page)
            .maybe("sort", self.sort.as_deref());
        for (field, value) in &self.filters {
            query.push(format!("filter[{field}]"), Some(value.clone()));
        }
        query
    }
}

// =============================================================================
// BODIES
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormPart {
    Text(String),
    File { file_name: String, mime: Option<String>, bytes: Vec<u8> },
}

/// Ordered multipart fields. Sent as-is; the transport computes the
/// boundary and the content type.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormPayload {
    fields: Vec<(String, FormPart)>,
}

impl FormPayload {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push_text(name, value);
        self
    }

    #[must_use]
    pub fn file(mut self, name: impl Into<String>, file_name: impl Into<String>, bytes: Vec<u8>, mime: Option<String>) -> Self {
        self.fields.push((name.into(), FormPart::File { file_name: file_name.into(), mime, bytes }));
        self
    }

    pub fn push_text(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), FormPart::Text(value.into())));
    }

    /// Flatten a JSON object into text fields. Nulls are skipped, strings
    /// are sent raw, other scalars use their JSON rendering.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        let mut form = Self::new();
        if let Some(map) = value.as_object() {
            for (key, value) in map {
                match value {
                    Value::Null => {}
                    Value::String(s) => form.push_text(key, s.clone()),
                    other => form.push_text(key, other.to_string()),
                }
            }
        }
        form
    }

    #[must_use]
    pub fn fields(&self) -> &[(String, FormPart)] {
        &self.fields
    }

    #[must_use]
    pub fn text_value(&self, name: &str) -> Option<&str> {
        self.fields.iter().find_map(|(k, part)| match part {
            FormPart::Text(v) if k == name => Some(v.as_str()),
            _ => None,
        })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// # Errors
    ///
    /// Returns [`ApiError::Encode`] if a file part carries an invalid MIME type.
    pub fn into_multipart(self) -> Result<reqwest::multipart::Form, ApiError> {
        let mut form = reqwest::multipart::Form::new();
        for (name, part) in self.fields {
            form = match part {
                FormPart::Text(value) => form.text(name, value),
                FormPart::File { file_name, mime, bytes } => {
                    let mut part = reqwest::multipart::Part::bytes(bytes).file_name(file_name);
                    if let Some(mime) = mime {
                        part = part.mime_str(&mime).map_err(|e| ApiError::Encode(e.to_string()))?;
                    }
                    form.part(name, part)
                }
            };
        }
        Ok(form)
    }
}

/// Payload of a non-GET request.
#[derive(Clone, Debug, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(Value),
    Form(FormPayload),
}

impl RequestBody {
    /// # Errors
    ///
    /// Returns [`ApiError::Encode`] if `payload` cannot be serialized.
    pub fn json<T: Serialize + ?Sized>(payload: &T) -> Result<Self, ApiError> {
        serde_json::to_value(payload).map(Self::Json).map_err(|e| ApiError::Encode(e.to_string()))
    }
}
