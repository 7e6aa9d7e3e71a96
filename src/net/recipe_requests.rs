//! Submitter-side recipe requests (`/recipe-requests`).

use serde_json::Value;

use super::http::{ApiClient, expect_body};
use super::types::{ApiError, FormPayload, ListParams, RequestBody};

pub const RECIPE_REQUESTS_PATH: &str = "/recipe-requests";

fn recipe_request_path(id: u64) -> String {
    format!("{RECIPE_REQUESTS_PATH}/{id}")
}

/// Paginated list of the caller's own recipe requests.
///
/// Filters usually used: `name`, `status`.
///
/// # Errors
///
/// Returns the client error unchanged.
pub async fn list(client: &ApiClient, params: &ListParams) -> Result<Value, ApiError> {
    expect_body(client.get(RECIPE_REQUESTS_PATH, &params.to_query()).await?)
}

/// Submit a new recipe request. Form payload so an image can ride along.
///
/// # Errors
///
/// Returns the client error unchanged.
pub async fn create(client: &ApiClient, form: FormPayload) -> Result<Option<Value>, ApiError> {
    client.post(RECIPE_REQUESTS_PATH, RequestBody::Form(form)).await
}

/// # Errors
///
/// Returns the client error unchanged.
pub async fn update(client: &ApiClient, id: u64, form: FormPayload) -> Result<Option<Value>, ApiError> {
    client.put(&recipe_request_path(id), RequestBody::Form(form)).await
}

/// # Errors
///
/// Returns the client error unchanged.
pub async fn delete(client: &ApiClient, id: u64) -> Result<(), ApiError> {
    client.delete(&recipe_request_path(id)).await.map(|_| ())
}

#[cfg(test)]
#[path = "recipe_requests_test.rs"]
mod recipe_requests_test;
