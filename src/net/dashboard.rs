//! Admin dashboard endpoints: published recipes, their ingredients and
//! steps, and moderation of submitted recipe requests.
//!
//! SYSTEM CONTEXT
//! ==============
//! Each function maps one admin action to a fixed path under `/dashboard`.
//! Recipe bodies are forms (image upload); ingredient and step bodies are
//! JSON. Updates go through `ApiClient::put`, which applies the configured
//! verb strategy.

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod dashboard_test;

use serde::Serialize;
use serde_json::Value;

use super::http::{ApiClient, expect_body};
use super::types::{ApiError, FormPayload, ListParams, Query, RequestBody};

const RECIPES_PATH: &str = "/dashboard/recipes";
const RECIPE_REQUESTS_PATH: &str = "/dashboard/recipe-requests";

/// Ingredient fields; `None` fields are omitted so partial updates work.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct IngredientInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measure: Option<String>,
}

/// Step fields; `duration` is in minutes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StepInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
}

fn recipe_path(id: u64) -> String {
    format!("{RECIPES_PATH}/{id}")
}

fn ingredient_path(id: u64) -> String {
    format!("{RECIPES_PATH}/ingredients/{id}")
}

fn step_path(id: u64) -> String {
    format!("{RECIPES_PATH}/steps/{id}")
}

fn recipe_request_path(id: u64) -> String {
    format!("{RECIPE_REQUESTS_PATH}/{id}")
}

// =============================================================================
// RECIPES
// =============================================================================

/// # Errors
///
/// Returns the client error unchanged.
pub async fn list_recipes(client: &ApiClient, params: &ListParams) -> Result<Value, ApiError> {
    expect_body(client.get(RECIPES_PATH, &params.to_query()).await?)
}

/// # Errors
///
/// Returns the client error unchanged.
pub async fn create_recipe(client: &ApiClient, form: FormPayload) -> Result<Option<Value>, ApiError> {
    client.post(RECIPES_PATH, RequestBody::Form(form)).await
}

/// # Errors
///
/// Returns the client error unchanged.
pub async fn update_recipe(client: &ApiClient, id: u64, form: FormPayload) -> Result<Option<Value>, ApiError> {
    client.put(&recipe_path(id), RequestBody::Form(form)).await
}

/// # Errors
///
/// Returns the client error unchanged.
pub async fn delete_recipe(client: &ApiClient, id: u64) -> Result<(), ApiError> {
    client.delete(&recipe_path(id)).await.map(|_| ())
}

// =============================================================================
// INGREDIENTS
// =============================================================================

/// # Errors
///
/// Returns the client error unchanged.
pub async fn add_ingredient(
    client: &ApiClient,
    recipe_id: u64,
    ingredient: &IngredientInput,
) -> Result<Option<Value>, ApiError> {
    let path = format!("{}/ingredients", recipe_path(recipe_id));
    client.post(&path, RequestBody::json(ingredient)?).await
}

/// # Errors
///
/// Returns the client error unchanged.
pub async fn update_ingredient(
    client: &ApiClient,
    ingredient_id: u64,
    ingredient: &IngredientInput,
) -> Result<Option<Value>, ApiError> {
    client.put(&ingredient_path(ingredient_id), RequestBody::json(ingredient)?).await
}

/// # Errors
///
/// Returns the client error unchanged.
pub async fn delete_ingredient(client: &ApiClient, ingredient_id: u64) -> Result<(), ApiError> {
    client.delete(&ingredient_path(ingredient_id)).await.map(|_| ())
}

// =============================================================================
// STEPS
// =============================================================================

/// # Errors
///
/// Returns the client error unchanged.
pub async fn add_step(client: &ApiClient, recipe_id: u64, step: &StepInput) -> Result<Option<Value>, ApiError> {
    let path = format!("{}/steps", recipe_path(recipe_id));
    client.post(&path, RequestBody::json(step)?).await
}

/// # Errors
///
/// Returns the client error unchanged.
pub async fn update_step(client: &ApiClient, step_id: u64, step: &StepInput) -> Result<Option<Value>, ApiError> {
    client.put(&step_path(step_id), RequestBody::json(step)?).await
}

/// # Errors
///
/// Returns the client error unchanged.
pub async fn delete_step(client: &ApiClient, step_id: u64) -> Result<(), ApiError> {
    client.delete(&step_path(step_id)).await.map(|_| ())
}

// =============================================================================
// MODERATION
// =============================================================================

/// All submitted recipe requests, across submitters.
///
/// # Errors
///
/// Returns the client error unchanged.
pub async fn list_recipe_requests(client: &ApiClient, params: &ListParams) -> Result<Value, ApiError> {
    expect_body(client.get(RECIPE_REQUESTS_PATH, &params.to_query()).await?)
}

/// # Errors
///
/// Returns the client error unchanged.
pub async fn recipe_request_details(client: &ApiClient, id: u64) -> Result<Value, ApiError> {
    expect_body(client.get(&recipe_request_path(id), &Query::new()).await?)
}

/// # Errors
///
/// Returns the client error unchanged.
pub async fn approve_recipe_request(client: &ApiClient, id: u64) -> Result<Option<Value>, ApiError> {
    let path = format!("{}/approve", recipe_request_path(id));
    client.put(&path, RequestBody::Empty).await
}

/// # Errors
///
/// Returns the client error unchanged.
pub async fn reject_recipe_request(client: &ApiClient, id: u64) -> Result<Option<Value>, ApiError> {
    let path = format!("{}/reject", recipe_request_path(id));
    client.put(&path, RequestBody::Empty).await
}

/// # Errors
///
/// Returns the client error unchanged.
pub async fn delete_recipe_request(client: &ApiClient, id: u64) -> Result<(), ApiError> {
    client.delete(&recipe_request_path(id)).await.map(|_| ())
}
