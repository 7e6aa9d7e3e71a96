//! Networking modules for the remote recipe API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `http` owns request construction and response classification; `auth`,
//! `recipe_requests` and `dashboard` map each action to a fixed path; `types`
//! defines bodies, queries and errors.

pub mod auth;
pub mod dashboard;
pub mod http;
pub mod recipe_requests;
pub mod types;

pub use http::ApiClient;
pub use types::ApiError;
