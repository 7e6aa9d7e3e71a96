//! Client configuration parsed from environment variables.
//!
//! The binary loads `.env` first (via `dotenvy`), then command-line flags
//! override whatever the environment provided.

use std::path::PathBuf;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api";
pub const DEFAULT_SESSION_FILE: &str = ".recipe-admin/session.json";

const API_URL_VAR: &str = "RECIPE_ADMIN_API_URL";
const SESSION_FILE_VAR: &str = "RECIPE_ADMIN_SESSION_FILE";
const METHOD_OVERRIDE_VAR: &str = "RECIPE_ADMIN_FORM_METHOD_OVERRIDE";
const REQUEST_TIMEOUT_VAR: &str = "RECIPE_ADMIN_REQUEST_TIMEOUT_SECS";
const CONNECT_TIMEOUT_VAR: &str = "RECIPE_ADMIN_CONNECT_TIMEOUT_SECS";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },
}

/// Optional transport timeouts. `None` leaves reqwest's default in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Timeouts {
    pub request_secs: Option<u64>,
    pub connect_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminConfig {
    /// API base URL without a trailing slash.
    pub api_url: String,
    /// File mirroring the `token` / `user` entries between runs.
    pub session_file: PathBuf,
    /// Send form updates as `POST` + `_method=PUT` instead of a native `PUT`.
    pub form_method_override: bool,
    pub timeouts: Timeouts,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_owned(),
            session_file: PathBuf::from(DEFAULT_SESSION_FILE),
            form_method_override: false,
            timeouts: Timeouts::default(),
        }
    }
}

impl AdminConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `RECIPE_ADMIN_API_URL`: default `http://127.0.0.1:8000/api`
    /// - `RECIPE_ADMIN_SESSION_FILE`: default `.recipe-admin/session.json`
    /// - `RECIPE_ADMIN_FORM_METHOD_OVERRIDE`: `true`/`false`, default false
    /// - `RECIPE_ADMIN_REQUEST_TIMEOUT_SECS`: unset by default
    /// - `RECIPE_ADMIN_CONNECT_TIMEOUT_SECS`: unset by default
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when a boolean or numeric
    /// variable is set to something unparsable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`AdminConfig::from_env`], reading values through `lookup`.
    ///
    /// # Errors
    ///
    /// See [`AdminConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup(API_URL_VAR)
            .filter(|raw| !raw.trim().is_empty())
            .map_or_else(|| DEFAULT_API_URL.to_owned(), |raw| normalize_api_url(&raw));
        let session_file = lookup(SESSION_FILE_VAR)
            .filter(|raw| !raw.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_SESSION_FILE), PathBuf::from);

        let form_method_override = match lookup(METHOD_OVERRIDE_VAR) {
            None => false,
            Some(raw) => parse_bool(&raw)
                .ok_or(ConfigError::InvalidValue { var: METHOD_OVERRIDE_VAR, value: raw })?,
        };

        let timeouts = Timeouts {
            request_secs: parse_secs(REQUEST_TIMEOUT_VAR, lookup(REQUEST_TIMEOUT_VAR))?,
            connect_secs: parse_secs(CONNECT_TIMEOUT_VAR, lookup(CONNECT_TIMEOUT_VAR))?,
        };

        Ok(Self { api_url, session_file, form_method_override, timeouts })
    }
}

pub fn normalize_api_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_owned()
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_secs(var: &'static str, raw: Option<String>) -> Result<Option<u64>, ConfigError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    if raw.trim().is_empty() {
        return Ok(None);
    }
    raw.trim()
        .parse::<u64>()
        .map(Some)
        .map_err(|_| ConfigError::InvalidValue { var, value: raw })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
