// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use reqwest::header::{self, HeaderMap, HeaderValue};

use crate::error::{AppError, Result};
use crate::models::ApiConfig;

/// Value of the `Authorization` header for a Mist API token.
pub fn auth_header_value(token: &str) -> String {
    format!("Token {}", token)
}

/// Create a configured asynchronous HTTP client.
///
/// Every request carries the API token and a JSON content type.
pub fn create_async_client(config: &ApiConfig) -> Result<reqwest::Client> {
    let mut auth = HeaderValue::from_str(&auth_header_value(&config.token))
        .map_err(|e| AppError::config(format!("api.token is not a valid header value: {e}")))?;
    auth.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(header::AUTHORIZATION, auth);
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );

    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .default_headers(headers)
        .build()?;
    Ok(client)
}

/// Parse a `Retry-After` header given in seconds.
///
/// HTTP-date values are not supported and yield `None`.
pub fn retry_after_secs(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}
