//! Utility functions and helpers.

pub mod http;

use url::Url;

use crate::error::Result;

/// Parse a base URL, making sure it ends with a slash so joins append to it.
pub fn base_url(raw: &str) -> Result<Url> {
    let mut raw = raw.trim().to_string();
    if !raw.ends_with('/') {
        raw.push('/');
    }
    Ok(Url::parse(&raw)?)
}

/// Extract the site ID from a stream channel such as
/// `/sites/<id>/stats/clients`.
pub fn extract_site_id(channel: &str) -> Option<String> {
    let pattern = regex::Regex::new(r"/sites/([^/]+)/stats").ok()?;
    pattern
        .captures(channel)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
