// src/services/api.rs

//! Mist REST client: site directory and per-client lookups.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{ApiConfig, ClientRecord, Site};
use crate::services::retry::{RetryPolicy, retry};
use crate::utils::{base_url, http};

/// Per-client statistics lookup used to enrich guest sightings.
#[async_trait]
pub trait ClientLookup: Send + Sync {
    /// Fetch the detailed record of one client on one site.
    ///
    /// Any failure, whether the client is gone or the server erred, is an
    /// error; callers treat both the same way.
    async fn client_stats(&self, site_id: &str, mac: &str) -> Result<ClientRecord>;
}

/// Client for the Mist REST API.
#[derive(Clone)]
pub struct MistClient {
    client: Client,
    base_url: Url,
    org_id: String,
}

impl MistClient {
    /// Create a client from API configuration.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = http::create_async_client(config)?;
        Self::with_client(client, &config.url, &config.org_id)
    }

    /// Create a client around an existing HTTP client.
    pub fn with_client(client: Client, url: &str, org_id: &str) -> Result<Self> {
        Ok(Self {
            client,
            base_url: base_url(url)?,
            org_id: org_id.to_string(),
        })
    }

    /// Fetch the organization's sites, retrying per `policy`.
    ///
    /// Returns an empty list once every attempt failed. Site names come back
    /// normalized.
    pub async fn fetch_sites(&self, policy: &RetryPolicy) -> Vec<Site> {
        retry(policy, "Site directory request", || self.request_sites())
            .await
            .unwrap_or_default()
            .into_iter()
            .map(Site::normalized)
            .collect()
    }

    /// Single site directory request.
    async fn request_sites(&self) -> Result<Vec<Site>> {
        let url = self.base_url.join(&format!("orgs/{}/sites", self.org_id))?;
        log::debug!("GET {}", url);

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(AppError::RateLimited {
                retry_after_secs: http::retry_after_secs(response.headers()),
            });
        }
        if !status.is_success() {
            return Err(AppError::status(status, url));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl ClientLookup for MistClient {
    async fn client_stats(&self, site_id: &str, mac: &str) -> Result<ClientRecord> {
        let url = self
            .base_url
            .join(&format!("sites/{}/stats/clients/{}", site_id, mac))?;
        log::info!("Requesting client details for guest {}", mac);

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        log::info!("Client details request returned {}", status);

        if !status.is_success() {
            return Err(AppError::status(status, url));
        }

        Ok(response.json().await?)
    }
}
