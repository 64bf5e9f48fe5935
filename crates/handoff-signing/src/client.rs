//! Well-known keys endpoint client.
//!
//! HTTP client for the platform's published signing keys. The public key
//! cache calls this once per refresh cycle; everything else reads from
//! the cache.

use crate::error::{SigningError, SigningResult};
use crate::keys::WellKnownKeys;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Path of the published keys listing, relative to the platform base URL.
const WELL_KNOWN_KEYS_PATH: &str = "/v2/.well-known/keys";

/// Source of the published key listing.
///
/// Abstracts the HTTP endpoint so the cache can be exercised against an
/// in-process fetcher in tests.
#[async_trait]
pub trait KeyFetcher: Send + Sync {
    /// Fetch the full current key listing.
    async fn fetch_keys(&self) -> SigningResult<WellKnownKeys>;
}

/// HTTP client for `GET <base>/v2/.well-known/keys`.
#[derive(Clone)]
pub struct HttpKeyFetcher {
    /// HTTP client instance.
    client: Client,

    /// Platform base URL, without the well-known path.
    base_url: String,
}

impl HttpKeyFetcher {
    /// Create a new fetcher for the given platform base URL.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the key-publishing service
    /// * `timeout` - Request timeout
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn keys_url(&self) -> String {
        format!("{}{}", self.base_url, WELL_KNOWN_KEYS_PATH)
    }
}

#[async_trait]
impl KeyFetcher for HttpKeyFetcher {
    async fn fetch_keys(&self) -> SigningResult<WellKnownKeys> {
        let url = self.keys_url();
        debug!(url = %url, "Fetching well-known keys listing");

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(SigningError::UnexpectedStatus(response.status().as_u16()));
        }

        let listing: WellKnownKeys = response.json().await?;
        debug!(count = listing.keys.len(), "Fetched well-known keys listing");

        Ok(listing)
    }
}
