//! HTTP template fetching.
//!
//! Provides a blocking HTTP client for retrieving the template manifest and
//! template files. Every request is bounded by a timeout; expiry is reported
//! as a network error like any other transport failure.

use reqwest::blocking::Client;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{BerthError, Result};

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches templates over HTTP/HTTPS.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpFetcher {
    /// Create a new HTTP fetcher with the default 30-second timeout.
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create a new HTTP fetcher with custom timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("berth/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| BerthError::Network {
                url: String::new(),
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self { client, timeout })
    }

    /// Get the configured timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Fetch a URL and return the response body.
    pub fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| self.network_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BerthError::Network {
                url: url.to_string(),
                message: format!("HTTP {}", status),
            });
        }

        let body = response.bytes().map_err(|e| self.network_error(url, e))?;
        Ok(body.to_vec())
    }

    /// Fetch a URL and write the body to `dest`, replacing any existing file.
    ///
    /// Returns the number of bytes written.
    pub fn fetch_to(&self, url: &str, dest: &Path) -> Result<u64> {
        let body = self.fetch(url)?;
        fs::write(dest, &body).map_err(|e| BerthError::fs(dest, e))?;
        Ok(body.len() as u64)
    }

    fn network_error(&self, url: &str, err: reqwest::Error) -> BerthError {
        let message = if err.is_timeout() {
            format!("request timed out after {}s", self.timeout.as_secs())
        } else {
            err.to_string()
        };

        BerthError::Network {
            url: url.to_string(),
            message,
        }
    }
}
