//! Trust-root fetching
//!
//! The engine is synchronous; trust roots are refreshed with a blocking
//! HTTP client. The fetch sits behind [`TrustRootSource`] so verification
//! tests can substitute a double that records which provider's material was
//! requested.

use crate::error::{Error, Result};
use std::time::Duration;

/// Source of raw trust-root bytes
pub trait TrustRootSource {
    /// Fetch the trust-root document at `url`
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// HTTP trust-root source
pub struct HttpSource {
    client: reqwest::blocking::Client,
}

impl HttpSource {
    /// Build a source with a bounded request timeout
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Http(format!("HTTP client construction failed: {}", e)))?;
        Ok(Self { client })
    }
}

impl TrustRootSource for HttpSource {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        tracing::debug!(url, "refreshing trust root");
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| Error::Http(format!("GET {} failed: {}", url, e)))?;
        if !response.status().is_success() {
            return Err(Error::Http(format!(
                "GET {} returned {}",
                url,
                response.status()
            )));
        }
        let bytes = response
            .bytes()
            .map_err(|e| Error::Http(format!("reading {} failed: {}", url, e)))?;
        Ok(bytes.to_vec())
    }
}
