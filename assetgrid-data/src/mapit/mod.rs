//! Administrative-area lookup through the MapIt API.
//!
//! [`MapitClient`] resolves an area id into the bounding box of its boundary,
//! in British National Grid coordinates, as an alternative to configuring a
//! box by hand.

mod response;

use std::time::Duration;

use assetgrid_core::BoundingBox;
use thiserror::Error;

use crate::http::{BlockingClient, FailureKind, ProviderBuildError, classify};

pub use response::AreaGeometry;

/// Public MapIt instance.
pub const DEFAULT_MAPIT_URL: &str = "https://mapit.mysociety.org";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Errors returned by [`AreaLookup::bbox`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum AreaLookupError {
    /// MapIt answered with a non-success status.
    #[error("area lookup at {url} failed with status {status}: {message}")]
    Http {
        /// Request URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Short description of the failure.
        message: String,
    },
    /// The request timed out.
    #[error("area lookup at {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Request URL.
        url: String,
        /// Timeout that elapsed.
        timeout_secs: u64,
    },
    /// The request failed below the HTTP layer.
    #[error("network error contacting {url}: {message}")]
    Network {
        /// Request URL.
        url: String,
        /// Description of the failure.
        message: String,
    },
    /// The body did not contain an area extent.
    #[error("unexpected area lookup response from {url}: {message}")]
    Parse {
        /// Request URL.
        url: String,
        /// Parser diagnostic.
        message: String,
    },
}

/// Resolves administrative areas to bounding boxes.
pub trait AreaLookup {
    /// Return the extent of `area_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AreaLookupError`] when the lookup fails.
    fn bbox(&self, area_id: u64, api_key: Option<&str>) -> Result<BoundingBox, AreaLookupError>;
}

/// Blocking MapIt client.
#[derive(Debug)]
pub struct MapitClient {
    http: BlockingClient,
    base_url: String,
    timeout: Duration,
}

impl MapitClient {
    /// Create a client for the MapIt instance at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderBuildError> {
        let timeout = Duration::from_secs(DEFAULT_TIMEOUT_SECS);
        Ok(Self {
            http: BlockingClient::new(crate::DEFAULT_USER_AGENT, timeout)?,
            base_url: base_url.into(),
            timeout,
        })
    }

    fn geometry_url(&self, area_id: u64) -> String {
        format!(
            "{}/area/{area_id}/geometry",
            self.base_url.trim_end_matches('/')
        )
    }

    async fn fetch(
        &self,
        url: &str,
        api_key: Option<&str>,
    ) -> Result<AreaGeometry, AreaLookupError> {
        let mut request = self.http.client.get(url);
        if let Some(key) = api_key {
            request = request.header("X-Api-Key", key);
        }
        let response = request
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, url))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(&err, url))?;
        response
            .json::<AreaGeometry>()
            .await
            .map_err(|err| AreaLookupError::Parse {
                url: url.to_owned(),
                message: err.to_string(),
            })
    }

    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &str) -> AreaLookupError {
        match classify(error) {
            FailureKind::Timeout => AreaLookupError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.timeout.as_secs(),
            },
            FailureKind::Status(status) => AreaLookupError::Http {
                url: url.to_owned(),
                status,
                message: error.to_string(),
            },
            FailureKind::Network => AreaLookupError::Network {
                url: url.to_owned(),
                message: error.to_string(),
            },
        }
    }
}

impl AreaLookup for MapitClient {
    fn bbox(&self, area_id: u64, api_key: Option<&str>) -> Result<BoundingBox, AreaLookupError> {
        let url = self.geometry_url(area_id);
        let geometry = self.http.block_on(self.fetch(&url, api_key))?;
        Ok(geometry.bounding_box())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://mapit.example", "https://mapit.example/area/2514/geometry")]
    #[case("https://mapit.example/", "https://mapit.example/area/2514/geometry")]
    fn geometry_url_joins_base(#[case] base: &str, #[case] expected: &str) {
        let client = MapitClient::new(base).expect("client should build");
        assert_eq!(client.geometry_url(2514), expected);
    }
}
