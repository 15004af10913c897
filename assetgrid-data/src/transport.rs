//! SOAP-over-HTTP [`Transport`] for the asset-management service.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use assetgrid_core::{BoundingBox, ConfirmSearch, AssetSearch, Source};
//! use assetgrid_data::{HttpTransport, HttpTransportConfig};
//!
//! let config = HttpTransportConfig::default().with_timeout(Duration::from_secs(60));
//! let search = ConfirmSearch::new(HttpTransport::with_config(config)?);
//! let source = Source::new("https://confirm.example/soap", "svc", "secret", "LIVE");
//! let features = search.query_box(&source, BoundingBox::new(0, 0, 100, 100), &[])?;
//! println!("{} assets", features.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::{
    io::{BufRead, Cursor},
    time::Duration,
};

use assetgrid_core::{
    CONTENT_TYPE, RetryPolicy, SOAP_ACTION, Source, Transport, TransportError, build_envelope,
};
use log::debug;

use crate::http::{BlockingClient, FailureKind, ProviderBuildError, classify};

/// Default user agent for service requests.
pub const DEFAULT_USER_AGENT: &str = "assetgrid/0.1";

/// Default per-attempt timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for [`HttpTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpTransportConfig {
    /// Timeout applied to each attempt.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
    /// Attempts and delay used when a request fails.
    pub retry: RetryPolicy,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            retry: RetryPolicy::default(),
        }
    }
}

impl HttpTransportConfig {
    /// Set the per-attempt timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Replace the retry policy.
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// Posts SOAP envelopes with `reqwest` and retries failures.
///
/// Each call buffers the whole response body before returning it, so the
/// returned reader never touches the network.
#[derive(Debug)]
pub struct HttpTransport {
    http: BlockingClient,
    config: HttpTransportConfig,
}

impl HttpTransport {
    /// Create a transport with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn new() -> Result<Self, ProviderBuildError> {
        Self::with_config(HttpTransportConfig::default())
    }

    /// Create a transport with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn with_config(config: HttpTransportConfig) -> Result<Self, ProviderBuildError> {
        let http = BlockingClient::new(&config.user_agent, config.timeout)?;
        Ok(Self { http, config })
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &HttpTransportConfig {
        &self.config
    }

    async fn post(&self, url: &str, body: String) -> Result<Vec<u8>, TransportError> {
        let response = self
            .http
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, CONTENT_TYPE)
            .header("SOAPAction", SOAP_ACTION)
            .body(body)
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, url))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(&err, url))?;
        let bytes = response
            .bytes()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, url))?;
        Ok(bytes.to_vec())
    }

    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &str) -> TransportError {
        match classify(error) {
            FailureKind::Timeout => TransportError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.config.timeout.as_secs(),
            },
            FailureKind::Status(status) => TransportError::Http {
                url: url.to_owned(),
                status,
                message: error.to_string(),
            },
            FailureKind::Network => TransportError::Network {
                url: url.to_owned(),
                message: error.to_string(),
            },
        }
    }
}

impl Transport for HttpTransport {
    /// Send the operations, retrying according to the configured policy.
    ///
    /// # Runtime requirements
    ///
    /// When called from within an existing Tokio runtime, the runtime should
    /// be multi-threaded. Retry delays block the calling thread.
    fn send(
        &self,
        source: &Source,
        operations: &[String],
    ) -> Result<Box<dyn BufRead + Send>, TransportError> {
        let envelope = build_envelope(source, operations);
        let body = self.config.retry.run_blocking(|attempt| {
            debug!("POST {} (attempt {attempt})", source.url);
            self.http
                .block_on(self.post(&source.url, envelope.clone()))
        })?;
        Ok(Box::new(Cursor::new(body)))
    }
}
