//! The request/response boundary with the asset-management service.

use std::io::BufRead;

use thiserror::Error;

use crate::Source;

/// Errors from [`Transport::send`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum TransportError {
    /// The service answered with a non-success status.
    #[error("request to {url} failed with status {status}: {message}")]
    Http {
        /// Request URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Short description of the failure.
        message: String,
    },
    /// The request did not complete within the configured timeout.
    #[error("request to {url} timed out after {timeout_secs}s")]
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
    /// Every attempt allowed by the retry policy failed.
    #[error("gave up after {attempts} attempt(s): {last}")]
    Exhausted {
        /// Number of attempts made.
        attempts: u32,
        /// Failure of the final attempt.
        last: Box<TransportError>,
    },
}

/// Sends operation fragments to a service and returns the raw response body.
///
/// Implementations wrap the fragments in the service's request envelope
/// (see [`crate::build_envelope`]), perform the call, and retry failures
/// according to their retry policy. The body is returned unparsed.
pub trait Transport {
    /// Send one logical call made of `operations`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] once the call has failed for good.
    fn send(
        &self,
        source: &Source,
        operations: &[String],
    ) -> Result<Box<dyn BufRead + Send>, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(
        &self,
        source: &Source,
        operations: &[String],
    ) -> Result<Box<dyn BufRead + Send>, TransportError> {
        (**self).send(source, operations)
    }
}
