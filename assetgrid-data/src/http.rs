//! Shared plumbing for the blocking HTTP clients.
//!
//! The core traits are synchronous, so each client owns a small Tokio runtime
//! and blocks on its async `reqwest` calls.

use std::{future::Future, io, time::Duration};

use reqwest::Client;
use thiserror::Error;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};

/// Failure to construct an HTTP-backed client.
#[derive(Debug, Error)]
pub enum ProviderBuildError {
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    /// Failed to build the Tokio runtime.
    #[error("failed to build Tokio runtime: {0}")]
    Runtime(#[source] io::Error),
}

/// A `reqwest` client with a dedicated runtime to drive it.
pub(crate) struct BlockingClient {
    pub(crate) client: Client,
    runtime: Runtime,
}

impl std::fmt::Debug for BlockingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockingClient")
            .field("client", &self.client)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish()
    }
}

impl BlockingClient {
    pub(crate) fn new(user_agent: &str, timeout: Duration) -> Result<Self, ProviderBuildError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(ProviderBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ProviderBuildError::Runtime)?;
        Ok(Self { client, runtime })
    }

    /// Drive `future` to completion from synchronous code.
    ///
    /// Inside a multi-threaded Tokio runtime the caller's runtime is used via
    /// [`tokio::task::block_in_place`]. Anywhere else, including a
    /// `current_thread` runtime, the client's own runtime is used; in the
    /// latter case the caller's runtime is blocked until the call returns.
    pub(crate) fn block_on<F: Future>(&self, future: F) -> F::Output {
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            _ => self.runtime.block_on(future),
        }
    }
}

/// How a `reqwest` failure should be reported.
pub(crate) enum FailureKind {
    Timeout,
    Status(u16),
    Network,
}

pub(crate) fn classify(error: &reqwest::Error) -> FailureKind {
    if error.is_timeout() {
        FailureKind::Timeout
    } else if let Some(status) = error.status() {
        FailureKind::Status(status.as_u16())
    } else {
        FailureKind::Network
    }
}
