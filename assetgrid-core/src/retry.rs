//! Fixed-delay retry policy shared by transports.

use std::time::Duration;

use log::warn;

use crate::TransportError;

/// Attempts made before a call is abandoned.
pub const DEFAULT_ATTEMPTS: u32 = 3;
/// Pause between consecutive attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// How many times to try a call and how long to wait between tries.
///
/// There is no backoff: the same delay separates every pair of attempts, and
/// no delay follows the final failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts; zero is treated as one.
    pub attempts: u32,
    /// Delay between attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Build a policy with explicit limits.
    #[must_use]
    pub const fn new(attempts: u32, delay: Duration) -> Self {
        Self { attempts, delay }
    }

    /// Run `call` until it succeeds or the attempts are used up.
    ///
    /// `call` receives the 1-based attempt number. `pause` is invoked with
    /// [`RetryPolicy::delay`] between failed attempts, which keeps the policy
    /// testable without real sleeping.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Exhausted`] wrapping the last failure.
    ///
    /// # Examples
    /// ```
    /// use std::time::Duration;
    /// use assetgrid_core::{RetryPolicy, TransportError};
    ///
    /// let policy = RetryPolicy::new(3, Duration::from_secs(5));
    /// let mut pauses = Vec::new();
    /// let outcome = policy.run(
    ///     |attempt| if attempt < 3 {
    ///         Err(TransportError::Network { url: "u".into(), message: "down".into() })
    ///     } else {
    ///         Ok(attempt)
    ///     },
    ///     |delay| pauses.push(delay),
    /// );
    /// assert_eq!(outcome, Ok(3));
    /// assert_eq!(pauses, vec![Duration::from_secs(5); 2]);
    /// ```
    pub fn run<T>(
        &self,
        mut call: impl FnMut(u32) -> Result<T, TransportError>,
        mut pause: impl FnMut(Duration),
    ) -> Result<T, TransportError> {
        let attempts = self.attempts.max(1);
        let mut attempt = 1;
        loop {
            match call(attempt) {
                Ok(value) => return Ok(value),
                Err(err) if attempt >= attempts => {
                    return Err(TransportError::Exhausted {
                        attempts,
                        last: Box::new(err),
                    });
                }
                Err(err) => {
                    warn!(
                        "attempt {attempt} of {attempts} failed: {err}; retrying in {:?}",
                        self.delay
                    );
                    pause(self.delay);
                    attempt += 1;
                }
            }
        }
    }

    /// [`RetryPolicy::run`] with a blocking [`std::thread::sleep`] between
    /// attempts.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Exhausted`] wrapping the last failure.
    pub fn run_blocking<T>(
        &self,
        call: impl FnMut(u32) -> Result<T, TransportError>,
    ) -> Result<T, TransportError> {
        self.run(call, std::thread::sleep)
    }
}
