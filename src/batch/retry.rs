//! Bounded retry of a single identifier's resolution.
//!
//! A failed attempt is classified into a [`FailureType`]:
//! - [`FailureType::Transient`] - connection reset/aborted, malformed or
//!   truncated response; retried with exponential backoff
//! - [`FailureType::Permanent`] - everything else; the identifier fails on
//!   the first occurrence
//!
//! A strategy miss or unsupported platform is not a failed attempt; it is a
//! terminal [`Outcome::Unresolved`] and is never retried.
//!
//! # Example
//!
//! ```
//! use reprint_core::batch::{FailureType, RetryDecision, RetryPolicy};
//!
//! let policy = RetryPolicy::with_max_attempts(3);
//! match policy.should_retry(FailureType::Transient, 1) {
//!     RetryDecision::Retry { delay, attempt } => {
//!         println!("Retrying in {:?} (attempt {})", delay, attempt);
//!     }
//!     RetryDecision::DoNotRetry { reason } => {
//!         println!("Not retrying: {}", reason);
//!     }
//! }
//! ```

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, instrument, warn};

use crate::Identifier;
use crate::resolver::{Outcome, ResolveError, UnresolvedReason};

/// Default maximum attempts, including the first.
pub const DEFAULT_MAX_TRIES: u32 = 3;

/// Default base delay before the first retry.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Default maximum delay cap (32 seconds).
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(32);

/// Default backoff multiplier (doubles each attempt).
const DEFAULT_BACKOFF_MULTIPLIER: f32 = 2.0;

/// Maximum jitter added to delays (500ms).
const MAX_JITTER: Duration = Duration::from_millis(500);

/// Classification of a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureType {
    /// Sporadic network fault that may clear on retry.
    Transient,
    /// Fault that another attempt will not fix.
    Permanent,
}

/// Decision on whether to retry a failed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry after the specified delay.
    Retry {
        /// How long to wait before retrying.
        delay: Duration,
        /// Which attempt number this will be (first retry is attempt 2).
        attempt: u32,
    },

    /// Do not retry.
    DoNotRetry {
        /// Human-readable reason why retry is not attempted.
        reason: String,
    },
}

/// Retry behavior with exponential backoff.
///
/// ```text
/// delay = min(base_delay * multiplier^(attempt-1), max_delay) + jitter
/// ```
///
/// A zero `base_delay` disables waiting entirely, jitter included.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the initial attempt).
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
    backoff_multiplier: f32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_TRIES,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
        }
    }
}

impl RetryPolicy {
    /// Creates a retry policy with custom settings. `max_attempts` of 0 is clamped to 1.
    #[must_use]
    pub fn new(
        max_attempts: u32,
        base_delay: Duration,
        max_delay: Duration,
        backoff_multiplier: f32,
    ) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
            backoff_multiplier,
        }
    }

    /// Creates a policy with a custom `max_attempts`, using defaults for other settings.
    #[must_use]
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// Creates a policy that retries immediately.
    #[must_use]
    pub fn without_delay(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay: Duration::ZERO,
            ..Self::default()
        }
    }

    /// Returns a copy with a different base delay.
    #[must_use]
    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Returns the maximum number of attempts configured.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the base delay.
    #[must_use]
    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Determines whether to retry after `attempt` (1-indexed) failed.
    #[instrument(level = "debug", skip(self), fields(max_attempts = self.max_attempts))]
    pub fn should_retry(&self, failure_type: FailureType, attempt: u32) -> RetryDecision {
        if failure_type == FailureType::Permanent {
            return RetryDecision::DoNotRetry {
                reason: "permanent failure - retry would not help".to_string(),
            };
        }

        if attempt >= self.max_attempts {
            debug!(attempt, max = self.max_attempts, "max attempts reached");
            return RetryDecision::DoNotRetry {
                reason: format!("max attempts ({}) exhausted", self.max_attempts),
            };
        }

        let delay = self.calculate_delay(attempt);
        debug!(
            attempt,
            next_attempt = attempt + 1,
            delay_ms = delay.as_millis(),
            "will retry"
        );

        RetryDecision::Retry {
            delay,
            attempt: attempt + 1,
        }
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn calculate_delay(&self, attempt: u32) -> Duration {
        if self.base_delay.is_zero() {
            return Duration::ZERO;
        }
        let base_ms = self.base_delay.as_millis() as f64;
        let multiplier = f64::from(self.backoff_multiplier);
        let exponent = f64::from(attempt.saturating_sub(1));
        let delay_ms = (base_ms * multiplier.powf(exponent)).min(self.max_delay.as_millis() as f64);

        Duration::from_millis(delay_ms as u64) + calculate_jitter()
    }
}

#[allow(clippy::cast_possible_truncation)]
fn calculate_jitter() -> Duration {
    let mut rng = rand::thread_rng();
    Duration::from_millis(rng.gen_range(0..=MAX_JITTER.as_millis() as u64))
}

/// Classifies a resolution error for retry decisions.
#[must_use]
pub fn classify_error(error: &ResolveError) -> FailureType {
    if error.is_transient() {
        FailureType::Transient
    } else {
        FailureType::Permanent
    }
}

/// Terminal result of the retry loop for one identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryReport {
    /// Final outcome; exhausted or fatal errors become `Unresolved(FetchFailed)`.
    pub outcome: Outcome,
    /// Number of resolution attempts made.
    pub attempts: u32,
}

impl RetryReport {
    /// Returns true if more than one attempt was made.
    #[must_use]
    pub fn retried(&self) -> bool {
        self.attempts > 1
    }
}

/// Runs `resolve` until it yields an outcome, a permanent error, or the
/// policy's attempts are exhausted.
#[instrument(level = "debug", skip_all, fields(id = %identifier.id()))]
pub async fn with_retry<F, Fut>(
    identifier: &Identifier,
    policy: &RetryPolicy,
    mut resolve: F,
) -> RetryReport
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Outcome, ResolveError>>,
{
    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        let error = match resolve().await {
            Ok(outcome) => {
                return RetryReport {
                    outcome,
                    attempts: attempt,
                };
            }
            Err(error) => error,
        };

        match policy.should_retry(classify_error(&error), attempt) {
            RetryDecision::Retry { delay, attempt: next } => {
                warn!(
                    error = %error,
                    attempt,
                    next_attempt = next,
                    delay_ms = delay.as_millis(),
                    "transient failure, retrying"
                );
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
            RetryDecision::DoNotRetry { reason } => {
                debug!(error = %error, attempt, %reason, "giving up");
                return RetryReport {
                    outcome: Outcome::Unresolved(UnresolvedReason::FetchFailed {
                        error: error.to_string(),
                        attempts: attempt,
                    }),
                    attempts: attempt,
                };
            }
        }
    }
}
