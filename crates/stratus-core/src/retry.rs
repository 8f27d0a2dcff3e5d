//! Eventual-consistency retry harness
//!
//! Cloud control planes routinely acknowledge a write before reads observe
//! it (a freshly created resource not yet indexed, an IAM role not yet
//! propagated, a policy not yet in effect). The harness re-runs an attempt
//! while it classifies its own error as retryable, up to a deadline, with
//! bounded jittered backoff.

use crate::error::ApiError;
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{Instant, sleep};

const MIN_BACKOFF: Duration = Duration::from_millis(500);
const MAX_BACKOFF: Duration = Duration::from_secs(5);

/// Classification an attempt assigns to its own failure
#[derive(Error, Debug)]
pub enum RetryError {
    /// Try again until the deadline
    #[error("retryable: {0}")]
    Retryable(ApiError),

    /// Give up immediately, regardless of remaining budget
    #[error(transparent)]
    NonRetryable(ApiError),
}

/// Terminal outcome of a retry loop
#[derive(Error, Debug)]
pub enum RetryFailure {
    #[error(transparent)]
    NonRetryable(ApiError),

    /// Deadline elapsed while the last attempt was still retryable;
    /// carries the last underlying error
    #[error("timed out, last error: {last}")]
    TimedOut { last: ApiError },
}

impl RetryFailure {
    /// The underlying transport error, either way
    pub fn into_inner(self) -> ApiError {
        match self {
            Self::NonRetryable(err) | Self::TimedOut { last: err } => err,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::TimedOut { .. })
    }
}

fn jittered(backoff: Duration) -> Duration {
    backoff.mul_f64(rand::thread_rng().gen_range(0.75..1.25))
}

/// Run `attempt` until it succeeds, fails non-retryably, or the deadline
/// elapses
///
/// The loop never retries a NonRetryable result even with budget remaining,
/// and never sleeps past the deadline; at most one attempt runs beyond it.
pub async fn retry<T, F, Fut>(timeout: Duration, mut attempt: F) -> Result<T, RetryFailure>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RetryError>>,
{
    let deadline = Instant::now() + timeout;
    let mut backoff = MIN_BACKOFF;
    loop {
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(RetryError::NonRetryable(err)) => return Err(RetryFailure::NonRetryable(err)),
            Err(RetryError::Retryable(err)) => {
                let now = Instant::now();
                if now >= deadline {
                    return Err(RetryFailure::TimedOut { last: err });
                }
                tracing::debug!(error = %err, "retryable error, backing off");
                let pause = jittered(backoff).min(deadline - now);
                sleep(pause).await;
                backoff = (backoff * 2).min(MAX_BACKOFF);
            }
        }
    }
}

/// Retry, then on timeout perform one final direct call
///
/// When the loop times out, the caller usually wants the remote's actual
/// answer to surface rather than the wait abstraction's. `final_call` runs
/// exactly once, unwrapped, and its result wins.
pub async fn retry_then_call<T, F, Fut, G, Gut>(
    timeout: Duration,
    attempt: F,
    final_call: G,
) -> Result<T, RetryFailure>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RetryError>>,
    G: FnOnce() -> Gut,
    Gut: Future<Output = Result<T, ApiError>>,
{
    match retry(timeout, attempt).await {
        Err(RetryFailure::TimedOut { .. }) => {
            final_call().await.map_err(RetryFailure::NonRetryable)
        }
        other => other,
    }
}
