//! State-change wait poller
//!
//! Polls a refresh function through a set of expected intermediate states
//! until the observed state enters the target set, the deadline elapses, or
//! an unexpected state appears. Used after mutating calls whose effect is
//! asynchronous on the remote side (server booting, association forming,
//! accelerator deployment).

use crate::error::{ApiError, is_throttled};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{Instant, sleep};

const MIN_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// The contract for one wait
#[derive(Debug, Clone)]
pub struct StateChange {
    /// States the object is allowed to pass through
    pub pending: Vec<String>,

    /// States that terminate the wait successfully
    pub target: Vec<String>,

    /// Overall deadline
    pub timeout: Duration,

    /// Time between polls (floored at 500 ms)
    pub poll_interval: Duration,

    /// Optional pause before the first poll
    pub delay: Duration,

    /// Number of consecutive target observations required
    pub continuous_target_occurrences: u32,
}

impl StateChange {
    pub fn new(
        pending: &[&str],
        target: &[&str],
        timeout: Duration,
    ) -> Self {
        Self {
            pending: pending.iter().map(|s| s.to_string()).collect(),
            target: target.iter().map(|s| s.to_string()).collect(),
            timeout,
            poll_interval: Duration::from_secs(10),
            delay: Duration::ZERO,
            continuous_target_occurrences: 1,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(MIN_POLL_INTERVAL);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_continuous_target_occurrences(mut self, count: u32) -> Self {
        self.continuous_target_occurrences = count.max(1);
        self
    }
}

/// Why a wait ended without reaching its target
#[derive(Error, Debug)]
pub enum WaitError {
    #[error("timed out waiting for target state (last observed: {last_state:?})")]
    TimedOut { last_state: Option<String> },

    #[error("unexpected state {state:?}, wanted one of {expected:?}")]
    UnexpectedState {
        state: String,
        expected: Vec<String>,
    },

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl WaitError {
    /// Attach resource/operation context for surfacing to the user
    pub fn for_resource(
        self,
        resource: &str,
        id: &str,
        operation: stratus_schema::Operation,
    ) -> crate::error::ProviderError {
        use crate::error::ProviderError;
        match self {
            WaitError::TimedOut { last_state } => ProviderError::TimedOut {
                resource: resource.to_string(),
                id: id.to_string(),
                operation,
                cause: match last_state {
                    Some(state) => format!("last observed state: {state:?}"),
                    None => "no state observed".to_string(),
                },
            },
            WaitError::UnexpectedState { state, .. } => ProviderError::UnexpectedState {
                resource: resource.to_string(),
                id: id.to_string(),
                operation,
                state,
            },
            WaitError::Api(err) => ProviderError::api(resource, id, operation, err),
        }
    }
}

/// Poll `refresh` until the observed state satisfies the contract
///
/// `refresh` returns the object and its current state, or `None` when the
/// remote reports the object gone (observed as the empty state). A gone
/// object outside the target set is treated like a pending observation —
/// fresh writes are often invisible for a few polls — but it resets the
/// consecutive-target streak, as do tolerated throttle errors. Any other
/// transport error surfaces immediately.
pub async fn wait_for_state<T, F, Fut>(
    conf: &StateChange,
    mut refresh: F,
) -> Result<Option<T>, WaitError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<(T, String)>, ApiError>>,
{
    if !conf.delay.is_zero() {
        sleep(conf.delay).await;
    }

    let deadline = Instant::now() + conf.timeout;
    let interval = conf.poll_interval.max(MIN_POLL_INTERVAL);
    let mut streak = 0u32;
    let mut last_state: Option<String> = None;

    loop {
        match refresh().await {
            Err(err) if is_throttled(&err) => {
                tracing::debug!(error = %err, "throttled while polling, continuing");
                streak = 0;
            }
            Err(err) => return Err(WaitError::Api(err)),
            Ok(observed) => {
                let (object, state) = match observed {
                    Some((object, state)) => (Some(object), state),
                    None => (None, String::new()),
                };
                last_state = Some(state.clone());

                if conf.target.contains(&state) {
                    streak += 1;
                    if streak >= conf.continuous_target_occurrences {
                        return Ok(object);
                    }
                } else if state.is_empty() || conf.pending.contains(&state) {
                    streak = 0;
                } else {
                    let mut expected = conf.pending.clone();
                    expected.extend(conf.target.iter().cloned());
                    return Err(WaitError::UnexpectedState { state, expected });
                }
            }
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(WaitError::TimedOut { last_state });
        }
        sleep(interval.min(deadline - now)).await;
    }
}

/// Poll a finder-style refresh until the object disappears
pub async fn wait_for_deletion<T, F, Fut>(
    pending: &[&str],
    timeout: Duration,
    poll_interval: Duration,
    refresh: F,
) -> Result<(), WaitError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<(T, String)>, ApiError>>,
{
    let conf = StateChange::new(pending, &[""], timeout).with_poll_interval(poll_interval);
    wait_for_state(&conf, refresh).await.map(|_| ())
}
