// Lifecycle state polling
//
// Servers and storages change state asynchronously after most mutating
// calls (`started` -> `maintenance` -> `started`). `wait_for_state`
// re-fetches a resource at a fixed interval until it reaches a desired
// state or leaves an undesired one, bounded by a timeout. It only reads.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

use crate::error::Error;
use crate::models::{ServerDetails, ServerState, StorageDetails, StorageState};

/// Interval between polls when none is configured.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Shortest interval a wait will sleep between polls, whatever is configured.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

// ── Target ───────────────────────────────────────────────────────────

/// What a wait is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateTarget<S> {
    /// Succeed once the state equals this value.
    Reach(S),
    /// Succeed once the state differs from this value.
    Leave(S),
}

impl<S: PartialEq> StateTarget<S> {
    /// Build a target from a pair of optional desired/undesired states.
    ///
    /// Exactly one must be set.
    pub fn from_options(desired: Option<S>, undesired: Option<S>) -> Result<Self, Error> {
        match (desired, undesired) {
            (Some(state), None) => Ok(Self::Reach(state)),
            (None, Some(state)) => Ok(Self::Leave(state)),
            (None, None) => Err(Error::InvalidWaitRequest(
                "one of desired_state or undesired_state is required",
            )),
            (Some(_), Some(_)) => Err(Error::InvalidWaitRequest(
                "desired_state and undesired_state are mutually exclusive",
            )),
        }
    }

    pub fn is_satisfied_by(&self, current: &S) -> bool {
        match self {
            Self::Reach(state) => current == state,
            Self::Leave(state) => current != state,
        }
    }
}

impl<S: fmt::Display> fmt::Display for StateTarget<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reach(state) => write!(f, "reach state {state}"),
            Self::Leave(state) => write!(f, "leave state {state}"),
        }
    }
}

// ── Resources with a lifecycle ───────────────────────────────────────

/// A resource whose details carry a lifecycle state.
pub trait Lifecycle {
    type State: PartialEq + fmt::Display + Copy + Send + Sync;

    fn current_state(&self) -> Self::State;
}

impl Lifecycle for ServerDetails {
    type State = ServerState;

    fn current_state(&self) -> ServerState {
        self.state()
    }
}

impl Lifecycle for StorageDetails {
    type State = StorageState;

    fn current_state(&self) -> StorageState {
        self.state()
    }
}

// ── Clock ────────────────────────────────────────────────────────────

/// Time source and wait primitive used by the poller.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;

    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// The tokio timer. Honors `tokio::time::pause` in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }
}

// ── Policy ───────────────────────────────────────────────────────────

/// What a wait does when a single poll fails at the transport level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransportErrorPolicy {
    /// Return the first failure unchanged.
    #[default]
    Abort,
    /// Log transient failures (connect errors, timeouts, HTTP 5xx) and keep
    /// polling until the timeout. Other failures still abort.
    Retry,
}

/// Polling behavior shared by every wait a client performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    pub on_transport_error: TransportErrorPolicy,
}

impl PollConfig {
    /// The configured interval, raised to [`MIN_POLL_INTERVAL`].
    pub fn effective_interval(&self) -> Duration {
        self.interval.max(MIN_POLL_INTERVAL)
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            on_transport_error: TransportErrorPolicy::default(),
        }
    }
}

// ── Poll loop ────────────────────────────────────────────────────────

/// Poll `fetch` until its result satisfies `target` or `timeout` elapses.
///
/// The first fetch happens immediately. Returns the last fetched details on
/// success, [`Error::WaitTimeout`] once the elapsed time reaches `timeout`.
/// The final sleep is shortened so the last poll lands on the deadline.
pub async fn wait_for_state<R, F, Fut, C>(
    resource: &str,
    target: StateTarget<R::State>,
    timeout: Duration,
    config: &PollConfig,
    clock: &C,
    mut fetch: F,
) -> Result<R, Error>
where
    R: Lifecycle,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<R, Error>>,
    C: Clock,
{
    let started = clock.now();
    let mut last_state: Option<String> = None;
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;
        match fetch().await {
            Ok(current) => {
                let state = current.current_state();
                debug!(resource, attempt, %state, %target, "polled state");
                if target.is_satisfied_by(&state) {
                    return Ok(current);
                }
                last_state = Some(state.to_string());
            }
            Err(e)
                if config.on_transport_error == TransportErrorPolicy::Retry && e.is_transient() =>
            {
                warn!(resource, attempt, error = %e, "poll failed, retrying");
            }
            Err(e) => return Err(e),
        }

        let elapsed = clock.now().saturating_duration_since(started);
        if elapsed >= timeout {
            return Err(Error::WaitTimeout {
                resource: resource.to_owned(),
                target: target.to_string(),
                last_state,
                timeout_secs: timeout.as_secs(),
            });
        }
        clock
            .sleep(config.effective_interval().min(timeout - elapsed))
            .await;
    }
}
