//! Loading and error state for asynchronous operations.
//!
//! An [`AsyncOperationTracker`] wraps any fallible future and exposes whether
//! it is still running and how its latest failure looked, independent of what
//! the operation does. Failures are captured as an [`ErrorState`] and returned
//! as [`Outcome::Failure`]; they never propagate past [`run`].
//!
//! Each tracked run bumps a generation counter. When runs overlap on one
//! tracker, only the most recently started run writes its completion state, so
//! a slow stale run cannot clear the loading flag or error of a newer one.
//!
//! [`run`]: AsyncOperationTracker::run

mod error;
mod set;
mod state;

use std::fmt;
use std::future::Future;

use log::{debug, error};
use tokio::sync::watch;

pub use error::OperationError;
pub use set::{DEFAULT_LOADING_MESSAGE, TrackerSet};
pub use state::{ErrorCode, ErrorState, Outcome, TrackerState, UNEXPECTED_ERROR_MESSAGE};

use crate::http::RequestError;

/// Tracks the loading flag and latest failure of one logical operation stream.
pub struct AsyncOperationTracker {
    state: watch::Sender<TrackerState>,
}

impl Default for AsyncOperationTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AsyncOperationTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncOperationTracker")
            .field("state", &*self.state.borrow())
            .finish()
    }
}

impl AsyncOperationTracker {
    pub fn new() -> Self {
        let (state, _) = watch::channel(TrackerState::default());
        Self { state }
    }

    /// Runs `operation`, tracking its loading and error state.
    ///
    /// On failure the error is logged and captured with `error_message` (or the
    /// failure's own message) and returned as [`Outcome::Failure`]. The loading
    /// flag is cleared however the run ends, including when the returned future
    /// is dropped before completion.
    #[tracing::instrument(skip(self, operation))]
    pub async fn run<T, E, F, Fut>(&self, operation: F, error_message: Option<&str>) -> Outcome<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<anyhow::Error>,
    {
        let guard = self.begin();

        match operation().await {
            Ok(value) => {
                guard.settle(None);
                Outcome::Success(value)
            }
            Err(err) => {
                let err: anyhow::Error = err.into();
                error!("Operation failed: {:#}", err);

                let captured = normalize(err, error_message);
                guard.settle(Some(captured.clone()));
                Outcome::Failure(captured)
            }
        }
    }

    /// Re-attempts an operation after a failure.
    ///
    /// Behaves exactly like [`run`](Self::run): a single attempt, no backoff.
    pub async fn retry<T, E, F, Fut>(&self, operation: F, error_message: Option<&str>) -> Outcome<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<anyhow::Error>,
    {
        self.run(operation, error_message).await
    }

    /// Replaces the current error.
    pub fn set_error(
        &self,
        message: impl Into<String>,
        code: Option<ErrorCode>,
        details: Option<anyhow::Error>,
    ) {
        let mut captured = ErrorState::new(message);
        captured.code = code;
        if let Some(details) = details {
            captured = captured.with_details(details);
        }
        self.state.send_modify(|state| state.error = Some(captured));
    }

    pub fn clear_error(&self) {
        self.state.send_if_modified(|state| state.error.take().is_some());
    }

    /// Sets the loading flag. Starting to load clears the current error.
    pub fn set_loading(&self, loading: bool) {
        self.state.send_modify(|state| {
            state.loading = loading;
            if loading {
                state.error = None;
            }
        });
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn error(&self) -> Option<ErrorState> {
        self.state.borrow().error.clone()
    }

    pub fn has_error(&self) -> bool {
        self.state.borrow().has_error()
    }

    pub fn snapshot(&self) -> TrackerState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<TrackerState> {
        self.state.subscribe()
    }

    fn begin(&self) -> RunGuard<'_> {
        let mut generation = 0;
        self.state.send_modify(|state| {
            state.generation += 1;
            state.loading = true;
            state.error = None;
            generation = state.generation;
        });
        debug!("Tracked operation {} started", generation);

        RunGuard {
            tracker: self,
            generation,
            settled: false,
        }
    }

    fn settle(&self, generation: u64, error: Option<ErrorState>) {
        let applied = self.state.send_if_modified(|state| {
            if state.generation != generation {
                return false;
            }
            state.loading = false;
            if error.is_some() {
                state.error = error;
            }
            true
        });

        if !applied {
            debug!(
                "Tracked operation {} finished after a newer one started; state left unchanged",
                generation
            );
        }
    }
}

/// Clears the loading flag of its run when dropped without settling.
struct RunGuard<'a> {
    tracker: &'a AsyncOperationTracker,
    generation: u64,
    settled: bool,
}

impl RunGuard<'_> {
    fn settle(mut self, error: Option<ErrorState>) {
        self.settled = true;
        self.tracker.settle(self.generation, error);
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.tracker.settle(self.generation, None);
        }
    }
}

/// Converts a failure into an [`ErrorState`].
fn normalize(err: anyhow::Error, error_message: Option<&str>) -> ErrorState {
    let message = error_message
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .or_else(|| {
            let own = err.to_string();
            (!own.trim().is_empty()).then_some(own)
        })
        .unwrap_or_else(|| UNEXPECTED_ERROR_MESSAGE.to_string());

    let mut captured = ErrorState::new(message);
    captured.code = failure_code(&err);
    captured.with_details(err)
}

/// First code found along the cause chain.
fn failure_code(err: &anyhow::Error) -> Option<ErrorCode> {
    err.chain().find_map(|cause| {
        if let Some(op) = cause.downcast_ref::<OperationError>() {
            return op.effective_code();
        }
        cause
            .downcast_ref::<RequestError>()
            .and_then(RequestError::status)
            .map(ErrorCode::from)
    })
}
