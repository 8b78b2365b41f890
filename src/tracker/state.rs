//! Observable tracker state and the outcome of a tracked operation.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

/// Message used when a failure carries no text of its own.
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// Application or HTTP code attached to a captured failure.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    Text(String),
    Number(i64),
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::Text(code) => write!(f, "{}", code),
            ErrorCode::Number(code) => write!(f, "{}", code),
        }
    }
}

impl From<&str> for ErrorCode {
    fn from(code: &str) -> Self {
        ErrorCode::Text(code.to_string())
    }
}

impl From<String> for ErrorCode {
    fn from(code: String) -> Self {
        ErrorCode::Text(code)
    }
}

impl From<u16> for ErrorCode {
    fn from(code: u16) -> Self {
        ErrorCode::Number(i64::from(code))
    }
}

impl From<i64> for ErrorCode {
    fn from(code: i64) -> Self {
        ErrorCode::Number(code)
    }
}

/// A captured failure. Replaced wholesale on every new failure.
#[derive(Debug, Clone)]
pub struct ErrorState {
    pub message: String,
    pub code: Option<ErrorCode>,
    /// The original failure, when one was captured.
    pub details: Option<Arc<anyhow::Error>>,
    pub timestamp: DateTime<Utc>,
}

impl ErrorState {
    /// Creates an error state stamped with the current time.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            details: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_code(mut self, code: impl Into<ErrorCode>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_details(mut self, details: anyhow::Error) -> Self {
        self.details = Some(Arc::new(details));
        self
    }

    /// Looks up a typed cause in the captured failure.
    pub fn downcast_details<E>(&self) -> Option<&E>
    where
        E: std::fmt::Display + std::fmt::Debug + Send + Sync + 'static,
    {
        self.details.as_deref().and_then(|e| e.downcast_ref::<E>())
    }
}

impl fmt::Display for ErrorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{} ({})", self.message, code),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ErrorState {}

/// Snapshot of a tracker's observable slots.
#[derive(Debug, Clone, Default)]
pub struct TrackerState {
    pub loading: bool,
    pub error: Option<ErrorState>,
    pub(super) generation: u64,
}

impl TrackerState {
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// Number of tracked operations started so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Result of a tracked operation. Failures are captured, never propagated.
#[derive(Debug, Clone)]
#[must_use]
pub enum Outcome<T> {
    Success(T),
    Failure(ErrorState),
}

impl<T> Outcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failure(_))
    }

    /// The value on success, discarding any failure.
    pub fn ok(self) -> Option<T> {
        match self {
            Outcome::Success(value) => Some(value),
            Outcome::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorState> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Failure(error) => Some(error),
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        match self {
            Outcome::Success(value) => Outcome::Success(f(value)),
            Outcome::Failure(error) => Outcome::Failure(error),
        }
    }

    pub fn into_result(self) -> Result<T, ErrorState> {
        match self {
            Outcome::Success(value) => Ok(value),
            Outcome::Failure(error) => Err(error),
        }
    }
}
