//! Application-level failure for tracked operations that are not HTTP calls.

use super::ErrorCode;

/// A failure carrying an optional application code and HTTP-like status.
///
/// Return this (or wrap it with `anyhow` context) from a tracked operation to
/// control the `code` of the captured [`ErrorState`](super::ErrorState).
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct OperationError {
    pub message: String,
    pub code: Option<ErrorCode>,
    pub status: Option<u16>,
}

impl OperationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn with_code(mut self, code: impl Into<ErrorCode>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Explicit code first, status otherwise.
    pub fn effective_code(&self) -> Option<ErrorCode> {
        self.code
            .clone()
            .or_else(|| self.status.map(ErrorCode::from))
    }
}
