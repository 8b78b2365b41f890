//! Failures raised by [`RequestClient`](super::RequestClient).

use reqwest::StatusCode;

/// A request that did not produce a JSON value.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// The exchange could not complete (DNS, connect, read).
    #[error("Failed to send request: {0}")]
    Transport(#[source] reqwest::Error),

    /// A response arrived with a status outside the success range.
    #[error("HTTP error! status: {status}")]
    HttpStatus { status: u16 },

    /// The success body was not valid JSON for the requested type.
    #[error("Failed to parse JSON response: {0}")]
    Parse(#[source] serde_json::Error),

    /// The request payload could not be serialized.
    #[error("Failed to serialize request body: {0}")]
    Serialize(#[source] serde_json::Error),

    /// A header name or value could not be encoded.
    #[error("Invalid header '{name}': {reason}")]
    InvalidHeader { name: String, reason: String },
}

impl RequestError {
    /// HTTP status carried by the failure, if a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            RequestError::HttpStatus { status } => Some(*status),
            _ => None,
        }
    }

    /// 4xx response.
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_some_and(|s| s.is_client_error())
    }

    /// 5xx response.
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_some_and(|s| s.is_server_error())
    }

    /// The server could not be reached or failed on its side.
    pub fn is_network_error(&self) -> bool {
        matches!(self, RequestError::Transport(_)) || self.is_server_error()
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED.as_u16())
    }

    pub fn is_forbidden(&self) -> bool {
        self.status() == Some(StatusCode::FORBIDDEN.as_u16())
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND.as_u16())
    }

    fn status_code(&self) -> Option<StatusCode> {
        self.status().and_then(|s| StatusCode::from_u16(s).ok())
    }
}
