//! Per-call request shaping.

use reqwest::Method;
use serde::Serialize;

use super::RequestError;

/// Method, header overrides and body for a single request.
///
/// Headers listed here override the client's identity defaults and the JSON
/// content type when they share a name. The body is only sent with POST and
/// PUT.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    /// Adds a header override.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets a pre-serialized body.
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serializes `data` as the JSON body.
    pub fn json<B: Serialize + ?Sized>(mut self, data: &B) -> Result<Self, RequestError> {
        let body = serde_json::to_string(data).map_err(RequestError::Serialize)?;
        self.body = Some(body);
        Ok(self)
    }
}
