//! Abstraction over the request client for call-sites.
//!
//! Call-sites depend on [`JsonApi`] rather than [`RequestClient`] so they can
//! be exercised against a mock.

use async_trait::async_trait;
use serde_json::Value;

use crate::http::{RequestClient, RequestError, RequestOptions};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JsonApi: Send + Sync {
    /// Sends one request to `endpoint` relative to the configured base address.
    async fn request(&self, endpoint: &str, options: RequestOptions) -> Result<Value, RequestError>;
}

#[async_trait]
impl JsonApi for RequestClient {
    async fn request(&self, endpoint: &str, options: RequestOptions) -> Result<Value, RequestError> {
        RequestClient::request(self, endpoint, options).await
    }
}
