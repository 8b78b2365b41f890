//! HTTP client module: identity headers, JSON bodies, status mapping.

mod client;
mod error;
mod options;

pub use client::{RequestClient, USER_ID_HEADER, USER_NAME_HEADER, USER_ROLE_HEADER};
pub use error::RequestError;
pub use options::RequestOptions;
pub use reqwest::Method;
