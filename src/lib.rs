pub mod api;
pub mod config;
pub mod http;
pub mod probe;
pub mod tracker;

pub use api::JsonApi;
pub use config::{ClientConfig, Identity};
pub use http::{RequestClient, RequestError, RequestOptions};
pub use tracker::{AsyncOperationTracker, ErrorCode, ErrorState, OperationError, Outcome, TrackerSet};
