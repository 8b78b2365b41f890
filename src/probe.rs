//! One-shot tracked request, as issued by the `pfmt-client` binary.

use anyhow::{Context, Result};
use log::debug;
use serde_json::Value;

use crate::api::JsonApi;
use crate::http::{Method, RequestOptions};
use crate::tracker::{AsyncOperationTracker, Outcome};

/// A single request to send through the tracker.
#[derive(Debug, Clone, PartialEq)]
pub struct Probe {
    pub method: Method,
    pub endpoint: String,
    pub headers: Vec<(String, String)>,
    pub data: Option<Value>,
}

impl Probe {
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            headers: Vec::new(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers = headers;
        self
    }

    /// Message captured when the request fails.
    fn failure_message(&self) -> String {
        format!("{} {} failed", self.method, self.endpoint)
    }
}

/// Parses a `name:value` header override.
pub fn parse_header(raw: &str) -> Result<(String, String)> {
    let (name, value) = raw
        .split_once(':')
        .with_context(|| format!("Invalid header '{}'. Expected 'name:value'.", raw))?;

    let name = name.trim();
    if name.is_empty() {
        anyhow::bail!("Invalid header '{}'. Header name is empty.", raw);
    }

    Ok((name.to_string(), value.trim().to_string()))
}

/// Sends `probe` through `api`, tracking it with `tracker`.
pub async fn execute(api: &dyn JsonApi, tracker: &AsyncOperationTracker, probe: &Probe) -> Outcome<Value> {
    debug!("Probing {} {}", probe.method, probe.endpoint);
    let message = probe.failure_message();

    tracker
        .run(
            move || async move {
                let mut options = RequestOptions::new(probe.method.clone());
                options.headers = probe.headers.clone();
                if let Some(data) = &probe.data {
                    options = options.json(data)?;
                }
                api.request(&probe.endpoint, options).await
            },
            Some(&message),
        )
        .await
}
