//! Named trackers for call-sites that drive several operation streams.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::AsyncOperationTracker;

/// Message shown for a stream that has not been given one.
pub const DEFAULT_LOADING_MESSAGE: &str = "Loading...";

#[derive(Debug)]
struct Stream {
    tracker: Arc<AsyncOperationTracker>,
    message: String,
}

impl Default for Stream {
    fn default() -> Self {
        Self {
            tracker: Arc::new(AsyncOperationTracker::new()),
            message: DEFAULT_LOADING_MESSAGE.to_string(),
        }
    }
}

/// A keyed collection of trackers, one per logical operation stream.
///
/// Giving each stream its own tracker keeps overlapping operations from
/// sharing a loading flag or error slot. Each stream also carries the message
/// a call-site shows while it loads.
#[derive(Debug, Default)]
pub struct TrackerSet {
    streams: Mutex<BTreeMap<String, Stream>>,
}

impl TrackerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the tracker for `key`, creating it on first use.
    pub fn tracker(&self, key: &str) -> Arc<AsyncOperationTracker> {
        self.lock().entry(key.to_string()).or_default().tracker.clone()
    }

    /// Sets the loading message for `key`, creating the stream if needed.
    pub fn set_loading_message(&self, key: &str, message: impl Into<String>) {
        self.lock().entry(key.to_string()).or_default().message = message.into();
    }

    /// Unknown keys report [`DEFAULT_LOADING_MESSAGE`].
    pub fn loading_message(&self, key: &str) -> String {
        self.lock()
            .get(key)
            .map_or_else(|| DEFAULT_LOADING_MESSAGE.to_string(), |s| s.message.clone())
    }

    /// Unknown keys are not loading.
    pub fn is_loading(&self, key: &str) -> bool {
        self.lock().get(key).is_some_and(|s| s.tracker.is_loading())
    }

    pub fn is_any_loading(&self) -> bool {
        self.lock().values().any(|s| s.tracker.is_loading())
    }

    pub fn keys(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    /// Forgets the stream for `key`. Holders of its tracker keep using it.
    pub fn remove(&self, key: &str) -> Option<Arc<AsyncOperationTracker>> {
        self.lock().remove(key).map(|s| s.tracker)
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, Stream>> {
        self.streams.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
