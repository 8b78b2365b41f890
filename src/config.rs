//! Client configuration: base address and the identity sent with every request.

use std::env;

use log::debug;

/// Base address used when `PFMT_API_BASE_URL` is not set.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3004";

/// Environment variable overriding the base address.
pub const BASE_URL_ENV: &str = "PFMT_API_BASE_URL";

/// Identity attached to outgoing requests as `x-user-*` headers.
///
/// The defaults describe the development user the backend accepts in
/// non-production environments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub user_name: String,
    pub user_role: String,
}

impl Default for Identity {
    fn default() -> Self {
        Self {
            user_id: "550e8400-e29b-41d4-a716-446655440002".to_string(),
            user_name: "Development User".to_string(),
            user_role: "Project Manager".to_string(),
        }
    }
}

/// Immutable configuration for a [`RequestClient`](crate::http::RequestClient).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub identity: Identity,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl ClientConfig {
    /// Creates a configuration for the given base address with the default identity.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            identity: Identity::default(),
        }
    }

    /// Replaces the identity sent with every request.
    pub fn with_identity(mut self, identity: Identity) -> Self {
        self.identity = identity;
        self
    }

    /// Resolves the base address from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key))
    }

    /// Resolves the base address through `lookup`, falling back to
    /// [`DEFAULT_BASE_URL`] when the variable is missing or blank.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Result<String, env::VarError>,
    {
        let url = lookup(BASE_URL_ENV).ok();
        if let Some(url) = &url {
            debug!("{} is set to '{}'", BASE_URL_ENV, url);
        }
        Self::from_base_url(url.as_deref())
    }

    /// Uses `base_url` when it is not blank, [`DEFAULT_BASE_URL`] otherwise.
    pub fn from_base_url(base_url: Option<&str>) -> Self {
        match base_url.map(str::trim) {
            Some(url) if !url.is_empty() => Self::new(url),
            _ => Self::default(),
        }
    }
}
