// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Library configuration: endpoint locations and timeouts.

use std::time::Duration;

/// Configuration for a [`SessionClient`](crate::SessionClient).
///
/// Endpoint paths default to the coopadmin API layout; override them when
/// pointing at a differently mounted back end.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the back end, without a trailing slash.
    pub base_url: String,
    pub login_path: String,
    pub refresh_path: String,
    pub logout_path: String,
    pub profile_path: String,
    /// Timeout applied to every ordinary request.
    pub request_timeout: Duration,
    /// Timeout for the renewal call itself. Expiry is treated exactly like
    /// a failed renewal.
    pub renew_timeout: Duration,
    /// Storage key under which the session blob is persisted.
    pub storage_key: String,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            login_path: "/api/v1/auth/login/".to_owned(),
            refresh_path: "/api/v1/auth/refresh/".to_owned(),
            logout_path: "/api/v1/auth/logout/".to_owned(),
            profile_path: "/api/v1/auth/profile/".to_owned(),
            request_timeout: Duration::from_secs(30),
            renew_timeout: Duration::from_secs(10),
            storage_key: "session".to_owned(),
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_renew_timeout(mut self, timeout: Duration) -> Self {
        self.renew_timeout = timeout;
        self
    }

    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Join the base URL with an absolute API path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
