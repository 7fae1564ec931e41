// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Client for the coopadmin identity endpoints: login, refresh, logout,
//! and the lightweight profile check.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{ApiError, RenewError};
use crate::token::{CredentialPair, Identity, Token};

/// Token payload from the login endpoint.
#[derive(Debug, Deserialize)]
struct LoginResponse {
    access: String,
    #[serde(default)]
    refresh: Option<String>,
    #[serde(default)]
    user: Option<Identity>,
}

/// Token payload from the refresh endpoint. A missing `refresh` means the
/// server did not rotate it.
#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access: String,
    #[serde(default)]
    refresh: Option<String>,
}

/// Error envelope used across the coopadmin API.
#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    non_field_errors: Vec<String>,
}

pub struct IdentityClient {
    http: reqwest::Client,
    config: Arc<ClientConfig>,
}

impl IdentityClient {
    pub fn new(config: Arc<ClientConfig>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ApiError::Network(format!("build http client: {e}")))?;
        Ok(Self { http, config })
    }

    /// Exchange username/password for a credential pair. A 4xx is a
    /// validation failure surfaced to the caller, never retried.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(CredentialPair, Option<Identity>), ApiError> {
        let resp = self
            .http
            .post(self.config.url(&self.config.login_path))
            .json(&serde_json::json!({ "username": username, "password": password }))
            .send()
            .await
            .map_err(|e| ApiError::Network(format!("login request failed: {e}")))?;

        let status = resp.status();
        let body = resp
            .bytes()
            .await
            .map_err(|e| ApiError::Network(format!("read login body: {e}")))?;

        if !status.is_success() {
            return Err(ApiError::Validation(error_detail(&body, status.as_u16())));
        }

        let login: LoginResponse = serde_json::from_slice(&body)
            .map_err(|_| ApiError::Validation("tokens missing from login response".into()))?;

        let pair =
            CredentialPair::new(Token::new(login.access), login.refresh.map(Token::new));
        Ok((pair, login.user))
    }

    /// Exchange the refresh credential for a new access token. The caller
    /// (the renewal coordinator) bounds this with its own timeout.
    pub async fn refresh(&self, refresh: &Token) -> Result<(Token, Option<Token>), RenewError> {
        let resp = self
            .http
            .post(self.config.url(&self.config.refresh_path))
            .json(&serde_json::json!({ "refresh": refresh.as_str() }))
            .send()
            .await
            .map_err(|e| RenewError::Expired(format!("refresh request failed: {e}")))?;

        let status = resp.status();
        let body = resp
            .bytes()
            .await
            .map_err(|e| RenewError::Expired(format!("read refresh body: {e}")))?;

        if !status.is_success() {
            return Err(RenewError::Expired(error_detail(&body, status.as_u16())));
        }

        let token: RefreshResponse = serde_json::from_slice(&body)
            .map_err(|e| RenewError::Expired(format!("parse refresh response: {e}")))?;

        debug!(rotated = token.refresh.is_some(), "credential renewed");
        Ok((Token::new(token.access), token.refresh.map(Token::new)))
    }

    /// Best-effort server-side logout. Failure never blocks local cleanup.
    pub async fn logout(&self, access: &Token, timeout: Duration) {
        let result = tokio::time::timeout(
            timeout,
            self.http
                .post(self.config.url(&self.config.logout_path))
                .bearer_auth(access.as_str())
                .send(),
        )
        .await;

        match result {
            Ok(Ok(resp)) if resp.status().is_success() => {}
            Ok(Ok(resp)) => {
                warn!(status = resp.status().as_u16(), "server logout rejected, continuing");
            }
            Ok(Err(e)) => warn!("server logout failed, continuing: {e}"),
            Err(_) => warn!("server logout timed out, continuing"),
        }
    }

    /// Lightweight identity check used on cold start and opportunistically
    /// after renewal.
    pub async fn profile(&self, access: &Token) -> Result<Identity, ApiError> {
        let resp = self
            .http
            .get(self.config.url(&self.config.profile_path))
            .bearer_auth(access.as_str())
            .send()
            .await
            .map_err(|e| ApiError::Network(format!("profile request failed: {e}")))?;

        let status = resp.status();
        let body = resp
            .bytes()
            .await
            .map_err(|e| ApiError::Network(format!("read profile body: {e}")))?;

        if status.as_u16() == 401 {
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            return Err(ApiError::Validation(error_detail(&body, status.as_u16())));
        }

        serde_json::from_slice(&body)
            .map_err(|e| ApiError::Validation(format!("parse profile: {e}")))
    }
}

/// Extract a human-readable detail from an API error body, falling back to
/// the HTTP status.
fn error_detail(body: &[u8], status: u16) -> String {
    if let Ok(err) = serde_json::from_slice::<ErrorDetail>(body) {
        if let Some(detail) = err.detail {
            return detail;
        }
        if let Some(message) = err.message {
            return message;
        }
        if let Some(first) = err.non_field_errors.into_iter().next() {
            return first;
        }
    }
    format!("HTTP {status}")
}

#[cfg(test)]
#[path = "identity_tests.rs"]
mod tests;
