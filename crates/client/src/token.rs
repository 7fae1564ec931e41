// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Credential and identity data model.
//!
//! Tokens are opaque strings issued by the coopadmin identity endpoint.
//! The client never parses or validates their internal structure.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// An opaque bearer token. Never inspected beyond equality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Token {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for Token {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// The live credential pair for a session.
///
/// Writing a new pair fully replaces the old one. When the server does not
/// rotate the refresh token, the previous one is carried forward at
/// construction time via [`CredentialPair::rotated`] — there are no partial
/// in-place updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPair {
    pub access: Token,
    pub refresh: Option<Token>,
    /// Milliseconds since the Unix epoch at issue time.
    pub issued_at_ms: u64,
}

impl CredentialPair {
    pub fn new(access: Token, refresh: Option<Token>) -> Self {
        Self { access, refresh, issued_at_ms: now_ms() }
    }

    /// Build the replacement pair after a renewal. A server that omits the
    /// refresh token did not rotate it, so the previous one stays valid.
    pub fn rotated(&self, access: Token, refresh: Option<Token>) -> Self {
        Self {
            access,
            refresh: refresh.or_else(|| self.refresh.clone()),
            issued_at_ms: now_ms(),
        }
    }
}

/// Cached profile data for the signed-in user.
///
/// A convenience cache only — the server remains the source of truth and
/// this record is never used for authorization decisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

pub(crate) fn now_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis() as u64
}

#[cfg(test)]
#[path = "token_tests.rs"]
mod tests;
