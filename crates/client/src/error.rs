// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy for the session manager.
//!
//! Callers pattern-match on kind instead of parsing message strings:
//! `Unauthorized` is recoverable via renewal, `AuthExpired` is terminal for
//! the current session, `Network` never triggers a renewal attempt, and
//! `Validation` surfaces login-time rejection without automatic retry.

use std::fmt;

/// Errors surfaced to callers of the session manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The server rejected the credential. Normally resolved internally by
    /// the renewal coordinator; surfaces only when renewal is impossible.
    Unauthorized,
    /// Renewal itself failed — the session is over.
    AuthExpired,
    /// Transport-level failure, distinct from any auth condition.
    Network(String),
    /// Malformed or rejected credentials at login time.
    Validation(String),
}

impl ApiError {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::AuthExpired => "AUTH_EXPIRED",
            Self::Network(_) => "NETWORK",
            Self::Validation(_) => "VALIDATION",
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthorized => f.write_str("unauthorized"),
            Self::AuthExpired => f.write_str("session expired"),
            Self::Network(msg) => write!(f, "network error: {msg}"),
            Self::Validation(msg) => write!(f, "validation error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

/// Outcome of a renewal attempt, internal to the coordinator.
///
/// `Clone` so one resolution can be fanned out to every queued waiter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenewError {
    /// The refresh call was rejected, timed out, or no refresh credential
    /// exists. Terminal: the failure handler has already run.
    Expired(String),
}

impl fmt::Display for RenewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expired(msg) => write!(f, "renewal failed: {msg}"),
        }
    }
}

impl From<RenewError> for ApiError {
    fn from(_: RenewError) -> Self {
        ApiError::AuthExpired
    }
}

/// Persistence failure. Best-effort by design: logged, never fatal.
#[derive(Debug, Clone)]
pub struct StorageError(pub String);

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "storage error: {}", self.0)
    }
}

impl std::error::Error for StorageError {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
