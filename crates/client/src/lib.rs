// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Client-side session manager for the coopadmin back end.
//!
//! Attaches bearer credentials to outgoing requests, detects credential
//! expiry (HTTP 401), renews the credential pair exactly once even under
//! concurrent in-flight requests, replays the affected requests, and falls
//! back to a clean logout when renewal fails.

pub mod authorize;
pub mod client;
pub mod config;
pub mod error;
pub mod failure;
pub mod identity;
pub mod renew;
pub mod session;
pub mod storage;
pub mod store;
pub mod token;
pub mod transport;

pub use client::SessionClient;
pub use config::ClientConfig;
pub use error::ApiError;
pub use session::{SessionEvent, SessionState};
pub use token::{CredentialPair, Identity, Token};
pub use transport::{Method, RequestDescriptor, Response};
