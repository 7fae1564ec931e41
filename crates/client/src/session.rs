// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Coarse-grained session status consumed by the UI layer to gate
//! protected views.
//!
//! The watch value is the only authentication signal route guards may
//! read: the mere presence of a stored token is never treated as
//! authenticated, since that token may be expired.

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, watch};
use tracing::debug;

/// Session status, coarse by design.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No credential, or explicitly signed out. Initial state on cold
    /// start before validation.
    Unauthenticated,
    /// Validation of a persisted credential is in flight.
    Authenticating,
    /// Last known-good state.
    Authenticated,
    /// Renewal exhausted or the identity check was rejected. Terminal for
    /// the current session; only an explicit login leaves this state.
    Failed,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::Authenticating => "authenticating",
            Self::Authenticated => "authenticated",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Signals emitted for the navigation collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The session ended involuntarily — redirect to the login surface.
    RedirectToLogin,
}

/// Holds the session state and fans out transitions.
pub struct SessionMachine {
    state_tx: watch::Sender<SessionState>,
    event_tx: broadcast::Sender<SessionEvent>,
}

impl SessionMachine {
    pub fn new() -> Self {
        let (state_tx, _) = watch::channel(SessionState::Unauthenticated);
        let (event_tx, _) = broadcast::channel(16);
        Self { state_tx, event_tx }
    }

    pub fn state(&self) -> SessionState {
        *self.state_tx.borrow()
    }

    /// Watch-channel subscription for route guards.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_tx.subscribe()
    }

    pub fn transition(&self, next: SessionState) {
        let prev = self.state();
        if prev == next {
            return;
        }
        debug!(%prev, %next, "session transition");
        self.state_tx.send_replace(next);
    }

    /// Emit the navigation signal. Send failure just means no router is
    /// listening (e.g. the CLI), which is fine.
    pub fn emit(&self, event: SessionEvent) {
        let _ = self.event_tx.send(event);
    }
}

impl Default for SessionMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
