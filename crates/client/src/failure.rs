// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Failure/logout handler: the single place local session teardown
//! happens.
//!
//! The store is mutated only here and in the coordinator's success path —
//! request code never touches it directly.

use std::sync::Arc;

use tracing::{info, warn};

use crate::session::{SessionEvent, SessionMachine, SessionState};
use crate::store::CredentialStore;

pub struct FailureHandler {
    store: Arc<CredentialStore>,
    session: Arc<SessionMachine>,
}

impl FailureHandler {
    pub fn new(store: Arc<CredentialStore>, session: Arc<SessionMachine>) -> Self {
        Self { store, session }
    }

    /// Renewal is impossible or was rejected: wipe credentials, mark the
    /// session failed, and signal the router to redirect to login.
    pub fn on_auth_failure(&self) {
        warn!("session expired and renewal failed, clearing credentials");
        self.store.clear();
        self.session.transition(SessionState::Failed);
        self.session.emit(SessionEvent::RedirectToLogin);
    }

    /// User-initiated logout. The server notification (if any) has already
    /// been attempted by the caller; local state always ends clean.
    pub fn on_logout(&self) {
        info!("signed out, clearing local session");
        self.store.clear();
        self.session.transition(SessionState::Unauthenticated);
    }
}

#[cfg(test)]
#[path = "failure_tests.rs"]
mod tests;
