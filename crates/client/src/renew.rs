// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Renewal coordinator: single-flight credential renewal.
//!
//! The first request to observe a 401 becomes the leader, creates the
//! renewal ticket, and performs the refresh call. Every request that
//! observes a 401 while the ticket is live parks on the ticket's queue
//! instead of starting a second renewal, and is released in FIFO order
//! once the ticket resolves. The check-and-create of the ticket is one
//! synchronous critical section — the lock is never held across an await
//! point — so no two renewal calls can ever be in flight for the same
//! credential store.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::RenewError;
use crate::failure::FailureHandler;
use crate::identity::IdentityClient;
use crate::store::CredentialStore;
use crate::token::Token;

/// Result of a renewal, fanned out to every parked waiter.
pub type RenewOutcome = Result<Token, RenewError>;

/// Marker that a renewal is in flight, plus the queue of parked requests.
/// At most one exists per coordinator; destroyed immediately on resolution.
struct RenewalTicket {
    waiters: Vec<oneshot::Sender<RenewOutcome>>,
}

pub struct RenewalCoordinator {
    store: Arc<CredentialStore>,
    identity: Arc<IdentityClient>,
    failure: Arc<FailureHandler>,
    timeout: Duration,
    shutdown: CancellationToken,
    ticket: Mutex<Option<RenewalTicket>>,
}

impl RenewalCoordinator {
    pub fn new(
        store: Arc<CredentialStore>,
        identity: Arc<IdentityClient>,
        failure: Arc<FailureHandler>,
        timeout: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            store,
            identity,
            failure,
            timeout,
            shutdown,
            ticket: Mutex::new(None),
        }
    }

    /// Obtain a fresh access token, either by leading a renewal or by
    /// joining one already in flight.
    pub async fn renew(&self) -> RenewOutcome {
        let parked = {
            let mut ticket = self.ticket.lock();
            match ticket.as_mut() {
                Some(live) => {
                    let (tx, rx) = oneshot::channel();
                    live.waiters.push(tx);
                    debug!(queued = live.waiters.len(), "renewal in flight, parking request");
                    Some(rx)
                }
                None => {
                    *ticket = Some(RenewalTicket { waiters: Vec::new() });
                    None
                }
            }
        };

        if let Some(rx) = parked {
            return match rx.await {
                Ok(outcome) => outcome,
                // The leader was dropped before resolving the ticket.
                Err(_) => Err(RenewError::Expired("renewal abandoned".into())),
            };
        }

        let mut guard = LeaderGuard { coordinator: self, resolved: false };
        let outcome = self.lead().await;
        guard.resolve(outcome.clone());
        outcome
    }

    /// Perform the renewal network call as the ticket leader.
    async fn lead(&self) -> RenewOutcome {
        let Some(pair) = self.store.get() else {
            warn!("no credentials to renew");
            self.failure.on_auth_failure();
            return Err(RenewError::Expired("no credentials".into()));
        };
        let Some(ref refresh) = pair.refresh else {
            warn!("no refresh credential, cannot renew");
            self.failure.on_auth_failure();
            return Err(RenewError::Expired("no refresh credential".into()));
        };

        match tokio::time::timeout(self.timeout, self.identity.refresh(refresh)).await {
            Ok(Ok((access, rotated))) => {
                self.store.set(pair.rotated(access.clone(), rotated));
                info!("credential pair renewed");
                self.spawn_identity_refresh(access.clone());
                Ok(access)
            }
            Ok(Err(e)) => {
                warn!("renewal rejected: {e}");
                self.failure.on_auth_failure();
                Err(e)
            }
            Err(_) => {
                warn!(timeout_secs = self.timeout.as_secs(), "renewal timed out");
                self.failure.on_auth_failure();
                Err(RenewError::Expired("renewal timed out".into()))
            }
        }
    }

    /// Opportunistically re-fetch the identity record after a renewal.
    /// Never blocks renewal success; failure only logs.
    fn spawn_identity_refresh(&self, access: Token) {
        let identity = Arc::clone(&self.identity);
        let store = Arc::clone(&self.store);
        let shutdown = self.shutdown.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = shutdown.cancelled() => {}
                result = identity.profile(&access) => match result {
                    Ok(record) => store.set_identity(record),
                    Err(e) => debug!("identity refresh after renewal failed: {e}"),
                },
            }
        });
    }

    /// Resolve the live ticket: destroy it and release the parked waiters
    /// in FIFO order. Waiters whose callers have gone away fail the send;
    /// that is ignored and does not disturb the rest of the queue.
    fn resolve(&self, outcome: RenewOutcome) {
        let waiters = self
            .ticket
            .lock()
            .take()
            .map(|ticket| ticket.waiters)
            .unwrap_or_default();
        if !waiters.is_empty() {
            debug!(released = waiters.len(), ok = outcome.is_ok(), "releasing parked requests");
        }
        for waiter in waiters {
            let _ = waiter.send(outcome.clone());
        }
    }
}

/// Ensures the ticket is resolved even when the leader future is dropped
/// mid-renewal (caller cancelled): parked waiters must never hang.
struct LeaderGuard<'a> {
    coordinator: &'a RenewalCoordinator,
    resolved: bool,
}

impl LeaderGuard<'_> {
    fn resolve(&mut self, outcome: RenewOutcome) {
        self.resolved = true;
        self.coordinator.resolve(outcome);
    }
}

impl Drop for LeaderGuard<'_> {
    fn drop(&mut self) {
        if !self.resolved {
            self.coordinator.resolve(Err(RenewError::Expired("renewal abandoned".into())));
        }
    }
}

#[cfg(test)]
#[path = "renew_tests.rs"]
mod tests;
