// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The composed session client: the one entry point UI and CLI code use.
//!
//! `request` wraps authorization, dispatch, 401 interception, single-flight
//! renewal, and the exactly-once retry. Renewal failures surface as
//! `AuthExpired` after the failure handler has torn the session down.

use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::authorize::Authorizer;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::failure::FailureHandler;
use crate::identity::IdentityClient;
use crate::renew::RenewalCoordinator;
use crate::session::{SessionEvent, SessionMachine, SessionState};
use crate::storage::Storage;
use crate::store::CredentialStore;
use crate::token::{CredentialPair, Identity};
use crate::transport::{HttpTransport, RequestDescriptor, Response, Transport};

pub struct SessionClient {
    config: Arc<ClientConfig>,
    store: Arc<CredentialStore>,
    transport: Arc<dyn Transport>,
    authorizer: Authorizer,
    coordinator: RenewalCoordinator,
    session: Arc<SessionMachine>,
    identity: Arc<IdentityClient>,
    failure: Arc<FailureHandler>,
    shutdown: CancellationToken,
}

impl SessionClient {
    /// Wire up a client over an explicit transport and storage. The store
    /// starts empty; call [`resume`](Self::resume) to restore a persisted
    /// session.
    pub fn new(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        storage: Arc<dyn Storage>,
    ) -> Result<Self, ApiError> {
        let config = Arc::new(config);
        let store = Arc::new(CredentialStore::new(storage, config.storage_key.clone()));
        let session = Arc::new(SessionMachine::new());
        let failure = Arc::new(FailureHandler::new(Arc::clone(&store), Arc::clone(&session)));
        let identity = Arc::new(IdentityClient::new(Arc::clone(&config))?);
        let shutdown = CancellationToken::new();
        let coordinator = RenewalCoordinator::new(
            Arc::clone(&store),
            Arc::clone(&identity),
            Arc::clone(&failure),
            config.renew_timeout,
            shutdown.clone(),
        );
        let authorizer = Authorizer::new(Arc::clone(&store));

        Ok(Self {
            config,
            store,
            transport,
            authorizer,
            coordinator,
            session,
            identity,
            failure,
            shutdown,
        })
    }

    /// Convenience constructor over the reqwest transport.
    pub fn over_http(config: ClientConfig, storage: Arc<dyn Storage>) -> Result<Self, ApiError> {
        let transport = HttpTransport::new(&config.base_url, config.request_timeout)
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Self::new(config, Arc::new(transport), storage)
    }

    /// Dispatch an authorized request, transparently renewing the
    /// credential once on 401.
    pub async fn request(&self, descriptor: RequestDescriptor) -> Result<Response, ApiError> {
        let authorized = self.authorizer.authorize(descriptor.clone());
        let response = self
            .transport
            .send(authorized)
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if !response.is_unauthorized() {
            return Ok(response);
        }

        // A retried request that still gets 401 terminates here — never a
        // second renewal for the same request.
        if descriptor.retried {
            self.failure.on_auth_failure();
            return Err(ApiError::AuthExpired);
        }

        let fresh = self.coordinator.renew().await?;

        let retried = self.authorizer.authorize_with(descriptor.mark_retried(), &fresh);
        let response = self
            .transport
            .send(retried)
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if response.is_unauthorized() {
            self.failure.on_auth_failure();
            return Err(ApiError::AuthExpired);
        }
        Ok(response)
    }

    /// Sign in. On success the credential pair is stored, the identity
    /// record cached when the server includes it, and the session becomes
    /// `Authenticated`.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<Identity>, ApiError> {
        let (pair, user) = self.identity.login(username, password).await?;
        self.store.set(pair);
        if let Some(user) = user {
            self.store.set_identity(user);
        }
        self.session.transition(SessionState::Authenticated);
        Ok(self.store.identity())
    }

    /// Sign out. The server notification is best-effort; local state
    /// always ends `Unauthenticated`.
    pub async fn logout(&self) {
        if let Some(pair) = self.store.get() {
            self.identity.logout(&pair.access, self.config.request_timeout).await;
        }
        self.failure.on_logout();
    }

    /// Cold-start restore: load the persisted session and validate it with
    /// a lightweight identity check (renewed transparently if the access
    /// token has expired). A transient network failure keeps the persisted
    /// credentials and lands `Unauthenticated` so a later launch can try
    /// again; only authoritative rejection lands `Failed`.
    pub async fn resume(&self) -> SessionState {
        if !self.store.load() {
            return self.session.state();
        }
        self.session.transition(SessionState::Authenticating);

        let check = RequestDescriptor::get(self.config.profile_path.clone());
        match self.request(check).await {
            Ok(response) if response.is_success() => {
                match response.json::<Identity>() {
                    Ok(record) => self.store.set_identity(record),
                    Err(e) => warn!("profile response unparseable, keeping cached identity: {e}"),
                }
                self.session.transition(SessionState::Authenticated);
            }
            Ok(response) if response.status < 500 => {
                warn!(status = response.status, "identity check rejected");
                self.failure.on_auth_failure();
            }
            Ok(response) => {
                warn!(status = response.status, "identity check unavailable, staying signed out");
                self.session.transition(SessionState::Unauthenticated);
            }
            // Renewal already ran the failure handler.
            Err(ApiError::AuthExpired) => {}
            Err(ApiError::Unauthorized) | Err(ApiError::Validation(_)) => {
                self.failure.on_auth_failure();
            }
            Err(ApiError::Network(e)) => {
                warn!("identity check failed: {e}, keeping persisted credentials");
                self.session.transition(SessionState::Unauthenticated);
            }
        }
        self.session.state()
    }

    pub fn session_state(&self) -> SessionState {
        self.session.state()
    }

    /// Watch-channel subscription for route guards.
    pub fn subscribe_session(&self) -> watch::Receiver<SessionState> {
        self.session.subscribe()
    }

    /// Navigation signals (redirect-to-login on involuntary session end).
    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.session.subscribe_events()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.store.identity()
    }

    pub fn credentials(&self) -> Option<CredentialPair> {
        self.store.get()
    }

    /// Cancel background work (opportunistic identity refresh).
    pub fn dispose(&self) {
        self.shutdown.cancel();
    }
}

impl Drop for SessionClient {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
