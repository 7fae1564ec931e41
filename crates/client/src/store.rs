// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Credential store: the single mutable shared resource of the session.
//!
//! One explicitly constructed instance per session, injected into the
//! authorizer and the renewal coordinator — never ambient global state.
//! Readers always see either the previous complete pair or the new
//! complete pair, never a mix. Every mutation persists to the storage
//! collaborator so the session survives a process restart; persistence
//! failures are logged, not fatal.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::storage::Storage;
use crate::token::{CredentialPair, Identity};

/// Serialized session blob written to the storage collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedSession {
    #[serde(flatten)]
    credentials: CredentialPair,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    identity: Option<Identity>,
}

/// Holds the current credential pair and cached identity record.
pub struct CredentialStore {
    credentials: RwLock<Option<CredentialPair>>,
    identity: RwLock<Option<Identity>>,
    storage: Arc<dyn Storage>,
    storage_key: String,
}

impl CredentialStore {
    pub fn new(storage: Arc<dyn Storage>, storage_key: impl Into<String>) -> Self {
        Self {
            credentials: RwLock::new(None),
            identity: RwLock::new(None),
            storage,
            storage_key: storage_key.into(),
        }
    }

    /// Current credential pair, cloned whole. Never torn: the pair is
    /// replaced atomically under the write lock.
    pub fn get(&self) -> Option<CredentialPair> {
        self.credentials.read().clone()
    }

    /// Atomically replace the credential pair, then persist.
    pub fn set(&self, pair: CredentialPair) {
        *self.credentials.write() = Some(pair);
        self.persist();
    }

    /// Atomically wipe credentials and identity, then delete the blob.
    pub fn clear(&self) {
        *self.credentials.write() = None;
        *self.identity.write() = None;
        if let Err(e) = self.storage.delete(&self.storage_key) {
            warn!(key = %self.storage_key, "failed to delete persisted session: {e}");
        }
    }

    pub fn identity(&self) -> Option<Identity> {
        self.identity.read().clone()
    }

    /// Cache the identity record and persist it alongside the credentials.
    pub fn set_identity(&self, identity: Identity) {
        *self.identity.write() = Some(identity);
        self.persist();
    }

    /// Restore a persisted session from storage, if any. Unparseable blobs
    /// are discarded with a warning. Returns whether credentials were
    /// restored.
    pub fn load(&self) -> bool {
        let blob = match self.storage.read(&self.storage_key) {
            Ok(Some(blob)) => blob,
            Ok(None) => return false,
            Err(e) => {
                warn!(key = %self.storage_key, "failed to read persisted session: {e}");
                return false;
            }
        };

        let session: PersistedSession = match serde_json::from_str(&blob) {
            Ok(s) => s,
            Err(e) => {
                warn!(key = %self.storage_key, "discarding unparseable session blob: {e}");
                if let Err(e) = self.storage.delete(&self.storage_key) {
                    warn!(key = %self.storage_key, "failed to delete bad blob: {e}");
                }
                return false;
            }
        };

        debug!(key = %self.storage_key, "restored persisted session");
        *self.credentials.write() = Some(session.credentials);
        *self.identity.write() = session.identity;
        true
    }

    fn persist(&self) {
        let session = {
            let credentials = self.credentials.read();
            let Some(pair) = credentials.as_ref() else {
                return;
            };
            PersistedSession {
                credentials: pair.clone(),
                identity: self.identity.read().clone(),
            }
        };

        let blob = match serde_json::to_string(&session) {
            Ok(b) => b,
            Err(e) => {
                warn!("failed to serialize session: {e}");
                return;
            }
        };

        if let Err(e) = self.storage.write(&self.storage_key, &blob) {
            warn!(key = %self.storage_key, "failed to persist session: {e}");
        }
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
