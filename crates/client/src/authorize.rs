// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request authorizer: decorates an outbound descriptor with the current
//! access credential.
//!
//! Absence of a credential is not a failure here — the descriptor passes
//! through unchanged and the server's 401 is handled downstream.

use std::sync::Arc;

use crate::store::CredentialStore;
use crate::token::Token;
use crate::transport::RequestDescriptor;

pub const AUTHORIZATION: &str = "Authorization";

pub struct Authorizer {
    store: Arc<CredentialStore>,
}

impl Authorizer {
    pub fn new(store: Arc<CredentialStore>) -> Self {
        Self { store }
    }

    /// Inject `Authorization: Bearer <access>` from the store's current
    /// pair, if one is present.
    pub fn authorize(&self, request: RequestDescriptor) -> RequestDescriptor {
        match self.store.get() {
            Some(pair) => stamp(request, &pair.access),
            None => request,
        }
    }

    /// Stamp a specific token — used when redispatching after a renewal so
    /// the retried request cannot race a later store mutation and pick up
    /// a stale token.
    pub fn authorize_with(&self, request: RequestDescriptor, token: &Token) -> RequestDescriptor {
        stamp(request, token)
    }
}

fn stamp(mut request: RequestDescriptor, token: &Token) -> RequestDescriptor {
    request.headers.retain(|(name, _)| !name.eq_ignore_ascii_case(AUTHORIZATION));
    request.headers.push((AUTHORIZATION.to_owned(), format!("Bearer {}", token.as_str())));
    request
}

#[cfg(test)]
#[path = "authorize_tests.rs"]
mod tests;
