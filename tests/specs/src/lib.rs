// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test harness for end-to-end session-manager scenarios.
//!
//! Spawns an in-process mock of the coopadmin back end (identity endpoints
//! plus one protected resource) and exposes knobs for expiring the current
//! access token, delaying or failing renewal, and counting refresh calls.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use tokio::net::TcpListener;

/// Knobs for [`MockCoop::spawn`].
#[derive(Debug, Clone)]
pub struct MockCoopOptions {
    /// Whether the refresh endpoint succeeds.
    pub refresh_ok: bool,
    /// Artificial latency before the refresh endpoint answers.
    pub refresh_delay: Duration,
    /// Status the logout endpoint returns.
    pub logout_status: u16,
    /// When set, the protected resource 401s every request regardless of
    /// token — simulates a server that never accepts the credential.
    pub always_401: bool,
}

impl Default for MockCoopOptions {
    fn default() -> Self {
        Self {
            refresh_ok: true,
            refresh_delay: Duration::ZERO,
            logout_status: 200,
            always_401: false,
        }
    }
}

struct ServerState {
    options: MockCoopOptions,
    /// The access token the server currently accepts.
    valid_access: Mutex<String>,
    /// Monotonic counter used to mint successive access tokens.
    generation: AtomicU32,
    refresh_hits: AtomicU32,
    login_hits: AtomicU32,
}

/// A running mock back end.
pub struct MockCoop {
    base: String,
    state: Arc<ServerState>,
}

impl MockCoop {
    pub async fn spawn(options: MockCoopOptions) -> anyhow::Result<Self> {
        let state = Arc::new(ServerState {
            options,
            valid_access: Mutex::new("t1".to_owned()),
            generation: AtomicU32::new(1),
            refresh_hits: AtomicU32::new(0),
            login_hits: AtomicU32::new(0),
        });

        let router = Router::new()
            .route("/api/v1/auth/login/", post(login))
            .route("/api/v1/auth/refresh/", post(refresh))
            .route("/api/v1/auth/logout/", post(logout))
            .route("/api/v1/auth/profile/", get(profile))
            .route("/api/v1/members/members/", get(members))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Ok(Self { base: format!("http://{addr}"), state })
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    pub fn refresh_hits(&self) -> u32 {
        self.state.refresh_hits.load(Ordering::SeqCst)
    }

    pub fn login_hits(&self) -> u32 {
        self.state.login_hits.load(Ordering::SeqCst)
    }

    /// The token the server currently accepts.
    pub fn valid_access(&self) -> String {
        self.state.valid_access.lock().clone()
    }

    /// Invalidate the outstanding access token server-side, as a real back
    /// end does when it expires. The next refresh mints the successor.
    pub fn expire_access(&self) {
        let next = self.state.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *self.state.valid_access.lock() = format!("t{next}");
    }
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

fn authorized(state: &ServerState, headers: &HeaderMap) -> bool {
    if state.options.always_401 {
        return false;
    }
    bearer(headers).is_some_and(|token| token == *state.valid_access.lock())
}

async fn login(
    State(state): State<Arc<ServerState>>,
    Json(body): Json<serde_json::Value>,
) -> (StatusCode, Json<serde_json::Value>) {
    state.login_hits.fetch_add(1, Ordering::SeqCst);
    if body["password"] != "secret" {
        return (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "detail": "invalid credentials" })),
        );
    }
    let access = state.valid_access.lock().clone();
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "access": access,
            "refresh": "r1",
            "user": { "id": 1, "username": body["username"], "roles": ["manager"] },
        })),
    )
}

async fn refresh(
    State(state): State<Arc<ServerState>>,
    Json(body): Json<serde_json::Value>,
) -> (StatusCode, Json<serde_json::Value>) {
    state.refresh_hits.fetch_add(1, Ordering::SeqCst);
    tokio::time::sleep(state.options.refresh_delay).await;

    if !state.options.refresh_ok || body["refresh"] != "r1" {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "detail": "token is blacklisted" })),
        );
    }
    let access = state.valid_access.lock().clone();
    (StatusCode::OK, Json(serde_json::json!({ "access": access })))
}

async fn logout(State(state): State<Arc<ServerState>>) -> StatusCode {
    StatusCode::from_u16(state.options.logout_status).unwrap_or(StatusCode::OK)
}

async fn profile(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
) -> (StatusCode, Json<serde_json::Value>) {
    if !authorized(&state, &headers) {
        return (StatusCode::UNAUTHORIZED, Json(serde_json::json!({})));
    }
    (
        StatusCode::OK,
        Json(serde_json::json!({ "id": 1, "username": "amina", "roles": ["manager"] })),
    )
}

async fn members(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
) -> (StatusCode, Json<serde_json::Value>) {
    if !authorized(&state, &headers) {
        return (StatusCode::UNAUTHORIZED, Json(serde_json::json!({})));
    }
    (
        StatusCode::OK,
        Json(serde_json::json!({ "count": 2, "results": [
            { "id": 10, "name": "Amina Diallo" },
            { "id": 11, "name": "Kofi Mensah" },
        ]})),
    )
}
