// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end scenarios driving the real client (reqwest transport) against
//! the in-process mock back end.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;

use coopadmin_client::storage::{FileStorage, MemoryStorage, Storage};
use coopadmin_client::{
    ApiError, ClientConfig, RequestDescriptor, SessionClient, SessionEvent, SessionState,
};
use coopadmin_specs::{MockCoop, MockCoopOptions};

const MEMBERS: &str = "/api/v1/members/members/";

fn client_for(mock: &MockCoop) -> SessionClient {
    SessionClient::over_http(
        ClientConfig::new(mock.base_url()).with_renew_timeout(Duration::from_secs(5)),
        Arc::new(MemoryStorage::new()),
    )
    .unwrap()
}

#[tokio::test]
async fn login_then_authorized_requests_carry_the_token() {
    let mock = MockCoop::spawn(MockCoopOptions::default()).await.unwrap();
    let client = client_for(&mock);

    let identity = client.login("amina", "secret").await.unwrap().unwrap();
    assert_eq!(identity.username, "amina");
    assert_eq!(client.session_state(), SessionState::Authenticated);

    let response = client.request(RequestDescriptor::get(MEMBERS)).await.unwrap();
    assert_eq!(response.status, 200);
    let body: serde_json::Value = response.json().unwrap();
    assert_eq!(body["count"], 2);
    assert_eq!(mock.refresh_hits(), 0);
}

#[tokio::test]
async fn concurrent_401s_share_a_single_renewal() {
    let mock = MockCoop::spawn(MockCoopOptions {
        refresh_delay: Duration::from_millis(150),
        ..Default::default()
    })
    .await
    .unwrap();
    let client = client_for(&mock);
    client.login("amina", "secret").await.unwrap();

    // Server-side expiry: every in-flight token is now stale.
    mock.expire_access();

    let responses =
        join_all((0..5).map(|_| client.request(RequestDescriptor::get(MEMBERS)))).await;

    for response in responses {
        assert_eq!(response.unwrap().status, 200);
    }
    assert_eq!(mock.refresh_hits(), 1);
    assert_eq!(client.credentials().unwrap().access.as_str(), mock.valid_access());
}

#[tokio::test]
async fn staggered_requests_join_the_renewal_in_flight() {
    let mock = MockCoop::spawn(MockCoopOptions {
        refresh_delay: Duration::from_millis(200),
        ..Default::default()
    })
    .await
    .unwrap();
    let client = Arc::new(client_for(&mock));
    client.login("amina", "secret").await.unwrap();
    mock.expire_access();

    // A fails first and starts the renewal; B and C fail while it is in
    // flight and must join the queue rather than renew again.
    let a = {
        let client = Arc::clone(&client);
        tokio::spawn(async move { client.request(RequestDescriptor::get(MEMBERS)).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    let b = {
        let client = Arc::clone(&client);
        tokio::spawn(async move { client.request(RequestDescriptor::get(MEMBERS)).await })
    };
    let c = {
        let client = Arc::clone(&client);
        tokio::spawn(async move { client.request(RequestDescriptor::get(MEMBERS)).await })
    };

    assert_eq!(a.await.unwrap().unwrap().status, 200);
    assert_eq!(b.await.unwrap().unwrap().status, 200);
    assert_eq!(c.await.unwrap().unwrap().status, 200);
    assert_eq!(mock.refresh_hits(), 1);
}

#[tokio::test]
async fn failed_renewal_ends_the_session_for_every_waiter() {
    let mock = MockCoop::spawn(MockCoopOptions {
        refresh_ok: false,
        refresh_delay: Duration::from_millis(100),
        ..Default::default()
    })
    .await
    .unwrap();
    let client = client_for(&mock);
    client.login("amina", "secret").await.unwrap();
    let mut events = client.subscribe_events();
    mock.expire_access();

    let outcomes =
        join_all((0..3).map(|_| client.request(RequestDescriptor::get(MEMBERS)))).await;

    for outcome in outcomes {
        assert_eq!(outcome.unwrap_err(), ApiError::AuthExpired);
    }
    assert_eq!(mock.refresh_hits(), 1);
    assert!(client.credentials().is_none());
    assert_eq!(client.session_state(), SessionState::Failed);
    assert_eq!(events.recv().await.unwrap(), SessionEvent::RedirectToLogin);
}

#[tokio::test]
async fn a_server_that_never_accepts_the_token_terminates_after_one_renewal() {
    let mock = MockCoop::spawn(MockCoopOptions { always_401: true, ..Default::default() })
        .await
        .unwrap();
    let client = client_for(&mock);
    client.login("amina", "secret").await.unwrap();

    let err = client.request(RequestDescriptor::get(MEMBERS)).await.unwrap_err();

    assert_eq!(err, ApiError::AuthExpired);
    // The retried 401 did not trigger a second renewal.
    assert_eq!(mock.refresh_hits(), 1);
    assert_eq!(client.session_state(), SessionState::Failed);
}

#[tokio::test]
async fn logout_clears_locally_when_the_server_errors() {
    let mock = MockCoop::spawn(MockCoopOptions { logout_status: 500, ..Default::default() })
        .await
        .unwrap();
    let client = client_for(&mock);
    client.login("amina", "secret").await.unwrap();

    client.logout().await;

    assert!(client.credentials().is_none());
    assert_eq!(client.session_state(), SessionState::Unauthenticated);
}

#[tokio::test]
async fn persisted_session_survives_a_process_restart() {
    let mock = MockCoop::spawn(MockCoopOptions::default()).await.unwrap();
    let dir = tempfile::tempdir().unwrap();

    {
        let client = SessionClient::over_http(
            ClientConfig::new(mock.base_url()),
            Arc::new(FileStorage::new(dir.path())),
        )
        .unwrap();
        client.login("amina", "secret").await.unwrap();
    }

    let restarted = SessionClient::over_http(
        ClientConfig::new(mock.base_url()),
        Arc::new(FileStorage::new(dir.path())),
    )
    .unwrap();

    assert_eq!(restarted.resume().await, SessionState::Authenticated);
    assert_eq!(restarted.identity().unwrap().username, "amina");
    // No second login happened — the persisted pair was enough.
    assert_eq!(mock.login_hits(), 1);
}

#[tokio::test]
async fn resume_renews_a_stale_persisted_token() {
    let mock = MockCoop::spawn(MockCoopOptions::default()).await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let storage: Arc<dyn Storage> = Arc::new(FileStorage::new(dir.path()));

    {
        let client = SessionClient::over_http(
            ClientConfig::new(mock.base_url()),
            Arc::clone(&storage),
        )
        .unwrap();
        client.login("amina", "secret").await.unwrap();
    }

    // The persisted access token expires while the app is closed.
    mock.expire_access();

    let restarted =
        SessionClient::over_http(ClientConfig::new(mock.base_url()), storage).unwrap();

    assert_eq!(restarted.resume().await, SessionState::Authenticated);
    assert_eq!(mock.refresh_hits(), 1);
    assert_eq!(restarted.credentials().unwrap().access.as_str(), mock.valid_access());
}
