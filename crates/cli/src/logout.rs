// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `coopadmin logout` — local wipe plus best-effort server notification.

use coopadmin_client::SessionClient;

pub async fn run(client: &SessionClient) -> i32 {
    // Load whatever is persisted so the server call carries the token;
    // a network failure here is fine, logout still clears locally.
    client.resume().await;
    client.logout().await;
    println!("signed out");
    0
}
