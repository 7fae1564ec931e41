// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `coopadmin whoami` — validate the session and print the signed-in
//! profile, exercising transparent renewal when the access token is stale.

use coopadmin_client::{SessionClient, SessionState};

pub async fn run(client: &SessionClient) -> i32 {
    if client.resume().await != SessionState::Authenticated {
        eprintln!("not signed in (run `coopadmin login`)");
        return 1;
    }

    match client.identity() {
        Some(user) => {
            println!("{}", user.username);
            if let Some(name) = user.display_name {
                println!("  name:  {name}");
            }
            if !user.roles.is_empty() {
                println!("  roles: {}", user.roles.join(", "));
            }
            0
        }
        None => {
            eprintln!("signed in, but no profile is available");
            1
        }
    }
}
