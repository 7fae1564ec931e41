// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `coopadmin get` — authorized GET against an arbitrary API path.

use coopadmin_client::{ApiError, RequestDescriptor, SessionClient};

pub async fn run(client: &SessionClient, path: &str) -> i32 {
    client.resume().await;

    match client.request(RequestDescriptor::get(path)).await {
        Ok(response) => {
            print_body(&response.body);
            if response.is_success() {
                0
            } else {
                eprintln!("server returned {}", response.status);
                1
            }
        }
        Err(ApiError::AuthExpired) => {
            eprintln!("session expired, sign in again");
            1
        }
        Err(e) => {
            eprintln!("error: {e}");
            1
        }
    }
}

/// Pretty-print JSON bodies; fall back to raw output.
fn print_body(body: &[u8]) {
    match serde_json::from_slice::<serde_json::Value>(body) {
        Ok(value) => match serde_json::to_string_pretty(&value) {
            Ok(pretty) => println!("{pretty}"),
            Err(_) => println!("{}", String::from_utf8_lossy(body)),
        },
        Err(_) => println!("{}", String::from_utf8_lossy(body)),
    }
}
