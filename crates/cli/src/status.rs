// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `coopadmin status` — session state at a glance.

use coopadmin_client::SessionClient;

pub async fn run(client: &SessionClient) -> i32 {
    let state = client.resume().await;

    let user = client
        .identity()
        .map(|id| id.username)
        .unwrap_or_else(|| "\u{2014}".to_owned());
    let roles = client
        .identity()
        .map(|id| if id.roles.is_empty() { "\u{2014}".to_owned() } else { id.roles.join(", ") })
        .unwrap_or_else(|| "\u{2014}".to_owned());
    let issued = client
        .credentials()
        .map(|pair| format_age(pair.issued_at_ms))
        .unwrap_or_else(|| "\u{2014}".to_owned());

    print_table(&[
        ("STATE", state.as_str().to_owned()),
        ("USER", user),
        ("ROLES", roles),
        ("SIGNED IN", issued),
    ]);

    0
}

fn print_table(rows: &[(&str, String)]) {
    let label_w = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    for (label, value) in rows {
        println!("{label:<label_w$}  {value}");
    }
}

/// Render how long ago a millisecond timestamp was, coarsely.
fn format_age(issued_at_ms: u64) -> String {
    let now_ms = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64;
    let secs = now_ms.saturating_sub(issued_at_ms) / 1000;
    if secs < 60 {
        format!("{secs}s ago")
    } else if secs < 3600 {
        format!("{}m ago", secs / 60)
    } else {
        format!("{}h {}m ago", secs / 3600, (secs % 3600) / 60)
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
