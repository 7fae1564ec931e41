// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `coopadmin login` — sign in and persist the session.

use std::io::{BufRead, Write};

use rustix::termios::{self, OptionalActions};

use coopadmin_client::{ApiError, SessionClient};

pub async fn run(client: &SessionClient, username: &str, password: Option<String>) -> i32 {
    let password = match password {
        Some(p) => p,
        None => match prompt_password() {
            Ok(p) => p,
            Err(e) => {
                eprintln!("error: {e}");
                return 2;
            }
        },
    };

    match client.login(username, &password).await {
        Ok(identity) => {
            match identity {
                Some(user) => println!("signed in as {}", user.username),
                None => println!("signed in"),
            }
            0
        }
        Err(ApiError::Validation(detail)) => {
            eprintln!("login rejected: {detail}");
            2
        }
        Err(e) => {
            eprintln!("error: {e}");
            1
        }
    }
}

fn prompt_password() -> std::io::Result<String> {
    let stdin = std::io::stdin();
    eprint!("password: ");
    std::io::stderr().flush()?;

    let mut line = String::new();
    {
        let _guard = EchoGuard::disable(&stdin);
        stdin.lock().read_line(&mut line)?;
    }
    Ok(strip_line_ending(&line))
}

fn strip_line_ending(line: &str) -> String {
    line.trim_end_matches(['\r', '\n']).to_owned()
}

/// Suppresses terminal echo while the password is typed. Stores the
/// original termios state and restores it on drop, so the terminal is
/// sane again on every exit path. No-op when stdin is not a terminal
/// (piped input).
struct EchoGuard<'fd> {
    stdin: &'fd std::io::Stdin,
    original: Option<termios::Termios>,
}

impl<'fd> EchoGuard<'fd> {
    fn disable(stdin: &'fd std::io::Stdin) -> Self {
        let original = termios::tcgetattr(stdin).ok();
        if let Some(original) = &original {
            let mut muted = original.clone();
            muted.local_modes &= !termios::LocalModes::ECHO;
            let _ = termios::tcsetattr(stdin, OptionalActions::Flush, &muted);
        }
        Self { stdin, original }
    }
}

impl Drop for EchoGuard<'_> {
    fn drop(&mut self) {
        if let Some(original) = &self.original {
            let _ = termios::tcsetattr(self.stdin, OptionalActions::Flush, original);
            // The suppressed newline from the user's enter key.
            eprintln!();
        }
    }
}

#[cfg(test)]
#[path = "login_tests.rs"]
mod tests;
