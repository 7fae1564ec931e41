// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `coopadmin` — terminal client for the coopadmin back end.
//!
//! Thin wrapper over `coopadmin-client`: sign in, inspect the session,
//! and issue authorized API requests with transparent credential renewal.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use coopadmin_client::storage::FileStorage;
use coopadmin_client::{ClientConfig, SessionClient};

mod get;
mod login;
mod logout;
mod status;
mod whoami;

/// Terminal client for the coopadmin cooperative-management API.
#[derive(Debug, Parser)]
#[command(name = "coopadmin", version, about)]
struct Cli {
    /// Base URL of the coopadmin back end.
    #[arg(long, env = "COOPADMIN_URL", default_value = "http://127.0.0.1:8000")]
    url: String,

    /// Directory where session credentials are persisted.
    #[arg(long, env = "COOPADMIN_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log filter (tracing EnvFilter syntax).
    #[arg(long, env = "COOPADMIN_LOG", default_value = "warn")]
    log_level: String,

    /// Log format: text or json.
    #[arg(long, default_value = "text")]
    log_format: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sign in and persist the session.
    Login {
        username: String,
        /// Password; prompted on stdin when omitted.
        #[arg(long)]
        password: Option<String>,
    },
    /// Show the current session state.
    Status,
    /// Fetch the signed-in profile from the server.
    Whoami,
    /// Issue an authorized GET against an API path.
    Get {
        /// Absolute API path, e.g. /api/v1/members/members/
        path: String,
    },
    /// Sign out locally and (best-effort) on the server.
    Logout,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(&cli);

    let client = match build_client(&cli) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("error: {e:#}");
            std::process::exit(2);
        }
    };

    let code = match cli.command {
        Command::Login { username, password } => login::run(&client, &username, password).await,
        Command::Status => status::run(&client).await,
        Command::Whoami => whoami::run(&client).await,
        Command::Get { path } => get::run(&client, &path).await,
        Command::Logout => logout::run(&client).await,
    };
    std::process::exit(code);
}

fn init_tracing(cli: &Cli) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));

    match cli.log_format.as_str() {
        "json" => {
            fmt::fmt().with_env_filter(filter).json().init();
        }
        _ => {
            fmt::fmt().with_env_filter(filter).init();
        }
    }
}

fn build_client(cli: &Cli) -> anyhow::Result<SessionClient> {
    let data_dir = match cli.data_dir.clone() {
        Some(dir) => dir,
        None => default_data_dir()?,
    };
    let storage = Arc::new(FileStorage::new(data_dir));
    let config = ClientConfig::new(cli.url.clone());
    Ok(SessionClient::over_http(config, storage)?)
}

fn default_data_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var_os("HOME")
        .ok_or_else(|| anyhow::anyhow!("HOME not set; pass --data-dir"))?;
    Ok(PathBuf::from(home).join(".config").join("coopadmin"))
}
