//! dbfork - Demonstrate zero-copy forking of a managed Postgres database.
//!
//! The run is a single sequential pass:
//! - Resolve the source service (flags/env, then the CLI's stored config)
//! - Fork it through the external CLI (`tiger service fork ... --now`)
//! - Write a row to the fork, count rows on both, and show they diverged
//! - Delete the fork

mod cli;
mod config;
mod db;
mod demo;
mod error;
mod models;
mod names;
mod process;
mod service;
#[cfg(test)]
mod testing;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{execute, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dbfork=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // Usage errors exit 1 like every other failure; help and version exit 0.
        Err(err) => {
            err.print()?;
            std::process::exit(i32::from(err.use_stderr()));
        }
    };
    execute(cli).await
}
