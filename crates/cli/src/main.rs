// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `cb`: a thin command-line transport over the same `Registry::execute`
//! entry point the daemon's JSON-RPC/WebSocket surfaces call through
//! (spec.md §4.8, §6 "Transport projection"). Every subcommand here maps
//! one-to-one onto an event name; this binary owns no domain logic.

mod client;
mod color;
mod commands;
mod exit_error;
mod output;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

use cb_core::Config;
use client::Client;
use commands::{system, task};
use exit_error::ExitError;
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "cb", version, about = "ClaudeBench fabric CLI", styles = color::styles())]
struct Cli {
    /// Override `CB_REDIS_URL` / the config default for this invocation.
    #[arg(long, global = true)]
    redis_url: Option<String>,

    #[arg(long, value_enum, global = true, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Task lifecycle operations (spec.md §4.3).
    #[command(subcommand)]
    Task(task::TaskCommand),
    /// Instance registration, heartbeat, and fleet snapshots (spec.md §4.4).
    #[command(subcommand)]
    System(system::SystemCommand),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if let Some(exit_err) = err.downcast_ref::<ExitError>() {
                eprintln!("error: {}", exit_err.message);
                ExitCode::from(exit_err.code.clamp(1, 255) as u8)
            } else {
                eprintln!("error: {err}");
                ExitCode::from(1)
            }
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load(None);
    if let Some(redis_url) = cli.redis_url {
        config.redis_url = redis_url;
    }
    let client = Client::connect(&config).await?;

    match cli.command {
        Command::Task(cmd) => task::run(&client, cmd, cli.format).await,
        Command::System(cmd) => system::run(&client, cmd, cli.format).await,
    }
}
