// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `cbd`: the daemon binary. Loads configuration, installs structured
//! logging, and runs [`cb_daemon::run`] until a shutdown signal arrives.

use cb_core::Config;
use cb_daemon::{init_logging, run};

#[tokio::main]
async fn main() -> std::process::ExitCode {
    init_logging();

    let config_path = std::env::var("CB_CONFIG_PATH").ok().map(std::path::PathBuf::from);
    let config = Config::load(config_path.as_deref());

    match run(config).await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "daemon exited with an error");
            std::process::ExitCode::FAILURE
        }
    }
}
