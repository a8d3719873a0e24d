// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Structured logging setup (spec.md §9 ambient stack — "logging" the way
//! the teacher's own `tracing`/`tracing-subscriber` stack does it): an
//! `EnvFilter` driven by `RUST_LOG` (defaulting to `info`), switching
//! between a human-readable formatter and newline-delimited JSON via
//! `CB_LOG_FORMAT=json` for log-aggregator ingestion.

use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global subscriber. Call once, before the first `tracing`
/// event — idempotent calls after the first are a no-op logged at `warn`.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("CB_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let result = if json {
        fmt().with_env_filter(filter).json().try_init()
    } else {
        fmt().with_env_filter(filter).try_init()
    };

    if let Err(err) = result {
        eprintln!("logging already initialized: {err}");
    }
}
