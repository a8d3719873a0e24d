// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recognized configuration options (spec.md §6 "Configuration").
//!
//! Read the way the teacher's `oj-daemon::env` module reads its
//! environment: named accessor-free struct with documented defaults,
//! loaded from environment variables and optionally overridden by a
//! `cb.toml` file. No configuration-framework dependency.

use serde::Deserialize;
use std::time::Duration;

/// Fully resolved runtime configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub redis_url: String,
    pub heartbeat_timeout_ms: u64,
    pub leader_lease_ms: u64,
    pub rate_limit_window_ms: u64,
    pub default_capacity: u32,
    pub snapshot_every_n: u64,
    pub processed_event_ttl_s: u64,
    pub stream_trim_max_len: usize,
    pub auto_assign_delay_ms: u64,
    pub instance_id: Option<String>,
    pub roles: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            redis_url: "redis://127.0.0.1:6379".to_string(),
            heartbeat_timeout_ms: 30_000,
            leader_lease_ms: 30_000,
            rate_limit_window_ms: 60_000,
            default_capacity: 10,
            snapshot_every_n: 100,
            processed_event_ttl_s: 86_400,
            stream_trim_max_len: 10_000,
            auto_assign_delay_ms: 5_000,
            instance_id: None,
            roles: vec!["worker".to_string()],
        }
    }
}

impl Config {
    /// Load from an optional `cb.toml` file, then apply environment
    /// variable overrides (env wins, matching the teacher's precedence of
    /// explicit env vars over any file-based default).
    pub fn load(toml_path: Option<&std::path::Path>) -> Self {
        let mut config = match toml_path.and_then(|p| std::fs::read_to_string(p).ok()) {
            Some(contents) => toml::from_str(&contents).unwrap_or_default(),
            None => Self::default(),
        };
        config.apply_env();
        config
    }

    fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("CB_REDIS_URL") {
            self.redis_url = v;
        }
        if let Some(v) = env_u64("CB_HEARTBEAT_TIMEOUT_MS") {
            self.heartbeat_timeout_ms = v;
        }
        if let Some(v) = env_u64("CB_LEADER_LEASE_MS") {
            self.leader_lease_ms = v;
        }
        if let Some(v) = env_u64("CB_RATE_LIMIT_WINDOW_MS") {
            self.rate_limit_window_ms = v;
        }
        if let Some(v) = env_u64("CB_DEFAULT_CAPACITY") {
            self.default_capacity = v as u32;
        }
        if let Some(v) = env_u64("CB_SNAPSHOT_EVERY_N") {
            self.snapshot_every_n = v;
        }
        if let Some(v) = env_u64("CB_PROCESSED_EVENT_TTL_S") {
            self.processed_event_ttl_s = v;
        }
        if let Some(v) = env_u64("CB_STREAM_TRIM_MAX_LEN") {
            self.stream_trim_max_len = v as usize;
        }
        if let Some(v) = env_u64("CB_AUTO_ASSIGN_DELAY_MS") {
            self.auto_assign_delay_ms = v;
        }
        if let Ok(v) = std::env::var("CB_INSTANCE_ID") {
            self.instance_id = Some(v);
        }
        if let Ok(v) = std::env::var("CB_ROLES") {
            self.roles = v.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect();
        }
    }

    pub fn heartbeat_timeout(&self) -> Duration {
        Duration::from_millis(self.heartbeat_timeout_ms)
    }

    pub fn leader_lease(&self) -> Duration {
        Duration::from_millis(self.leader_lease_ms)
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_millis(self.rate_limit_window_ms)
    }
}

fn env_u64(name: &str) -> Option<u64> {
    std::env::var(name).ok().and_then(|s| s.parse::<u64>().ok())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
