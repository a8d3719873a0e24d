// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Connects to the same store every daemon instance uses and builds a
//! [`Registry`] over it, so the CLI calls `Registry::execute` exactly like
//! a transport would (spec.md §4.8) instead of talking to Redis directly.
//! There is no separate daemon-socket protocol to dial: the fabric's shared
//! state lives in the store, not in any one process.

use cb_core::{Clock, Config, SystemClock};
use cb_registry::{CallerMetadata, Registry};
use cb_store::{RedisStore, StoreAdapter};
use std::sync::Arc;

use crate::exit_error::ExitError;

pub struct Client {
    registry: Registry,
}

impl Client {
    pub async fn connect(config: &Config) -> anyhow::Result<Self> {
        let store: Arc<dyn StoreAdapter> = Arc::new(RedisStore::connect(&config.redis_url).await?);
        let clock = SystemClock;
        let now_ms: Arc<dyn Fn() -> u64 + Send + Sync> = Arc::new(move || clock.epoch_ms());
        let instance_id = config.instance_id.clone().unwrap_or_else(|| format!("cb-cli-{}", nanoid::nanoid!(8)));
        let registry = Registry::new(instance_id, store, now_ms, config);
        Ok(Self { registry })
    }

    /// Runs one operation through the registered handler pipeline and maps
    /// its typed error onto an [`ExitError`] with the matching exit code.
    pub async fn execute(&self, event: &str, params: serde_json::Value) -> Result<serde_json::Value, ExitError> {
        self.registry.execute(event, params, CallerMetadata::default()).await.map_err(ExitError::from)
    }

    pub fn inventory(&self) -> Vec<cb_registry::InventoryEntry> {
        self.registry.inventory()
    }
}
