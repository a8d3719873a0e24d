// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed wrappers over the `metrics_aggregate`/`state_sync` scripts that
//! back `cb-scheduler`'s `aggregate-metrics` and `sync-state` jobs
//! (spec.md §4.7).

use crate::catalog::{self, metrics_aggregate, state_sync};
use crate::error::ScriptError;
use cb_store::StoreAdapter;

/// `aggregate-metrics` (spec.md §4.7): folds `metrics:queues` and the
/// active-instance count into `metrics:global`/`metrics:scaling`.
pub async fn aggregate(
    store: &dyn StoreAdapter,
    queues_key: &str,
    active_set: &str,
    global_key: &str,
    scaling_key: &str,
    now_iso: &str,
) -> Result<(), ScriptError> {
    let keys = vec![queues_key.to_string(), active_set.to_string(), global_key.to_string(), scaling_key.to_string()];
    let args = vec![now_iso.to_string()];
    catalog::invoke(store, metrics_aggregate::NAME, metrics_aggregate::SOURCE, &keys, &args).await?;
    Ok(())
}

pub struct StateSyncOutcome {
    pub version: u64,
}

/// `sync-state` (spec.md §4.7): snapshots instance+task counts into
/// `state:global` with a bumped, monotonic `version` (spec.md §3 Invariants).
pub async fn sync_state(
    store: &dyn StoreAdapter,
    tasks_set: &str,
    active_set: &str,
    state_key: &str,
    now_iso: &str,
) -> Result<StateSyncOutcome, ScriptError> {
    let keys = vec![tasks_set.to_string(), active_set.to_string(), state_key.to_string()];
    let args = vec![now_iso.to_string()];
    let v = catalog::invoke(store, state_sync::NAME, state_sync::SOURCE, &keys, &args).await?;
    Ok(StateSyncOutcome { version: v.get("version").and_then(|x| x.as_u64()).unwrap_or(0) })
}

#[cfg(test)]
#[path = "metrics_tests.rs"]
mod tests;
