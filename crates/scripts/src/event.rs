// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed wrappers over the `event_*` scripts used by `cb-bus` for
//! exactly-once delivery and ordered per-partition history.

use crate::catalog::{self, event_add_to_partition, event_is_duplicate};
use crate::error::ScriptError;
use cb_store::StoreAdapter;

pub async fn is_duplicate(
    store: &dyn StoreAdapter,
    processed_set: &str,
    event_id: &str,
    ttl_secs: u64,
) -> Result<bool, ScriptError> {
    let keys = vec![processed_set.to_string()];
    let args = vec![event_id.to_string(), ttl_secs.to_string()];
    let v = catalog::invoke(store, event_is_duplicate::NAME, event_is_duplicate::SOURCE, &keys, &args).await?;
    Ok(v.get("duplicate").and_then(|d| d.as_bool()).unwrap_or(false))
}

pub async fn add_to_partition(
    store: &dyn StoreAdapter,
    partition_key: &str,
    event_json: &str,
    max_len: i64,
    ttl_secs: u64,
) -> Result<(), ScriptError> {
    let keys = vec![partition_key.to_string()];
    let args = vec![event_json.to_string(), max_len.to_string(), ttl_secs.to_string()];
    catalog::invoke(store, event_add_to_partition::NAME, event_add_to_partition::SOURCE, &keys, &args).await?;
    Ok(())
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
