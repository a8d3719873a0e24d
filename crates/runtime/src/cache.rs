// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Store-backed response cache (spec.md §4.6 "optional response cache"):
//! keyed by event and a hash of the call's params, so two callers making
//! the identical read within the TTL window share one handler execution's
//! result.

use cb_core::Keys;
use cb_store::StoreAdapter;
use serde_json::Value;
use std::time::Duration;

/// Stable enough across processes for cache-key purposes: `serde_json`
/// serializes object keys in insertion order, but every caller building
/// `params` for the same event goes through the same deserialization path,
/// so equal values hash equal here even though this isn't a canonical JSON
/// hash.
pub fn params_hash(params: &Value) -> String {
    use std::hash::{Hash, Hasher};
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    params.to_string().hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

pub async fn get(store: &dyn StoreAdapter, keys: &Keys, event: &str, hash: &str) -> Option<Value> {
    let key = keys.response_cache(event, hash);
    let raw = store.get(&key).await.ok().flatten()?;
    serde_json::from_str(&raw).ok()
}

pub async fn put(store: &dyn StoreAdapter, keys: &Keys, event: &str, hash: &str, ttl: Duration, result: &Value) {
    let key = keys.response_cache(event, hash);
    let Ok(raw) = serde_json::to_string(result) else { return };
    let ttl_secs = ttl.as_secs().max(1);
    let _ = store.set_ex(&key, &raw, ttl_secs).await;
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
