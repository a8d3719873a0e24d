// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Store-backed fixed-window rate limiter (spec.md §4.6 "rate-limit"):
//! unlike the breaker, this has to agree across every process sharing the
//! store, so it lives in Redis rather than in-process state.

use cb_core::{CbError, Keys};
use cb_store::StoreAdapter;

/// Counts one call against `event`'s current window and decides whether it
/// may proceed. `window_ms` buckets calls into `now_ms / window_ms`-keyed
/// windows, so the limit resets on a fixed cadence rather than rolling.
pub async fn check(
    store: &dyn StoreAdapter,
    keys: &Keys,
    event: &str,
    limit: u32,
    window_ms: u64,
    now_ms: u64,
) -> Result<(), CbError> {
    let bucket = now_ms / window_ms;
    let key = format!("{}:{bucket}", keys.rate_limit(event));
    let count = store.hincrby(&key, "count", 1).await.map_err(|e| CbError::internal(&e.to_string()))?;
    if count == 1 {
        let window_secs = window_ms.div_ceil(1000).max(1);
        store.expire(&key, window_secs).await.map_err(|e| CbError::internal(&e.to_string()))?;
    }
    if count as u32 > limit {
        let window_end_ms = (bucket + 1) * window_ms;
        let remaining_ms = window_end_ms.saturating_sub(now_ms);
        return Err(CbError::rate_limited(remaining_ms));
    }
    Ok(())
}

#[cfg(test)]
#[path = "rate_limit_tests.rs"]
mod tests;
