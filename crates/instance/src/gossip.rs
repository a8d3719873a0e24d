// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Gossip health view and partition inference (spec.md §4.4 "Gossip &
//! Partition Detector", spec.md §4.7 "detect-partitions"). `cb-scheduler`
//! calls [`detect_partitions`] on its own cadence; the policy itself lives
//! here so it stays paired with the gossip hash it reads.

use crate::error::InstanceError;
use cb_core::Keys;
use cb_store::StoreAdapter;

/// A point-in-time read of `gossip:health`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GossipView {
    pub total: usize,
    pub healthy: usize,
}

impl GossipView {
    /// spec.md §4.7: "if total>2 and healthy < total/2 sets `partition:detected`".
    pub fn is_partitioned(&self) -> bool {
        self.total > 2 && self.healthy < self.total / 2
    }

    /// spec.md §4.7: "if healthy > 0.7·total sets `partition:recovery`".
    pub fn is_recovered(&self) -> bool {
        self.total > 0 && (self.healthy as f64) > 0.7 * (self.total as f64)
    }
}

pub async fn read_gossip_view(store: &dyn StoreAdapter, gossip_key: &str) -> Result<GossipView, InstanceError> {
    let fields = store.hgetall(gossip_key).await?;
    let total = fields.len();
    let healthy = fields
        .values()
        .filter(|raw| {
            serde_json::from_str::<serde_json::Value>(raw)
                .ok()
                .and_then(|v| v.get("status").and_then(|s| s.as_str().map(str::to_string)))
                .as_deref()
                == Some("healthy")
        })
        .count();
    Ok(GossipView { total, healthy })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionStatus {
    pub detected: bool,
    pub recovered: bool,
}

/// Updates `partition:detected`/`partition:recovery` (TTL 300s, spec.md §3)
/// from the current gossip view. Both flags are advisory and may be set
/// together during a flapping transition; the scheduler calling this on a
/// short cadence is what keeps them current.
pub async fn detect_partitions(store: &dyn StoreAdapter, keys: &Keys) -> Result<PartitionStatus, InstanceError> {
    let view = read_gossip_view(store, &keys.gossip_health()).await?;
    let detected = view.is_partitioned();
    let recovered = view.is_recovered();
    if detected {
        store.set_ex(&keys.partition_detected(), "true", 300).await?;
    }
    if recovered {
        store.set_ex(&keys.partition_recovery(), "true", 300).await?;
    }
    Ok(PartitionStatus { detected, recovered })
}

#[cfg(test)]
#[path = "gossip_tests.rs"]
mod tests;
