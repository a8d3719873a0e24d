// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed wrappers over the `system_*` and `task_reassign_failed` scripts
//! (instance registration, heartbeat/lease renewal, failed-worker task
//! redistribution).

use crate::catalog::{self, system_heartbeat, system_register, task_reassign_failed};
use crate::error::ScriptError;
use cb_store::StoreAdapter;

pub struct RegisterOutcome {
    pub became_leader: bool,
}

#[allow(clippy::too_many_arguments)]
pub async fn register(
    store: &dyn StoreAdapter,
    instance_key: &str,
    active_set: &str,
    leader_current: &str,
    leader_lock: &str,
    id: &str,
    roles_json: &str,
    now_iso: &str,
    now_ms: i64,
    heartbeat_timeout_secs: u64,
    lease_secs: u64,
) -> Result<RegisterOutcome, ScriptError> {
    let keys = vec![instance_key.to_string(), active_set.to_string(), leader_current.to_string(), leader_lock.to_string()];
    let args = vec![
        id.to_string(),
        roles_json.to_string(),
        now_iso.to_string(),
        now_ms.to_string(),
        heartbeat_timeout_secs.to_string(),
        lease_secs.to_string(),
    ];
    let v = catalog::invoke(store, system_register::NAME, system_register::SOURCE, &keys, &args).await?;
    Ok(RegisterOutcome { became_leader: v.get("becameLeader").and_then(|b| b.as_bool()).unwrap_or(false) })
}

pub struct HeartbeatOutcome {
    pub is_leader: bool,
}

#[allow(clippy::too_many_arguments)]
pub async fn heartbeat(
    store: &dyn StoreAdapter,
    instance_key: &str,
    gossip_key: &str,
    leader_current: &str,
    leader_lock: &str,
    id: &str,
    now_iso: &str,
    now_ms: i64,
    heartbeat_timeout_secs: u64,
    lease_secs: u64,
) -> Result<HeartbeatOutcome, ScriptError> {
    let keys = vec![instance_key.to_string(), gossip_key.to_string(), leader_current.to_string(), leader_lock.to_string()];
    let args = vec![
        id.to_string(),
        now_iso.to_string(),
        now_ms.to_string(),
        heartbeat_timeout_secs.to_string(),
        lease_secs.to_string(),
    ];
    let v = catalog::invoke(store, system_heartbeat::NAME, system_heartbeat::SOURCE, &keys, &args).await?;
    Ok(HeartbeatOutcome { is_leader: v.get("isLeader").and_then(|b| b.as_bool()).unwrap_or(false) })
}

pub struct ReassignFailedOutcome {
    pub reassigned: u64,
}

/// `healthy_worker_ids` is resolved by the caller (instance registry lookup
/// filtered to healthy, task-capable instances) — see `task_reassign_failed.lua`.
pub async fn reassign_failed(
    store: &dyn StoreAdapter,
    failed_queue: &str,
    instance_key: &str,
    redistributed_key: &str,
    now_iso: &str,
    healthy_worker_ids: &[String],
) -> Result<ReassignFailedOutcome, ScriptError> {
    let keys = vec![failed_queue.to_string(), instance_key.to_string(), redistributed_key.to_string()];
    let healthy_json = serde_json::to_string(healthy_worker_ids).unwrap_or_else(|_| "[]".to_string());
    let args = vec![now_iso.to_string(), healthy_json];
    let v = catalog::invoke(store, task_reassign_failed::NAME, task_reassign_failed::SOURCE, &keys, &args).await?;
    Ok(ReassignFailedOutcome { reassigned: v.get("reassigned").and_then(|r| r.as_u64()).unwrap_or(0) })
}

#[cfg(test)]
#[path = "system_tests.rs"]
mod tests;
