// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed wrappers over the `task_*` scripts. Replies carry the task's raw
//! store-hash fields (camelCase, as written by the Lua/native scripts)
//! rather than [`cb_core::Task`] directly — `cb-tasks` owns translating
//! store-hash shape into the domain type.

use crate::catalog::{self, task_auto_assign, task_claim, task_complete, task_create, task_delete, task_reassign, task_update};
use crate::error::ScriptError;
use cb_store::StoreAdapter;
use std::collections::HashMap;

pub struct CreateOutcome {
    pub id: String,
    pub status: String,
    pub priority: String,
    pub created_at: String,
}

#[allow(clippy::too_many_arguments)]
pub async fn create(
    store: &dyn StoreAdapter,
    task_key: &str,
    pending_zset: &str,
    metrics_queues: &str,
    id: &str,
    text: &str,
    priority: u8,
    metadata_json: &str,
    now_iso: &str,
    now_ms: i64,
) -> Result<CreateOutcome, ScriptError> {
    let keys = vec![task_key.to_string(), pending_zset.to_string(), metrics_queues.to_string()];
    let args = vec![
        id.to_string(),
        text.to_string(),
        priority.to_string(),
        metadata_json.to_string(),
        now_iso.to_string(),
        now_ms.to_string(),
    ];
    let v = catalog::invoke(store, task_create::NAME, task_create::SOURCE, &keys, &args).await?;
    Ok(CreateOutcome {
        id: str_field(&v, "id"),
        status: str_field(&v, "status"),
        priority: str_field(&v, "priority"),
        created_at: str_field(&v, "createdAt"),
    })
}

pub struct ClaimOutcome {
    pub claimed: bool,
    pub task_id: Option<String>,
    pub task: Option<HashMap<String, String>>,
}

#[allow(clippy::too_many_arguments)]
pub async fn claim(
    store: &dyn StoreAdapter,
    pending_zset: &str,
    worker_queue: &str,
    assignments_history: &str,
    metrics_instance: &str,
    worker_id: &str,
    now_iso: &str,
    now_ms: i64,
    max_attempts: u32,
) -> Result<ClaimOutcome, ScriptError> {
    let keys = vec![
        pending_zset.to_string(),
        worker_queue.to_string(),
        assignments_history.to_string(),
        metrics_instance.to_string(),
    ];
    let args = vec![worker_id.to_string(), now_iso.to_string(), now_ms.to_string(), max_attempts.to_string()];
    let v = catalog::invoke(store, task_claim::NAME, task_claim::SOURCE, &keys, &args).await?;
    let claimed = v.get("claimed").and_then(|c| c.as_bool()).unwrap_or(false);
    if !claimed {
        return Ok(ClaimOutcome { claimed: false, task_id: None, task: None });
    }
    Ok(ClaimOutcome {
        claimed: true,
        task_id: Some(str_field(&v, "taskId")),
        task: v.get("task").and_then(|t| t.as_object()).map(|m| {
            m.iter().map(|(k, val)| (k.clone(), val.as_str().unwrap_or_default().to_string())).collect()
        }),
    })
}

pub struct UpdateOutcome {
    pub task: HashMap<String, String>,
}

pub async fn update(
    store: &dyn StoreAdapter,
    task_key: &str,
    pending_zset: &str,
    updates_json: &str,
    now_iso: &str,
) -> Result<UpdateOutcome, ScriptError> {
    let keys = vec![task_key.to_string(), pending_zset.to_string()];
    let args = vec![updates_json.to_string(), now_iso.to_string()];
    let v = catalog::invoke(store, task_update::NAME, task_update::SOURCE, &keys, &args).await?;
    let task = v
        .get("task")
        .and_then(|t| t.as_object())
        .map(|m| m.iter().map(|(k, val)| (k.clone(), val.as_str().unwrap_or_default().to_string())).collect())
        .unwrap_or_default();
    Ok(UpdateOutcome { task })
}

pub struct CompleteOutcome {
    pub id: String,
    pub status: String,
    pub completed_at: String,
}

#[allow(clippy::too_many_arguments)]
pub async fn complete(
    store: &dyn StoreAdapter,
    task_key: &str,
    worker_queue: &str,
    completions_history: &str,
    metrics_instance: &str,
    metrics_queues: &str,
    result_json: &str,
    error: &str,
    now_iso: &str,
    now_ms: i64,
) -> Result<CompleteOutcome, ScriptError> {
    let keys = vec![
        task_key.to_string(),
        worker_queue.to_string(),
        completions_history.to_string(),
        metrics_instance.to_string(),
        metrics_queues.to_string(),
    ];
    let args = vec![result_json.to_string(), error.to_string(), now_iso.to_string(), now_ms.to_string()];
    let v = catalog::invoke(store, task_complete::NAME, task_complete::SOURCE, &keys, &args).await?;
    Ok(CompleteOutcome { id: str_field(&v, "id"), status: str_field(&v, "status"), completed_at: str_field(&v, "completedAt") })
}

pub struct ReassignOutcome {
    pub to: String,
}

pub async fn reassign(
    store: &dyn StoreAdapter,
    task_key: &str,
    pending_zset: &str,
    current_worker_queue: &str,
    target_worker_queue: &str,
    target: &str,
    reason: &str,
    now_iso: &str,
) -> Result<ReassignOutcome, ScriptError> {
    let keys = vec![
        task_key.to_string(),
        pending_zset.to_string(),
        current_worker_queue.to_string(),
        target_worker_queue.to_string(),
    ];
    let args = vec![target.to_string(), reason.to_string(), now_iso.to_string()];
    let v = catalog::invoke(store, task_reassign::NAME, task_reassign::SOURCE, &keys, &args).await?;
    Ok(ReassignOutcome { to: str_field(&v, "to") })
}

pub struct DeleteOutcome {
    pub id: String,
    pub deleted_at: String,
}

pub async fn delete(
    store: &dyn StoreAdapter,
    task_key: &str,
    pending_zset: &str,
    worker_queue: &str,
    now_iso: &str,
) -> Result<DeleteOutcome, ScriptError> {
    let keys = vec![task_key.to_string(), pending_zset.to_string()];
    let args = vec![worker_queue.to_string(), now_iso.to_string()];
    let v = catalog::invoke(store, task_delete::NAME, task_delete::SOURCE, &keys, &args).await?;
    Ok(DeleteOutcome { id: str_field(&v, "id"), deleted_at: str_field(&v, "deletedAt") })
}

pub struct AutoAssignOutcome {
    pub assigned: bool,
    pub task_id: Option<String>,
}

pub async fn auto_assign(
    store: &dyn StoreAdapter,
    pending_zset: &str,
    worker_queue: &str,
    worker_id: &str,
    now_iso: &str,
    now_ms: i64,
    capacity: u32,
) -> Result<AutoAssignOutcome, ScriptError> {
    let keys = vec![pending_zset.to_string(), worker_queue.to_string()];
    let args = vec![worker_id.to_string(), now_iso.to_string(), now_ms.to_string(), capacity.to_string()];
    let v = catalog::invoke(store, task_auto_assign::NAME, task_auto_assign::SOURCE, &keys, &args).await?;
    let assigned = v.get("assigned").and_then(|a| a.as_bool()).unwrap_or(false);
    Ok(AutoAssignOutcome { assigned, task_id: assigned.then(|| str_field(&v, "taskId")) })
}

fn str_field(v: &serde_json::Value, field: &str) -> String {
    v.get(field).and_then(|f| f.as_str()).unwrap_or_default().to_string()
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
