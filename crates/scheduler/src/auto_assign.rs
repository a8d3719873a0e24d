// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `auto-assign-delayed` (spec.md §4.7, 2s): "claims tasks older than
//! configurable delay on behalf of idle workers, round-robin." The age
//! gate and round-robin cursor live here because `task_auto_assign.lua`
//! itself is delay-agnostic — a single script can't know the scheduler's
//! configured delay without taking it as yet another parameter the
//! direct-call `task.auto_assign` operation (spec.md §6) doesn't carry.

use crate::keys;
use cb_registry::Registry;
use cb_runtime::CallerMetadata;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::warn;

/// Round-robins across ticks, not within one: each tick considers at most
/// one stale task and advances the cursor by one worker regardless of
/// outcome, so a capacity-full worker doesn't get retried every 2s.
static CURSOR: AtomicUsize = AtomicUsize::new(0);

fn caller() -> CallerMetadata {
    CallerMetadata { instance_id: Some("scheduler".to_string()), session_id: None }
}

pub(crate) async fn run_once(registry: &Registry, delay_ms: u64, capacity: u32) {
    let Some(created_at_ms) = oldest_pending_created_at_ms(registry).await else {
        return;
    };
    let age_ms = registry.now_ms().saturating_sub(created_at_ms);
    if age_ms < delay_ms {
        return;
    }
    let Some(worker_id) = next_idle_worker(registry).await else {
        return;
    };
    let params = json!({"workerId": worker_id, "capacity": capacity});
    if let Err(err) = registry.execute("task.auto_assign", params, caller()).await {
        warn!(error = %err, worker_id, "auto-assign-delayed failed");
    }
}

async fn oldest_pending_created_at_ms(registry: &Registry) -> Option<u64> {
    let params = json!({"status": "pending", "orderBy": "createdAt", "order": "asc", "limit": 1});
    let result = registry.execute("task.list", params, caller()).await.ok()?;
    result.get("tasks")?.as_array()?.first()?.get("createdAtMs")?.as_u64()
}

/// Intersects `role:worker` membership with `instances:active` so a worker
/// that crashed without deregistering is never handed a task, then advances
/// a process-local cursor over the sorted candidate list.
async fn next_idle_worker(registry: &Registry) -> Option<String> {
    let k = keys();
    let store = registry.store();
    let workers = store.smembers(&k.role_index("worker")).await.ok()?;
    let active = store.smembers(&k.instances_active()).await.ok()?;
    let mut candidates: Vec<String> = workers.into_iter().filter(|w| active.contains(w)).collect();
    candidates.sort();
    if candidates.is_empty() {
        return None;
    }
    let idx = CURSOR.fetch_add(1, Ordering::Relaxed) % candidates.len();
    Some(candidates[idx].clone())
}
