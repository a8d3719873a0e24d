// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Native mirrors of the Lua assets in `cb-scripts/lua/*.lua`, dispatched
//! by name for [`crate::fake::FakeStore`]. Each arm is written against
//! [`StoreAdapter`]'s own methods so the keyspace stays a single, faithful
//! in-memory model; only the control flow that a real `EVAL` would run
//! server-side is reimplemented here in Rust instead of Lua.
//!
//! Key/arg positions in every arm match the corresponding `.lua` file
//! exactly — see `cb-scripts`'s module docs for the contract table.

use crate::adapter::StoreAdapter;
use crate::error::StoreError;
use crate::fake::FakeStore;
use serde_json::json;

pub async fn dispatch(
    store: &FakeStore,
    name: &'static str,
    keys: &[String],
    args: &[String],
) -> Result<String, StoreError> {
    match name {
        "task_create" => task_create(store, keys, args).await,
        "task_claim" => task_claim(store, keys, args).await,
        "task_update" => task_update(store, keys, args).await,
        "task_complete" => task_complete(store, keys, args).await,
        "task_reassign" => task_reassign(store, keys, args).await,
        "task_delete" => task_delete(store, keys, args).await,
        "task_auto_assign" => task_auto_assign(store, keys, args).await,
        "system_register" => system_register(store, keys, args).await,
        "system_heartbeat" => system_heartbeat(store, keys, args).await,
        "task_reassign_failed" => task_reassign_failed(store, keys, args).await,
        "event_is_duplicate" => event_is_duplicate(store, keys, args).await,
        "event_add_to_partition" => event_add_to_partition(store, keys, args).await,
        "metrics_aggregate" => metrics_aggregate(store, keys, args).await,
        "state_sync" => state_sync(store, keys, args).await,
        other => Err(StoreError::Script {
            name: other.to_string(),
            detail: "no fake handler registered".to_string(),
        }),
    }
}

fn task_key(id: &str) -> String {
    format!("cb:task:{id}")
}

async fn hgetall_task(store: &FakeStore, id: &str) -> std::collections::HashMap<String, String> {
    store.hgetall(&task_key(id)).await.unwrap_or_default()
}

async fn task_create(
    store: &FakeStore,
    keys: &[String],
    args: &[String],
) -> Result<String, StoreError> {
    let (task_k, pending_zset, metrics_queues) = (&keys[0], &keys[1], &keys[2]);
    let (id, text, priority, metadata, created_at, created_at_ms) =
        (&args[0], &args[1], &args[2], &args[3], &args[4], &args[5]);

    if store.exists(task_k).await? {
        return Ok(json!({"ok": 0, "error": "exists"}).to_string());
    }
    store.hset(task_k, "id", id).await?;
    store.hset(task_k, "text", text).await?;
    store.hset(task_k, "priority", priority).await?;
    store.hset(task_k, "status", "pending").await?;
    store.hset(task_k, "metadata", metadata).await?;
    store.hset(task_k, "createdAt", created_at).await?;
    store.hset(task_k, "createdAtMs", created_at_ms).await?;
    store.hset(task_k, "updatedAt", created_at).await?;
    store.hset(task_k, "deny", "[]").await?;
    let priority_f: f64 = priority.parse().unwrap_or(50.0);
    store.zadd(pending_zset, id, -priority_f).await?;
    store.hincrby(metrics_queues, "totalTasks", 1).await?;
    store.hincrby(metrics_queues, "pendingTasks", 1).await?;
    Ok(json!({"ok": 1, "id": id, "status": "pending", "priority": priority, "createdAt": created_at})
        .to_string())
}

async fn task_claim(
    store: &FakeStore,
    keys: &[String],
    args: &[String],
) -> Result<String, StoreError> {
    let (pending_zset, worker_queue, history, metrics_instance) =
        (&keys[0], &keys[1], &keys[2], &keys[3]);
    let (worker_id, now_iso, now_ms, max_attempts) =
        (&args[0], &args[1], &args[2], args[3].parse::<i64>().unwrap_or(10));

    let candidates = store.zrange(pending_zset, 0, (max_attempts - 1).max(0)).await?;
    for candidate in candidates {
        let tkey = task_key(&candidate);
        let status = store.hget(&tkey, "status").await?;
        if status.as_deref() != Some("pending") {
            store.zrem(pending_zset, &candidate).await?;
            continue;
        }
        let deny_raw = store.hget(&tkey, "deny").await?.unwrap_or_else(|| "[]".to_string());
        let deny: Vec<String> = serde_json::from_str(&deny_raw).unwrap_or_default();
        if deny.iter().any(|w| w == worker_id) {
            continue;
        }
        store.zrem(pending_zset, &candidate).await?;
        store.hset(&tkey, "assignedTo", worker_id).await?;
        store.hset(&tkey, "assignedAt", now_iso).await?;
        store.hset(&tkey, "updatedAt", now_iso).await?;
        store.rpush(worker_queue, &candidate).await?;
        store
            .rpush(
                history,
                &json!({"taskId": candidate, "workerId": worker_id, "at": now_iso, "atMs": now_ms})
                    .to_string(),
            )
            .await?;
        store.hincrby(metrics_instance, "tasksClaimed", 1).await?;
        let task = hgetall_task(store, &candidate).await;
        return Ok(json!({"ok": 1, "claimed": true, "taskId": candidate, "task": task}).to_string());
    }
    Ok(json!({"ok": 1, "claimed": false}).to_string())
}

async fn task_update(
    store: &FakeStore,
    keys: &[String],
    args: &[String],
) -> Result<String, StoreError> {
    let (task_k, pending_zset) = (&keys[0], &keys[1]);
    let (updates_json, now_iso) = (&args[0], &args[1]);

    if !store.exists(task_k).await? {
        return Ok(json!({"ok": 0, "error": "not_found"}).to_string());
    }
    let updates: serde_json::Value =
        serde_json::from_str(updates_json).map_err(|e| StoreError::MalformedReply(e.to_string()))?;
    let current_status = store.hget(task_k, "status").await?.unwrap_or_default();

    if let Some(new_status) = updates.get("status").and_then(|v| v.as_str()) {
        if current_status == "completed" && new_status != "completed" {
            return Ok(json!({"ok": 0, "error": "already_completed"}).to_string());
        }
        store.hset(task_k, "status", new_status).await?;
    }
    if let Some(text) = updates.get("text").and_then(|v| v.as_str()) {
        store.hset(task_k, "text", text).await?;
    }
    if let Some(metadata) = updates.get("metadata") {
        store.hset(task_k, "metadata", &metadata.to_string()).await?;
    }
    if let Some(priority) = updates.get("priority").and_then(|v| v.as_u64()) {
        store.hset(task_k, "priority", &priority.to_string()).await?;
        if current_status == "pending" {
            let id = store.hget(task_k, "id").await?.unwrap_or_default();
            store.zadd(pending_zset, &id, -(priority as f64)).await?;
        }
    }
    store.hset(task_k, "updatedAt", now_iso).await?;
    let task = store.hgetall(task_k).await?;
    Ok(json!({"ok": 1, "task": task}).to_string())
}

async fn task_complete(
    store: &FakeStore,
    keys: &[String],
    args: &[String],
) -> Result<String, StoreError> {
    let (task_k, worker_queue, completions_history, metrics_instance, metrics_queues) =
        (&keys[0], &keys[1], &keys[2], &keys[3], &keys[4]);
    let (result, error, now_iso, now_ms) = (&args[0], &args[1], &args[2], &args[3]);

    if !store.exists(task_k).await? {
        return Ok(json!({"ok": 0, "error": "not_found"}).to_string());
    }
    let status = store.hget(task_k, "status").await?.unwrap_or_default();
    if status == "completed" {
        return Ok(json!({"ok": 0, "error": "already_completed"}).to_string());
    }
    if status != "in_progress" {
        return Ok(json!({"ok": 0, "error": "not_assigned"}).to_string());
    }
    let new_status = if error.is_empty() { "completed" } else { "failed" };
    let created_at_ms: u64 = store.hget(task_k, "createdAtMs").await?.and_then(|v| v.parse().ok()).unwrap_or(0);
    let now_ms_n: u64 = now_ms.parse().unwrap_or(0);
    let duration = now_ms_n.saturating_sub(created_at_ms);

    store.hset(task_k, "status", new_status).await?;
    store.hset(task_k, "completedAt", now_iso).await?;
    store.hset(task_k, "duration", &duration.to_string()).await?;
    store.hset(task_k, "updatedAt", now_iso).await?;
    if !result.is_empty() {
        store.hset(task_k, "result", result).await?;
    }
    if !error.is_empty() {
        store.hset(task_k, "error", error).await?;
    }
    let task_id = store.hget(task_k, "id").await?.unwrap_or_default();
    store.lrem(worker_queue, 0, &task_id).await?;
    store
        .rpush(
            completions_history,
            &json!({"taskId": task_id, "status": new_status, "at": now_iso}).to_string(),
        )
        .await?;
    if new_status == "completed" {
        store.hincrby(metrics_instance, "tasksCompleted", 1).await?;
        store.hincrby(metrics_queues, "completedTasks", 1).await?;
    } else {
        store.hincrby(metrics_instance, "tasksFailed", 1).await?;
        store.hincrby(metrics_queues, "failedTasks", 1).await?;
    }
    store.hincrby(metrics_queues, "pendingInProgress", -1).await?;
    Ok(json!({"ok": 1, "id": task_id, "status": new_status, "completedAt": now_iso}).to_string())
}

async fn task_reassign(
    store: &FakeStore,
    keys: &[String],
    args: &[String],
) -> Result<String, StoreError> {
    let (task_k, pending_zset, current_worker_queue, target_worker_queue) =
        (&keys[0], &keys[1], &keys[2], &keys[3]);
    let (target, reason, now_iso) = (&args[0], &args[1], &args[2]);

    if !store.exists(task_k).await? {
        return Ok(json!({"ok": 0, "error": "not_found"}).to_string());
    }
    let task_id = store.hget(task_k, "id").await?.unwrap_or_default();
    let assigned_to = store.hget(task_k, "assignedTo").await?.unwrap_or_default();
    if !assigned_to.is_empty() {
        let deny_raw = store.hget(task_k, "deny").await?.unwrap_or_else(|| "[]".to_string());
        let mut deny: Vec<String> = serde_json::from_str(&deny_raw).unwrap_or_default();
        if !deny.iter().any(|w| w == &assigned_to) {
            deny.push(assigned_to.clone());
        }
        store.hset(task_k, "deny", &serde_json::to_string(&deny).unwrap_or_default()).await?;
        store.lrem(current_worker_queue, 0, &task_id).await?;
    }

    let deny_raw = store.hget(task_k, "deny").await?.unwrap_or_else(|| "[]".to_string());
    let deny: Vec<String> = serde_json::from_str(&deny_raw).unwrap_or_default();
    let to = if !target.is_empty() && !deny.iter().any(|w| w == target) {
        store.hset(task_k, "assignedTo", target).await?;
        store.hset(task_k, "status", "in_progress").await?;
        store.rpush(target_worker_queue, &task_id).await?;
        target.clone()
    } else {
        let priority: f64 = store.hget(task_k, "priority").await?.and_then(|v| v.parse().ok()).unwrap_or(50.0);
        store.hset(task_k, "assignedTo", "").await?;
        store.hset(task_k, "status", "pending").await?;
        store.zadd(pending_zset, &task_id, -priority).await?;
        "global".to_string()
    };
    store.hset(task_k, "reassignedAt", now_iso).await?;
    store.hset(task_k, "reassignReason", reason).await?;
    store.hset(task_k, "updatedAt", now_iso).await?;
    Ok(json!({"ok": 1, "to": to}).to_string())
}

async fn task_delete(
    store: &FakeStore,
    keys: &[String],
    args: &[String],
) -> Result<String, StoreError> {
    let (task_k, pending_zset) = (&keys[0], &keys[1]);
    let worker_queue = args.get(0).filter(|s| !s.is_empty());
    let now_iso = &args[1];

    if !store.exists(task_k).await? {
        return Ok(json!({"ok": 0, "error": "not_found"}).to_string());
    }
    let task_id = store.hget(task_k, "id").await?.unwrap_or_default();
    store.zrem(pending_zset, &task_id).await?;
    if let Some(wq) = worker_queue {
        store.lrem(wq, 0, &task_id).await?;
    }
    store.del(task_k).await?;
    Ok(json!({"ok": 1, "id": task_id, "deletedAt": now_iso}).to_string())
}

async fn task_auto_assign(
    store: &FakeStore,
    keys: &[String],
    args: &[String],
) -> Result<String, StoreError> {
    let (pending_zset, worker_queue) = (&keys[0], &keys[1]);
    let (worker_id, now_iso, _now_ms, capacity) =
        (&args[0], &args[1], &args[2], args[3].parse::<i64>().unwrap_or(10));

    if store.llen(worker_queue).await? >= capacity {
        return Ok(json!({"ok": 0, "error": "at_capacity"}).to_string());
    }
    let candidates = store.zrange(pending_zset, 0, -1).await?;
    for candidate in candidates {
        let tkey = task_key(&candidate);
        let deny_raw = store.hget(&tkey, "deny").await?.unwrap_or_else(|| "[]".to_string());
        let deny: Vec<String> = serde_json::from_str(&deny_raw).unwrap_or_default();
        if deny.iter().any(|w| w == worker_id) {
            continue;
        }
        store.zrem(pending_zset, &candidate).await?;
        store.hset(&tkey, "assignedTo", worker_id).await?;
        store.hset(&tkey, "status", "in_progress").await?;
        store.hset(&tkey, "assignedAt", now_iso).await?;
        store.hset(&tkey, "updatedAt", now_iso).await?;
        store.rpush(worker_queue, &candidate).await?;
        return Ok(json!({"ok": 1, "assigned": true, "taskId": candidate}).to_string());
    }
    Ok(json!({"ok": 1, "assigned": false}).to_string())
}

async fn system_register(
    store: &FakeStore,
    keys: &[String],
    args: &[String],
) -> Result<String, StoreError> {
    let (instance_k, active_set, leader_current, leader_lock) =
        (&keys[0], &keys[1], &keys[2], &keys[3]);
    let (id, roles_json, now_iso, now_ms, hb_timeout_secs, lease_secs) =
        (&args[0], &args[1], &args[2], &args[3], args[4].parse::<u64>().unwrap_or(30), args[5].parse::<u64>().unwrap_or(30));

    store.hset(instance_k, "id", id).await?;
    store.hset(instance_k, "roles", roles_json).await?;
    store.hset(instance_k, "health", "healthy").await?;
    store.hset(instance_k, "status", "active").await?;
    store.hset(instance_k, "lastSeenMs", now_ms).await?;
    store.hset(instance_k, "lastHeartbeat", now_iso).await?;
    store.expire(instance_k, hb_timeout_secs).await?;
    store.sadd(active_set, id).await?;

    let became_leader = if !store.exists(leader_current).await? {
        if store.set_nx_ex(leader_lock, id, lease_secs).await? {
            store.set_ex(leader_current, id, lease_secs).await?;
            true
        } else {
            false
        }
    } else {
        false
    };
    Ok(json!({"ok": 1, "becameLeader": became_leader}).to_string())
}

async fn system_heartbeat(
    store: &FakeStore,
    keys: &[String],
    args: &[String],
) -> Result<String, StoreError> {
    let (instance_k, gossip_key, leader_current, leader_lock) =
        (&keys[0], &keys[1], &keys[2], &keys[3]);
    let (id, now_iso, now_ms, hb_timeout_secs, lease_secs) =
        (&args[0], &args[1], &args[2], args[3].parse::<u64>().unwrap_or(30), args[4].parse::<u64>().unwrap_or(30));

    if !store.exists(instance_k).await? {
        return Ok(json!({"ok": 0, "error": "not_registered"}).to_string());
    }
    store.hset(instance_k, "lastSeenMs", now_ms).await?;
    store.hset(instance_k, "lastHeartbeat", now_iso).await?;
    store.hset(instance_k, "health", "healthy").await?;
    store.expire(instance_k, hb_timeout_secs).await?;
    store
        .hset(gossip_key, id, &json!({"status": "healthy", "lastSeen": now_ms}).to_string())
        .await?;

    let is_leader = store.get(leader_current).await?.as_deref() == Some(id.as_str());
    if is_leader {
        store.set_ex(leader_current, id, lease_secs).await?;
        store.set_ex(leader_lock, id, lease_secs).await?;
    }
    Ok(json!({"ok": 1, "isLeader": is_leader}).to_string())
}

async fn task_reassign_failed(
    store: &FakeStore,
    keys: &[String],
    args: &[String],
) -> Result<String, StoreError> {
    let (failed_queue, instance_k, redistributed_key) = (&keys[0], &keys[1], &keys[2]);
    let (now_iso, healthy_workers_json) = (&args[0], &args[1]);

    if store.exists(instance_k).await? {
        store.hset(instance_k, "status", "offline").await?;
        store.hset(instance_k, "health", "unhealthy").await?;
    }
    let healthy: Vec<String> = serde_json::from_str(healthy_workers_json).unwrap_or_default();
    let orphaned = store.lrange(failed_queue, 0, -1).await?;
    let mut reassigned = 0usize;
    if !healthy.is_empty() {
        for (i, task_id) in orphaned.iter().enumerate() {
            let target = &healthy[i % healthy.len()];
            let target_queue = format!("cb:queue:instance:{target}");
            store.rpush(&target_queue, task_id).await?;
            store.hset(&task_key(task_id), "assignedTo", target).await?;
            store.hset(&task_key(task_id), "updatedAt", now_iso).await?;
            store
                .rpush(
                    redistributed_key,
                    &json!({"taskId": task_id, "to": target, "at": now_iso}).to_string(),
                )
                .await?;
            reassigned += 1;
        }
    }
    store.del(failed_queue).await?;
    Ok(json!({"ok": 1, "reassigned": reassigned}).to_string())
}

async fn event_is_duplicate(
    store: &FakeStore,
    keys: &[String],
    args: &[String],
) -> Result<String, StoreError> {
    let processed_set = &keys[0];
    let (event_id, ttl_secs) = (&args[0], args[1].parse::<u64>().unwrap_or(86_400));

    if store.sismember(processed_set, event_id).await? {
        return Ok(json!({"ok": 1, "duplicate": true}).to_string());
    }
    store.sadd(processed_set, event_id).await?;
    store.expire(processed_set, ttl_secs).await?;
    Ok(json!({"ok": 1, "duplicate": false}).to_string())
}

async fn event_add_to_partition(
    store: &FakeStore,
    keys: &[String],
    args: &[String],
) -> Result<String, StoreError> {
    let partition_key = &keys[0];
    let (event_json, max_len, ttl_secs) =
        (&args[0], args[1].parse::<i64>().unwrap_or(1000), args[2].parse::<u64>().unwrap_or(3600));

    store.rpush(partition_key, event_json).await?;
    store.ltrim(partition_key, -max_len, -1).await?;
    store.expire(partition_key, ttl_secs).await?;
    Ok(json!({"ok": 1}).to_string())
}

async fn hget_u64(store: &FakeStore, key: &str, field: &str) -> Result<u64, StoreError> {
    Ok(store.hget(key, field).await?.and_then(|v| v.parse::<u64>().ok()).unwrap_or(0))
}

async fn metrics_aggregate(store: &FakeStore, keys: &[String], args: &[String]) -> Result<String, StoreError> {
    let (queues_key, active_set, global_key, scaling_key) = (&keys[0], &keys[1], &keys[2], &keys[3]);
    let now_iso = &args[0];

    let total_tasks = hget_u64(store, queues_key, "totalTasks").await?;
    let pending_tasks = hget_u64(store, queues_key, "pendingTasks").await?;
    let tasks_completed = hget_u64(store, queues_key, "tasksCompleted").await?;
    let active_instances = store.smembers(active_set).await?.len() as u64;

    store.hset(global_key, "totalTasks", &total_tasks.to_string()).await?;
    store.hset(global_key, "pendingTasks", &pending_tasks.to_string()).await?;
    store.hset(global_key, "tasksCompleted", &tasks_completed.to_string()).await?;
    store.hset(global_key, "activeInstances", &active_instances.to_string()).await?;
    store.hset(global_key, "updatedAt", now_iso).await?;

    let pending_per_instance =
        if active_instances > 0 { pending_tasks as f64 / active_instances as f64 } else { pending_tasks as f64 };
    store.hset(scaling_key, "pendingPerInstance", &pending_per_instance.to_string()).await?;
    store.hset(scaling_key, "updatedAt", now_iso).await?;

    Ok(json!({"ok": 1}).to_string())
}

async fn state_sync(store: &FakeStore, keys: &[String], args: &[String]) -> Result<String, StoreError> {
    let (tasks_set, active_set, state_key) = (&keys[0], &keys[1], &keys[2]);
    let now_iso = &args[0];

    let task_count = store.smembers(tasks_set).await?.len();
    let instance_count = store.smembers(active_set).await?.len();
    let version = hget_u64(store, state_key, "version").await? + 1;
    let data = json!({"taskCount": task_count, "instanceCount": instance_count}).to_string();

    store.hset(state_key, "data", &data).await?;
    store.hset(state_key, "version", &version.to_string()).await?;
    store.hset(state_key, "timestamp", now_iso).await?;

    Ok(json!({"ok": 1, "version": version}).to_string())
}
