// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `system.*` handlers (spec.md §6 External Interfaces): instance
//! registration/heartbeat/health plus the read-only aggregated snapshots.

use crate::dyn_adapters::{DynClock, DynStore};
use async_trait::async_trait;
use cb_core::{CbError, Keys};
use cb_instance::InstanceService;
use cb_runtime::{EventContext, Handler};
use cb_store::StoreAdapter;
use serde_json::{json, Value};
use std::sync::Arc;

fn str_field(params: &Value, name: &str) -> Result<String, CbError> {
    params
        .get(name)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| CbError::invalid_params(name, format!("missing field `{name}`")))
}

pub struct Register(pub Arc<InstanceService<DynStore, DynClock>>);

#[async_trait]
impl Handler for Register {
    async fn call(&self, params: Value, _ctx: &EventContext) -> Result<Value, CbError> {
        let id = str_field(&params, "id")?;
        let roles: Vec<String> = params
            .get("roles")
            .and_then(Value::as_array)
            .map(|values| values.iter().filter_map(Value::as_str).map(str::to_string).collect())
            .unwrap_or_default();
        let outcome = self.0.register(&id, &roles).await.map_err(CbError::from)?;
        Ok(json!({"ok": true, "becameLeader": outcome.became_leader}))
    }
}

pub struct Heartbeat(pub Arc<InstanceService<DynStore, DynClock>>);

#[async_trait]
impl Handler for Heartbeat {
    async fn call(&self, params: Value, _ctx: &EventContext) -> Result<Value, CbError> {
        let id = params
            .get("instanceId")
            .or_else(|| params.get("id"))
            .and_then(Value::as_str)
            .ok_or_else(|| CbError::invalid_params("instanceId", "missing field `instanceId`"))?;
        let outcome = self.0.heartbeat(id).await.map_err(CbError::from)?;
        Ok(json!({"ok": true, "isLeader": outcome.is_leader}))
    }
}

pub struct CheckHealth(pub Arc<InstanceService<DynStore, DynClock>>);

#[async_trait]
impl Handler for CheckHealth {
    async fn call(&self, _params: Value, _ctx: &EventContext) -> Result<Value, CbError> {
        let outcome = self.0.check_health().await.map_err(CbError::from)?;
        Ok(json!({"healthy": outcome.healthy, "failed": outcome.failed, "reassigned": outcome.reassigned}))
    }
}

/// `system.health` (spec.md §6): a liveness summary, not a deep sweep — how
/// many instances are registered and whether this process can reach the
/// store at all.
pub struct Health {
    pub store: Arc<dyn StoreAdapter>,
}

#[async_trait]
impl Handler for Health {
    async fn call(&self, _params: Value, _ctx: &EventContext) -> Result<Value, CbError> {
        let keys = Keys;
        let active = self.store.smembers(&keys.instances_active()).await.map_err(|e| CbError::internal(&e.to_string()))?;
        Ok(json!({"ok": true, "activeInstances": active.len()}))
    }
}

/// `system.get_state` (spec.md §6): the condensed global counters under
/// `cb:state:global`, folded the same way `cb-session` folds per-session
/// state.
pub struct GetState {
    pub store: Arc<dyn StoreAdapter>,
}

#[async_trait]
impl Handler for GetState {
    async fn call(&self, _params: Value, _ctx: &EventContext) -> Result<Value, CbError> {
        let keys = Keys;
        let fields = self.store.hgetall(&keys.state_global()).await.map_err(|e| CbError::internal(&e.to_string()))?;
        Ok(Value::Object(fields.into_iter().map(|(k, v)| (k, Value::String(v))).collect()))
    }
}

/// `system.metrics` (spec.md §6): the raw gauges under `cb:metrics:global`
/// and `cb:metrics:queues`, exposed verbatim — aggregation happens in the
/// `aggregate-metrics` scheduler job, not in this handler.
pub struct Metrics {
    pub store: Arc<dyn StoreAdapter>,
}

#[async_trait]
impl Handler for Metrics {
    async fn call(&self, _params: Value, _ctx: &EventContext) -> Result<Value, CbError> {
        let keys = Keys;
        let global = self.store.hgetall(&keys.metrics_global()).await.map_err(|e| CbError::internal(&e.to_string()))?;
        let queues = self.store.hgetall(&keys.metrics_queues()).await.map_err(|e| CbError::internal(&e.to_string()))?;
        Ok(json!({"global": global, "queues": queues}))
    }
}

/// `aggregate-metrics` (spec.md §4.7, every 5s): folds `metrics:queues` and
/// the active-instance count into `metrics:global`/`metrics:scaling`.
/// Driven by `cb-scheduler`, reached through `Registry::execute` like every
/// other mutation.
pub struct AggregateMetrics {
    pub store: Arc<dyn StoreAdapter>,
}

#[async_trait]
impl Handler for AggregateMetrics {
    async fn call(&self, _params: Value, ctx: &EventContext) -> Result<Value, CbError> {
        let keys = Keys;
        let now_iso = iso_now(ctx.now_ms());
        cb_scripts::metrics::aggregate(
            self.store.as_ref(),
            &keys.metrics_queues(),
            &keys.instances_active(),
            &keys.metrics_global(),
            &keys.metrics_scaling(),
            &now_iso,
        )
        .await
        .map_err(CbError::from)?;
        Ok(json!({"ok": true}))
    }
}

/// `sync-state` (spec.md §4.7, every 10s): snapshots instance+task counts
/// into `state:global` with a bumped, monotonic `version`.
pub struct SyncState {
    pub store: Arc<dyn StoreAdapter>,
}

#[async_trait]
impl Handler for SyncState {
    async fn call(&self, _params: Value, ctx: &EventContext) -> Result<Value, CbError> {
        let keys = Keys;
        let now_iso = iso_now(ctx.now_ms());
        let outcome = cb_scripts::metrics::sync_state(
            self.store.as_ref(),
            &keys.tasks_all(),
            &keys.instances_active(),
            &keys.state_global(),
            &now_iso,
        )
        .await
        .map_err(CbError::from)?;
        Ok(json!({"ok": true, "version": outcome.version}))
    }
}

/// `detect-partitions` (spec.md §4.7, every 5s): reads `gossip:health` and
/// sets the advisory `partition:detected`/`partition:recovery` flags.
pub struct DetectPartitions {
    pub store: Arc<dyn StoreAdapter>,
}

#[async_trait]
impl Handler for DetectPartitions {
    async fn call(&self, _params: Value, _ctx: &EventContext) -> Result<Value, CbError> {
        let keys = Keys;
        let status = cb_instance::detect_partitions(self.store.as_ref(), &keys).await.map_err(|e| CbError::internal(&e.to_string()))?;
        Ok(json!({"detected": status.detected, "recovered": status.recovered}))
    }
}

/// `check-quorum` (spec.md §4.7, every 15s): "reads latest quorum hash;
/// exposed for tests" — the raw gossip view `detect-partitions` computes
/// its advisory flags from, surfaced read-only.
pub struct CheckQuorum {
    pub store: Arc<dyn StoreAdapter>,
}

#[async_trait]
impl Handler for CheckQuorum {
    async fn call(&self, _params: Value, _ctx: &EventContext) -> Result<Value, CbError> {
        let keys = Keys;
        let view = cb_instance::read_gossip_view(self.store.as_ref(), &keys.gossip_health()).await.map_err(|e| CbError::internal(&e.to_string()))?;
        Ok(json!({
            "total": view.total,
            "healthy": view.healthy,
            "partitioned": view.is_partitioned(),
            "recovered": view.is_recovered(),
        }))
    }
}

/// An RFC 3339 timestamp derived from the handler clock reading, not wall
/// time, so scheduler-driven sweeps stay deterministic under `FakeClock`.
fn iso_now(epoch_ms: u64) -> String {
    chrono::DateTime::<chrono::Utc>::from_timestamp_millis(epoch_ms as i64)
        .unwrap_or_default()
        .to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
