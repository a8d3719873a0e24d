// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Instance registration, heartbeat/lease renewal, and the health sweep
//! (spec.md §4.4), generic over the store and clock the same way
//! `cb-tasks::TaskService` is.

use crate::convert::instance_from_fields;
use crate::error::InstanceError;
use cb_core::{Clock, Instance, InstanceHealth, Keys};
use cb_store::StoreAdapter;
use std::collections::HashMap;

pub struct RegisterOutcome {
    pub became_leader: bool,
}

pub struct HeartbeatOutcome {
    pub is_leader: bool,
}

/// Result of one `system.check_health` sweep (spec.md §6 operation surface).
pub struct CheckHealthOutcome {
    pub healthy: Vec<String>,
    pub failed: Vec<String>,
    /// `workerId -> number of tasks redistributed` for each instance this
    /// sweep just marked unhealthy.
    pub reassigned: HashMap<String, u64>,
}

pub struct InstanceService<S, C> {
    store: S,
    clock: C,
    keys: Keys,
    heartbeat_timeout_secs: u64,
    lease_secs: u64,
}

impl<S, C> InstanceService<S, C>
where
    S: StoreAdapter,
    C: Clock,
{
    pub fn new(store: S, clock: C, heartbeat_timeout_ms: u64, lease_ms: u64) -> Self {
        Self {
            store,
            clock,
            keys: Keys,
            heartbeat_timeout_secs: heartbeat_timeout_ms.div_ceil(1000),
            lease_secs: lease_ms.div_ceil(1000),
        }
    }

    /// `system.register(id, roles[])` (spec.md §4.4). Role-index and
    /// capability-set membership are maintained outside the atomic script
    /// (non-atomic but idempotent: `SADD` of an unbounded, caller-supplied
    /// role list can't be expressed as fixed `KEYS[]` slots).
    pub async fn register(&self, id: &str, roles: &[String]) -> Result<RegisterOutcome, InstanceError> {
        let now_ms = self.clock.epoch_ms();
        let now_iso = iso_now(now_ms);
        let roles_json = serde_json::to_string(roles).unwrap_or_else(|_| "[]".to_string());
        let outcome = cb_scripts::system::register(
            &self.store,
            &self.keys.instance(id),
            &self.keys.instances_active(),
            &self.keys.leader_current(),
            &self.keys.leader_lock(),
            id,
            &roles_json,
            &now_iso,
            now_ms as i64,
            self.heartbeat_timeout_secs,
            self.lease_secs,
        )
        .await?;

        for role in roles {
            self.store.sadd(&self.keys.role_index(role), id).await?;
        }
        self.store.sadd(&self.keys.capabilities(id), &format!("instance-{id}")).await?;

        Ok(RegisterOutcome { became_leader: outcome.became_leader })
    }

    /// `system.heartbeat(id)` (spec.md §4.4).
    pub async fn heartbeat(&self, id: &str) -> Result<HeartbeatOutcome, InstanceError> {
        let now_ms = self.clock.epoch_ms();
        let now_iso = iso_now(now_ms);
        let outcome = cb_scripts::system::heartbeat(
            &self.store,
            &self.keys.instance(id),
            &self.keys.gossip_health(),
            &self.keys.leader_current(),
            &self.keys.leader_lock(),
            id,
            &now_iso,
            now_ms as i64,
            self.heartbeat_timeout_secs,
            self.lease_secs,
        )
        .await?;
        Ok(HeartbeatOutcome { is_leader: outcome.is_leader })
    }

    pub async fn get(&self, id: &str) -> Result<Instance, InstanceError> {
        let fields = self.store.hgetall(&self.keys.instance(id)).await?;
        instance_from_fields(&fields)
    }

    /// `system.check_health()` (spec.md §4.4): classifies every instance in
    /// `instances:active` against `heartbeat_timeout_ms`; unhealthy
    /// instances are handed to `task.reassign_failed`.
    pub async fn check_health(&self) -> Result<CheckHealthOutcome, InstanceError> {
        let active_ids = self.store.smembers(&self.keys.instances_active()).await?;
        let now_ms = self.clock.epoch_ms();
        let heartbeat_timeout_ms = self.heartbeat_timeout_secs * 1000;

        let mut healthy = Vec::new();
        let mut unhealthy = Vec::new();
        for id in &active_ids {
            let fields = self.store.hgetall(&self.keys.instance(id)).await?;
            if fields.is_empty() {
                unhealthy.push(id.clone());
                continue;
            }
            let instance = instance_from_fields(&fields)?;
            match InstanceHealth::classify(now_ms.saturating_sub(instance.last_seen_ms), heartbeat_timeout_ms) {
                InstanceHealth::Healthy | InstanceHealth::Degraded => healthy.push(id.clone()),
                InstanceHealth::Unhealthy => unhealthy.push(id.clone()),
            }
        }

        let mut reassigned = HashMap::new();
        for worker_id in &unhealthy {
            let now_iso = iso_now(now_ms);
            let outcome = cb_scripts::system::reassign_failed(
                &self.store,
                &self.keys.worker_queue(worker_id),
                &self.keys.instance(worker_id),
                &self.keys.redistributed_from(worker_id),
                &now_iso,
                &healthy,
            )
            .await?;
            self.store.srem(&self.keys.instances_active(), worker_id).await?;
            reassigned.insert(worker_id.clone(), outcome.reassigned);
        }

        Ok(CheckHealthOutcome { healthy, failed: unhealthy, reassigned })
    }
}

/// An RFC 3339 timestamp derived from the clock's epoch reading, not wall
/// time, so `FakeClock`-driven tests see a deterministic string.
fn iso_now(epoch_ms: u64) -> String {
    chrono::DateTime::<chrono::Utc>::from_timestamp_millis(epoch_ms as i64)
        .unwrap_or_default()
        .to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
