// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Instance record and health classification (spec.md §3, §4.4).

use serde::{Deserialize, Serialize};

/// `ACTIVE/healthy`, `ACTIVE/degraded`, or `OFFLINE` (spec.md §4.4 "State machine").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceStatus {
    Active,
    Offline,
}

crate::simple_display! {
    InstanceStatus {
        Active => "active",
        Offline => "offline",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceHealth {
    Healthy,
    Degraded,
    Unhealthy,
}

crate::simple_display! {
    InstanceHealth {
        Healthy => "healthy",
        Degraded => "degraded",
        Unhealthy => "unhealthy",
    }
}

impl InstanceHealth {
    /// Classify staleness against the heartbeat timeout `t_ms` (spec.md
    /// §4.4 "system.check_health"): `< T` healthy, `[T, 2T)` degraded,
    /// `>= 2T` unhealthy.
    pub fn classify(ms_since_last_seen: u64, heartbeat_timeout_ms: u64) -> Self {
        if ms_since_last_seen < heartbeat_timeout_ms {
            InstanceHealth::Healthy
        } else if ms_since_last_seen < heartbeat_timeout_ms * 2 {
            InstanceHealth::Degraded
        } else {
            InstanceHealth::Unhealthy
        }
    }
}

/// An instance record, as stored in the `cb:instance:{id}` hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub id: String,
    pub roles: Vec<String>,
    pub health: InstanceHealth,
    pub status: InstanceStatus,
    pub last_seen_ms: u64,
    pub last_heartbeat: String,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl Instance {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn is_worker(&self) -> bool {
        self.has_role("worker")
    }
}

crate::builder! {
    pub struct InstanceBuilder => Instance {
        into {
            id: String = "w1",
            last_heartbeat: String = "2026-01-01T00:00:00Z",
        }
        set {
            roles: Vec<String> = vec!["worker".to_string()],
            health: InstanceHealth = InstanceHealth::Healthy,
            status: InstanceStatus = InstanceStatus::Active,
            last_seen_ms: u64 = 0,
            metadata: serde_json::Value = serde_json::Value::Null,
        }
    }
}

#[cfg(test)]
#[path = "instance_tests.rs"]
mod tests;
