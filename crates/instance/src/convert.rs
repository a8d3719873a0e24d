// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Maps the `cb:instance:{id}` store-hash shape onto [`cb_core::Instance`],
//! the same separation `cb-tasks::convert` keeps for tasks.

use crate::error::InstanceError;
use cb_core::{Instance, InstanceHealth, InstanceStatus};
use std::collections::HashMap;

pub(crate) fn instance_from_fields(fields: &HashMap<String, String>) -> Result<Instance, InstanceError> {
    if fields.is_empty() {
        return Err(InstanceError::NotRegistered);
    }
    let get = |k: &str| fields.get(k).cloned().unwrap_or_default();
    let health = match get("health").as_str() {
        "healthy" => InstanceHealth::Healthy,
        "degraded" => InstanceHealth::Degraded,
        "unhealthy" => InstanceHealth::Unhealthy,
        other => {
            tracing::warn!(health = other, "unrecognized instance health in store hash, defaulting to healthy");
            InstanceHealth::Healthy
        }
    };
    let status = match get("status").as_str() {
        "active" => InstanceStatus::Active,
        "offline" => InstanceStatus::Offline,
        other => {
            tracing::warn!(status = other, "unrecognized instance status in store hash, defaulting to active");
            InstanceStatus::Active
        }
    };
    let roles: Vec<String> = fields.get("roles").and_then(|raw| serde_json::from_str(raw).ok()).unwrap_or_default();
    let metadata = fields.get("metadata").and_then(|raw| serde_json::from_str(raw).ok()).unwrap_or(serde_json::Value::Null);

    Ok(Instance {
        id: get("id"),
        roles,
        health,
        status,
        last_seen_ms: get("lastSeenMs").parse().unwrap_or(0),
        last_heartbeat: get("lastHeartbeat"),
        metadata,
    })
}

#[cfg(test)]
#[path = "convert_tests.rs"]
mod tests;
