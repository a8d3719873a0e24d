// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single builder for every store key name, so the `cb:` prefix (spec.md
//! §6 "Key namespace") is enforced in exactly one place. Scripts receive
//! explicit key names built from here rather than constructing them
//! inline, so a clustered store can route by key (spec.md §4.1).

/// Builds namespaced store key names. Stateless; cheap to construct anywhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct Keys;

impl Keys {
    pub fn task(&self, id: &str) -> String {
        format!("cb:task:{id}")
    }

    pub fn pending_queue(&self) -> String {
        "cb:queue:tasks:pending".to_string()
    }

    /// Maintained index of every task id ever created, so `task.list` can
    /// avoid a `KEYS cb:task:*` scan (spec.md §9 REDESIGN FLAGS). Kept
    /// current outside the atomic scripts, the same way `cb-instance`
    /// maintains `role:{role}` membership (non-atomic but idempotent).
    pub fn tasks_all(&self) -> String {
        "cb:tasks:all".to_string()
    }

    pub fn worker_queue(&self, worker_id: &str) -> String {
        format!("cb:queue:instance:{worker_id}")
    }

    pub fn instance(&self, id: &str) -> String {
        format!("cb:instance:{id}")
    }

    pub fn instances_active(&self) -> String {
        "cb:instances:active".to_string()
    }

    pub fn role_index(&self, role: &str) -> String {
        format!("cb:role:{role}")
    }

    pub fn capabilities(&self, instance_id: &str) -> String {
        format!("cb:capabilities:{instance_id}")
    }

    pub fn leader_current(&self) -> String {
        "cb:leader:current".to_string()
    }

    pub fn leader_lock(&self) -> String {
        "cb:leader:lock".to_string()
    }

    pub fn gossip_health(&self) -> String {
        "cb:gossip:health".to_string()
    }

    pub fn partition_detected(&self) -> String {
        "cb:partition:detected".to_string()
    }

    pub fn partition_recovery(&self) -> String {
        "cb:partition:recovery".to_string()
    }

    pub fn event_stream(&self, event_type: &str) -> String {
        format!("cb:stream:{event_type}")
    }

    pub fn processed_events(&self) -> String {
        "cb:processed:events".to_string()
    }

    pub fn partition_list(&self, partition_id: &str) -> String {
        format!("cb:partition:{partition_id}")
    }

    pub fn assignments_history(&self) -> String {
        "cb:history:assignments".to_string()
    }

    pub fn task_completions_history(&self, task_id: &str) -> String {
        format!("cb:history:task:{task_id}:completions")
    }

    pub fn redistributed_from(&self, worker_id: &str) -> String {
        format!("cb:redistributed:from:{worker_id}")
    }

    pub fn metrics_instance(&self, id: &str) -> String {
        format!("cb:metrics:instance:{id}")
    }

    pub fn metrics_queues(&self) -> String {
        "cb:metrics:queues".to_string()
    }

    pub fn metrics_global(&self) -> String {
        "cb:metrics:global".to_string()
    }

    pub fn metrics_scaling(&self) -> String {
        "cb:metrics:scaling".to_string()
    }

    pub fn state_global(&self) -> String {
        "cb:state:global".to_string()
    }

    pub fn session_state(&self, sid: &str) -> String {
        format!("cb:session:state:{sid}")
    }

    pub fn session_context(&self, sid: &str) -> String {
        format!("cb:session:context:{sid}")
    }

    pub fn session_stream(&self, sid: &str) -> String {
        format!("cb:stream:session:{sid}")
    }

    pub fn session_metrics(&self, sid: &str) -> String {
        format!("cb:metrics:session:{sid}")
    }

    pub fn session_snapshot(&self, sid: &str, snapshot_id: &str) -> String {
        format!("cb:snapshot:{sid}:{snapshot_id}")
    }

    /// Sorted-set index of `cb:snapshot:{sid}:*` ids scored by the event
    /// timestamp at which each was taken, so `get_context` can find the
    /// latest one without a `KEYS` scan (spec.md §9 REDESIGN FLAGS).
    pub fn session_snapshots(&self, sid: &str) -> String {
        format!("cb:session:snapshots:{sid}")
    }

    pub fn rate_limit(&self, event: &str) -> String {
        format!("cb:ratelimit:{event}")
    }

    pub fn circuit_breaker(&self, event: &str) -> String {
        format!("cb:circuit:{event}")
    }

    pub fn response_cache(&self, event: &str, params_hash: &str) -> String {
        format!("cb:cache:{event}:{params_hash}")
    }
}

#[cfg(test)]
#[path = "keys_tests.rs"]
mod tests;
