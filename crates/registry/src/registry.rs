// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`Registry`]: the single `execute(event, params, caller)` entry point
//! every transport and every scheduler job calls through (spec.md §4.8 —
//! "not a privileged path": the scheduler is just another caller). Builds
//! its inventory from [`cb_runtime::HandlerDescriptor`]s attached at
//! registration time, rather than through attribute reflection.

use crate::bus_publisher::BusPublisher;
use crate::dyn_adapters::{DynClock, DynStore};
use crate::handlers::{system, task};
use crate::schemas;
use cb_bus::EventBus;
use cb_core::{CbError, Config};
use cb_instance::InstanceService;
use cb_runtime::{CallerMetadata, Entry, EventContext, HandlerDescriptor, HandlerRuntime, Publisher};
use cb_store::StoreAdapter;
use cb_tasks::TaskService;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

/// One registered operation's full descriptor shape — the machine-readable
/// inventory `system.*` diagnostics and the CLI project as their own
/// surface (spec.md §4.8: "events, input/output schemas, rate limits").
pub struct InventoryEntry {
    pub event: &'static str,
    pub description: &'static str,
    pub input_schema: Option<serde_json::Value>,
    pub output_schema: Option<serde_json::Value>,
    pub rate_limit: Option<u32>,
}

pub struct Registry {
    instance_id: String,
    store: Arc<dyn StoreAdapter>,
    now_ms: Arc<dyn Fn() -> u64 + Send + Sync>,
    publisher: Arc<dyn Publisher>,
    runtime: HandlerRuntime,
    entries: HashMap<&'static str, Entry>,
}

impl Registry {
    /// Builds every `task.*`/`system.*` handler over the same store and
    /// clock, wires a [`BusPublisher`] so handler bodies can emit follow-on
    /// events, and self-registers the full operation surface.
    pub fn new(instance_id: impl Into<String>, store: Arc<dyn StoreAdapter>, now_ms: Arc<dyn Fn() -> u64 + Send + Sync>, config: &Config) -> Self {
        let dyn_store = DynStore(store.clone());
        let dyn_clock = DynClock(now_ms.clone());

        let task_service = Arc::new(TaskService::new(dyn_store.clone(), dyn_clock.clone()));
        let instance_service =
            Arc::new(InstanceService::new(dyn_store.clone(), dyn_clock.clone(), config.heartbeat_timeout_ms, config.leader_lease_ms));
        let bus = EventBus::new(dyn_store.clone(), dyn_clock.clone(), config.processed_event_ttl_s);
        let publisher: Arc<dyn Publisher> = Arc::new(BusPublisher::new(bus));

        let mut registry = Self {
            instance_id: instance_id.into(),
            store,
            now_ms,
            publisher,
            runtime: HandlerRuntime::new(config.rate_limit_window()),
            entries: HashMap::new(),
        };
        registry.register_task_handlers(task_service, instance_service.clone());
        registry.register_system_handlers(instance_service);
        registry
    }

    fn register(&mut self, descriptor: HandlerDescriptor, handler: Arc<dyn cb_runtime::Handler>) {
        let event = descriptor.event;
        self.entries.insert(event, Entry { descriptor, handler, persist_hook: None });
    }

    fn register_task_handlers(&mut self, svc: Arc<TaskService<DynStore, DynClock>>, instance_svc: Arc<InstanceService<DynStore, DynClock>>) {
        self.register(
            HandlerDescriptor::new("task.create", "creates a pending task").with_input_schema(schemas::task_create()).persisted(),
            Arc::new(task::Create(svc.clone())),
        );
        self.register(
            HandlerDescriptor::new("task.update", "merges field updates into a task").with_input_schema(schemas::task_update()),
            Arc::new(task::Update(svc.clone())),
        );
        self.register(
            HandlerDescriptor::new("task.claim", "claims the highest-priority pending task for a worker")
                .with_input_schema(schemas::task_claim())
                .with_rate_limit(1000)
                .with_circuit_breaker(5, std::time::Duration::from_secs(30))
                .with_fallback(json!({"claimed": false})),
            Arc::new(task::Claim(svc.clone(), instance_svc)),
        );
        self.register(
            HandlerDescriptor::new("task.complete", "marks an assigned task completed or failed")
                .with_input_schema(schemas::task_complete())
                .persisted(),
            Arc::new(task::Complete(svc.clone())),
        );
        self.register(
            HandlerDescriptor::new("task.assign", "directly assigns a task to an instance").with_input_schema(schemas::task_assign()),
            Arc::new(task::Assign(svc.clone())),
        );
        self.register(
            HandlerDescriptor::new("task.unassign", "restores an assigned task to pending").with_input_schema(schemas::task_unassign()),
            Arc::new(task::Unassign(svc.clone())),
        );
        self.register(
            HandlerDescriptor::new("task.delete", "deletes a task").with_input_schema(schemas::task_delete()),
            Arc::new(task::Delete(svc.clone())),
        );
        self.register(
            HandlerDescriptor::new("task.list", "lists tasks by filter/sort/page")
                .with_input_schema(schemas::task_list())
                .with_cache_ttl(std::time::Duration::from_secs(2)),
            Arc::new(task::List(svc.clone())),
        );
        self.register(
            HandlerDescriptor::new("task.auto_assign", "assigns the oldest stale pending task to an idle worker")
                .with_input_schema(schemas::task_auto_assign()),
            Arc::new(task::AutoAssign(svc)),
        );
    }

    fn register_system_handlers(&mut self, svc: Arc<InstanceService<DynStore, DynClock>>) {
        self.register(
            HandlerDescriptor::new("system.register", "registers an instance").with_input_schema(schemas::system_register()),
            Arc::new(system::Register(svc.clone())),
        );
        self.register(
            HandlerDescriptor::new("system.heartbeat", "renews an instance's lease")
                .with_input_schema(schemas::system_heartbeat())
                .with_rate_limit(1000),
            Arc::new(system::Heartbeat(svc.clone())),
        );
        self.register(
            HandlerDescriptor::new("system.check_health", "sweeps instances for failure").with_input_schema(schemas::empty_object()),
            Arc::new(system::CheckHealth(svc)),
        );
        self.register(
            HandlerDescriptor::new("system.health", "liveness snapshot").with_input_schema(schemas::empty_object()),
            Arc::new(system::Health { store: self.store.clone() }),
        );
        self.register(
            HandlerDescriptor::new("system.get_state", "condensed global state snapshot").with_input_schema(schemas::empty_object()),
            Arc::new(system::GetState { store: self.store.clone() }),
        );
        self.register(
            HandlerDescriptor::new("system.metrics", "raw gauge snapshot").with_input_schema(schemas::empty_object()),
            Arc::new(system::Metrics { store: self.store.clone() }),
        );
        self.register(
            HandlerDescriptor::new("system.aggregate_metrics", "folds queue/instance counters into the global gauges")
                .with_input_schema(schemas::empty_object()),
            Arc::new(system::AggregateMetrics { store: self.store.clone() }),
        );
        self.register(
            HandlerDescriptor::new("system.sync_state", "snapshots instance/task counts with a bumped version")
                .with_input_schema(schemas::empty_object()),
            Arc::new(system::SyncState { store: self.store.clone() }),
        );
        self.register(
            HandlerDescriptor::new("system.detect_partitions", "infers partition/recovery from the gossip view")
                .with_input_schema(schemas::empty_object()),
            Arc::new(system::DetectPartitions { store: self.store.clone() }),
        );
        self.register(
            HandlerDescriptor::new("system.check_quorum", "reads the latest gossip quorum view").with_input_schema(schemas::empty_object()),
            Arc::new(system::CheckQuorum { store: self.store.clone() }),
        );
    }

    /// The backing store, for callers outside the handler pipeline —
    /// `cb-scheduler`'s jobs read index sets directly (e.g. `role:worker` ∩
    /// `instances:active`) the same way a handler body would via `ctx.store`.
    pub fn store(&self) -> Arc<dyn StoreAdapter> {
        self.store.clone()
    }

    /// The same clock every handler sees through [`EventContext::now_ms`],
    /// so scheduler jobs compute task age against a consistent clock.
    pub fn now_ms(&self) -> u64 {
        (self.now_ms)()
    }

    /// The single entry point every transport and scheduler job calls
    /// through (spec.md §4.8). Unknown events fail with
    /// [`cb_core::ErrorKind::MethodNotFound`] rather than a domain
    /// `NotFound`.
    pub async fn execute(&self, event: &str, params: serde_json::Value, caller: CallerMetadata) -> Result<serde_json::Value, CbError> {
        let entry = self.entries.get(event).ok_or_else(|| CbError::method_not_found(event))?;
        let ctx = EventContext::new(self.instance_id.clone(), caller, self.store.clone(), self.publisher.clone(), self.now_ms.clone());
        self.runtime.execute(entry, params, &ctx).await
    }

    /// The machine-readable inventory (spec.md §4.8): every registered
    /// event and its description, for `system.*` introspection and the CLI.
    pub fn inventory(&self) -> Vec<InventoryEntry> {
        let mut entries: Vec<InventoryEntry> = self
            .entries
            .values()
            .map(|entry| InventoryEntry {
                event: entry.descriptor.event,
                description: entry.descriptor.description,
                input_schema: entry.descriptor.input_schema.clone(),
                output_schema: entry.descriptor.output_schema.clone(),
                rate_limit: entry.descriptor.rate_limit,
            })
            .collect();
        entries.sort_by_key(|e| e.event);
        entries
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
