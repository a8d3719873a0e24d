// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-call context (spec.md §4.6): the store, clock, and publish handle a
//! handler body needs, threaded in by value instead of captured by closure
//! so [`crate::Handler`] stays an object-safe trait, the same way the
//! teacher's `Runtime` hands each job a borrowed `&JobContext` rather than
//! letting jobs reach into globals.

use async_trait::async_trait;
use cb_core::CbError;
use cb_store::StoreAdapter;
use serde_json::Value;
use std::sync::Arc;

/// Who's calling, as far as the pipeline's rate limiter and audit trail
/// care (spec.md §4.6 "rate-limit" keys by caller, not just by event).
#[derive(Debug, Clone, Default)]
pub struct CallerMetadata {
    pub instance_id: Option<String>,
    pub session_id: Option<String>,
}

/// Object-safe stand-in for [`cb_bus::EventBus::publish`]: a handler body
/// that needs to emit a follow-on event (e.g. `task.completed` after
/// `task.complete`) calls this instead of depending on `cb-bus` directly,
/// which would have made `cb-runtime` depend on every crate that needs to
/// publish.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, event_type: &str, payload: Value) -> Result<(), CbError>;
}

/// Runs a handler's persist-hook stage (spec.md §4.6 "persist"): handlers
/// marked `persist: true` in their [`crate::HandlerDescriptor`] call this
/// with their own result after the body succeeds, so persistence is an
/// explicit pipeline stage rather than something each body does for itself.
#[async_trait]
pub trait PersistHook: Send + Sync {
    async fn persist(&self, event_type: &str, params: &Value, result: &Value) -> Result<(), CbError>;
}

/// Everything a [`crate::Handler`] body is given for one call. Cheap to
/// clone: every field is an `Arc` or a plain value.
#[derive(Clone)]
pub struct EventContext {
    pub instance_id: String,
    pub caller: CallerMetadata,
    pub store: Arc<dyn StoreAdapter>,
    pub publisher: Arc<dyn Publisher>,
    now_ms: Arc<dyn Fn() -> u64 + Send + Sync>,
}

impl EventContext {
    pub fn new(
        instance_id: impl Into<String>,
        caller: CallerMetadata,
        store: Arc<dyn StoreAdapter>,
        publisher: Arc<dyn Publisher>,
        now_ms: Arc<dyn Fn() -> u64 + Send + Sync>,
    ) -> Self {
        Self { instance_id: instance_id.into(), caller, store, publisher, now_ms }
    }

    pub fn now_ms(&self) -> u64 {
        (self.now_ms)()
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
