// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Publish, exactly-once dedup, and ordered partitions (spec.md §4.5
//! "Publish" / "Exactly-once consumption" / "Ordered partitions").

use crate::error::BusError;
use cb_core::{Clock, Event, EventId, Keys};
use cb_store::StoreAdapter;
use serde_json::Value;

/// `partition:{id}` retention (spec.md §4.5: "trims to last 1000, TTL 1h").
const PARTITION_MAX_LEN: i64 = 1000;
const PARTITION_TTL_SECS: u64 = 3600;

pub struct EventBus<S, C> {
    store: S,
    clock: C,
    keys: Keys,
    processed_event_ttl_s: u64,
}

impl<S, C> EventBus<S, C>
where
    S: StoreAdapter,
    C: Clock,
{
    pub fn new(store: S, clock: C, processed_event_ttl_s: u64) -> Self {
        Self { store, clock, keys: Keys, processed_event_ttl_s }
    }

    /// Publishes `{type, payload, metadata?}`, generating `id`/`timestamp` if
    /// the caller doesn't supply `id`. Appends to the durable per-type stream
    /// and fans out on the matching pub/sub channel (spec.md §4.5: "two
    /// effects are intended: durable log for replay/audit and real-time
    /// fan-out").
    pub async fn publish(
        &self,
        event_type: &str,
        payload: Value,
        metadata: Option<Value>,
        id: Option<EventId>,
    ) -> Result<Event, BusError> {
        let id = id.unwrap_or_else(|| EventId::generate(&self.clock));
        let mut event = Event::new(id, event_type, payload, self.clock.epoch_ms());
        event.metadata = metadata;
        let json = serde_json::to_string(&event).map_err(|e| BusError::MalformedPayload(e.to_string()))?;
        self.store.xadd(&self.keys.event_stream(event_type), &[("data", json.as_str())]).await?;
        self.store.publish(event_type, &json).await?;
        Ok(event)
    }

    /// `event.is_duplicate(eventId)` (spec.md §4.5): the first caller for a
    /// given id sees `false`; every subsequent caller sees `true`.
    pub async fn is_duplicate(&self, event_id: &str) -> Result<bool, BusError> {
        let processed_set = self.keys.processed_events();
        Ok(cb_scripts::event::is_duplicate(&self.store, &processed_set, event_id, self.processed_event_ttl_s).await?)
    }

    /// `event.add_to_partition(partitionId, evt)` (spec.md §4.5): preserves
    /// insertion order within `partition:{id}`.
    pub async fn add_to_partition(&self, partition_id: &str, event: &Event) -> Result<(), BusError> {
        let partition_key = self.keys.partition_list(partition_id);
        let json = serde_json::to_string(event).map_err(|e| BusError::MalformedPayload(e.to_string()))?;
        cb_scripts::event::add_to_partition(&self.store, &partition_key, &json, PARTITION_MAX_LEN, PARTITION_TTL_SECS).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "publisher_tests.rs"]
mod tests;
