// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The event bus envelope (spec.md §4.5 "Publish").
//!
//! This is the wire shape exchanged over `cb:stream:{type}` and the
//! matching pub/sub channel, not the internal `Event` enum style other
//! systems use for in-process state machines — ClaudeBench's events are
//! opaque `{type, payload}` records addressed by string type name so any
//! handler can declare a new one without a central enum edit.

use crate::id::EventId;
use serde::{Deserialize, Serialize};

/// An event as published on the bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    #[serde(rename = "type")]
    pub event_type: String,
    pub payload: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    pub timestamp: u64,
}

impl Event {
    pub fn new(
        id: EventId,
        event_type: impl Into<String>,
        payload: serde_json::Value,
        timestamp: u64,
    ) -> Self {
        Self { id, event_type: event_type.into(), payload, metadata: None, timestamp }
    }

    /// `prefix.*` pattern match used by `Subscribe` (spec.md §4.5), mirroring
    /// Redis `PSUBSCRIBE` glob semantics: `hook.*` matches any type beginning
    /// with `hook.`, however many further segments it has.
    pub fn matches_pattern(event_type: &str, pattern: &str) -> bool {
        match pattern.strip_suffix("*") {
            Some(prefix) => event_type.starts_with(prefix),
            None => event_type == pattern,
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
