// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `SessionService` (spec.md §4.9): folds `hook.*.executed` events into
//! per-session condensed state, generic over the store and clock the same
//! way `cb_tasks::TaskService` is, so tests substitute
//! [`cb_store::fake::FakeStore`] and [`cb_core::FakeClock`].

use crate::context::SessionContext;
use crate::error::SessionError;
use cb_core::{Clock, Event, Keys, SessionId, SnapshotId};
use cb_store::StoreAdapter;
use serde_json::{json, Value};

/// Bound on the on-demand fold-from-stream read (spec.md §4.9 fallback
/// path) so a pathologically long session can't block `get_context`
/// forever; a real deployment's `streamTrimMaxLen` keeps streams under this
/// anyway (spec.md §6.1).
const MAX_FOLD_REPLAY: usize = 100_000;

pub struct SessionService<S, C> {
    store: S,
    clock: C,
    keys: Keys,
    snapshot_every_n: u64,
}

impl<S, C> SessionService<S, C>
where
    S: StoreAdapter,
    C: Clock,
{
    pub fn new(store: S, clock: C, snapshot_every_n: u64) -> Self {
        Self { store, clock, keys: Keys, snapshot_every_n: snapshot_every_n.max(1) }
    }

    /// Folds one `hook.*.executed` event (spec.md §4.9 steps 1-3), then
    /// writes a snapshot every `snapshotEveryN`th event for this session.
    pub async fn fold_event(&self, event: &Event) -> Result<(), SessionError> {
        let sid = event
            .payload
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or(SessionError::MissingSessionId)?
            .to_string();

        let stream_key = self.keys.session_stream(&sid);
        let json = serde_json::to_string(event).map_err(|e| SessionError::MalformedPayload(e.to_string()))?;
        self.store.xadd(&stream_key, &[("data", json.as_str())]).await?;

        let hook_type = hook_type_of(&event.event_type);
        let metrics_key = self.keys.session_metrics(&sid);
        let events_total = self.store.hincrby(&metrics_key, "eventsTotal", 1).await?;
        self.store.hincrby(&metrics_key, &format!("hook:{hook_type}"), 1).await?;
        if self.store.hget(&metrics_key, "firstEventTs").await?.is_none() {
            self.store.hset(&metrics_key, "firstEventTs", &event.timestamp.to_string()).await?;
        }
        self.store.hset(&metrics_key, "lastEventTs", &event.timestamp.to_string()).await?;

        self.fold_context(&sid, &event.payload).await?;

        if events_total > 0 && (events_total as u64) % self.snapshot_every_n == 0 {
            self.snapshot(&sid, events_total as u64).await?;
        }
        Ok(())
    }

    async fn fold_context(&self, sid: &str, payload: &Value) -> Result<(), SessionError> {
        let context_key = self.keys.session_context(sid);
        if let Some(prompt) = payload.get("prompt").and_then(Value::as_str) {
            self.store.hset(&context_key, "lastPrompt", prompt).await?;
        }
        if let Some(tool) = payload.get("toolName").and_then(Value::as_str) {
            let current = self.store.hget(&context_key, "lastTools").await?;
            let mut tools: Vec<String> = current.and_then(|raw| serde_json::from_str(&raw).ok()).unwrap_or_default();
            tools.insert(0, tool.to_string());
            tools.truncate(10);
            let encoded = serde_json::to_string(&tools).map_err(|e| SessionError::MalformedPayload(e.to_string()))?;
            self.store.hset(&context_key, "lastTools", &encoded).await?;
        }
        if let Some(todos) = payload.get("todos") {
            let encoded = serde_json::to_string(todos).map_err(|e| SessionError::MalformedPayload(e.to_string()))?;
            self.store.hset(&context_key, "activeTodos", &encoded).await?;
        }
        Ok(())
    }

    /// Writes `snapshot:{sid}:{snapshotId}` with aggregated counters and the
    /// event-time range covered so far, and indexes it under
    /// `session:snapshots:{sid}` so `get_context` can find the latest one.
    async fn snapshot(&self, sid: &str, event_count: u64) -> Result<(), SessionError> {
        let metrics = self.store.hgetall(&self.keys.session_metrics(sid)).await?;
        let context = self.store.hgetall(&self.keys.session_context(sid)).await?;
        let last_event_ts: u64 = metrics.get("lastEventTs").and_then(|v| v.parse().ok()).unwrap_or(self.clock.epoch_ms());

        let snapshot_id = SnapshotId::generate(&SessionId::from(sid), &self.clock);
        let data = json!({
            "sessionId": sid,
            "snapshotId": snapshot_id.as_str(),
            "eventCount": event_count,
            "firstEventTs": metrics.get("firstEventTs").and_then(|v| v.parse::<u64>().ok()),
            "lastEventTs": last_event_ts,
            "counters": metrics,
            "context": context_value(&context),
        });
        let encoded = serde_json::to_string(&data).map_err(|e| SessionError::MalformedPayload(e.to_string()))?;
        self.store.hset(&self.keys.session_snapshot(sid, snapshot_id.as_str()), "data", &encoded).await?;
        self.store.zadd(&self.keys.session_snapshots(sid), snapshot_id.as_str(), last_event_ts as f64).await?;
        Ok(())
    }

    /// `get_context(sid)` (spec.md §4.9): the latest snapshot if one
    /// exists, otherwise a fold of the full session stream on demand.
    pub async fn get_context(&self, sid: &str) -> Result<Value, SessionError> {
        let snapshots_key = self.keys.session_snapshots(sid);
        let latest = self.store.zrange_withscores(&snapshots_key, -1, -1).await?;
        if let Some(top) = latest.into_iter().next_back() {
            let snapshot_key = self.keys.session_snapshot(sid, &top.member);
            if let Some(raw) = self.store.hget(&snapshot_key, "data").await? {
                let value: Value = serde_json::from_str(&raw).map_err(|e| SessionError::MalformedPayload(e.to_string()))?;
                return Ok(value);
            }
        }
        self.fold_on_demand(sid).await
    }

    async fn fold_on_demand(&self, sid: &str) -> Result<Value, SessionError> {
        let entries = self.store.xrange(&self.keys.session_stream(sid), "-", "+", MAX_FOLD_REPLAY).await?;
        let mut context = SessionContext::default();
        let mut event_count: u64 = 0;
        let mut first_ts: Option<u64> = None;
        let mut last_ts: Option<u64> = None;
        for entry in &entries {
            let Some(raw) = entry.fields.get("data") else { continue };
            let Ok(event) = serde_json::from_str::<Event>(raw) else { continue };
            context.apply(&event.payload);
            event_count += 1;
            first_ts.get_or_insert(event.timestamp);
            last_ts = Some(event.timestamp);
        }
        Ok(json!({
            "sessionId": sid,
            "eventCount": event_count,
            "firstEventTs": first_ts,
            "lastEventTs": last_ts,
            "context": context,
        }))
    }
}

/// `hook.{name}.executed` -> `{name}`, falling back to the full event type
/// for anything that doesn't match the expected shape.
fn hook_type_of(event_type: &str) -> &str {
    event_type.strip_prefix("hook.").and_then(|s| s.strip_suffix(".executed")).unwrap_or(event_type)
}

fn context_value(fields: &std::collections::HashMap<String, String>) -> Value {
    let mut out = serde_json::Map::new();
    if let Some(prompt) = fields.get("lastPrompt") {
        out.insert("lastPrompt".to_string(), Value::String(prompt.clone()));
    }
    if let Some(tools) = fields.get("lastTools").and_then(|raw| serde_json::from_str::<Value>(raw).ok()) {
        out.insert("lastTools".to_string(), tools);
    }
    if let Some(todos) = fields.get("activeTodos").and_then(|raw| serde_json::from_str::<Value>(raw).ok()) {
        out.insert("activeTodos".to_string(), todos);
    }
    Value::Object(out)
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
