// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`HandlerRuntime`]: composes the eight pipeline stages from spec.md
//! §4.6 — validate, rate-limit, timeout, circuit-breaker, optional
//! response cache, body, metrics, persist — around one [`Handler`] call.
//! Built as a plain method that runs each stage in sequence, not a stack of
//! decorators, per spec.md §9 REDESIGN FLAGS ("compose the pipeline as an
//! explicit value, not middleware-by-reflection").

use crate::breaker::{BreakerState, BreakerTable};
use crate::cache;
use crate::context::{EventContext, PersistHook};
use crate::descriptor::HandlerDescriptor;
use crate::handler::Handler;
use crate::rate_limit;
use cb_core::{CbError, ErrorKind, Keys};
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Ties a [`HandlerDescriptor`] to the [`Handler`] it describes. A Registry
/// (not this crate) owns the map from event name to `Entry`; this crate only
/// knows how to run one.
pub struct Entry {
    pub descriptor: HandlerDescriptor,
    pub handler: Arc<dyn Handler>,
    pub persist_hook: Option<Arc<dyn PersistHook>>,
}

/// Per-process pipeline state: only the circuit breaker table needs to
/// survive between calls, since rate limiting and caching are store-backed
/// and validation/timeout are stateless per call.
pub struct HandlerRuntime {
    keys: Keys,
    rate_limit_window: Duration,
    breakers: Mutex<BreakerTable>,
}

impl HandlerRuntime {
    pub fn new(rate_limit_window: Duration) -> Self {
        Self { keys: Keys, rate_limit_window, breakers: Mutex::new(BreakerTable::new()) }
    }

    /// Runs `entry` against `params` under `ctx`, in pipeline order. Each
    /// stage can short-circuit with a [`CbError`] before the body ever runs,
    /// except metrics and persist, which only run after a successful body.
    pub async fn execute(&self, entry: &Entry, params: Value, ctx: &EventContext) -> Result<Value, CbError> {
        let event = entry.descriptor.event;
        let now_ms = ctx.now_ms();

        if let Some(schema) = &entry.descriptor.input_schema {
            crate::validate::validate(schema, &params)?;
        }

        if let Some(limit) = entry.descriptor.rate_limit {
            match rate_limit::check(ctx.store.as_ref(), &self.keys, event, limit, self.rate_limit_window.as_millis() as u64, now_ms).await {
                Ok(()) => stage_metric("ratelimit", event, "allowed"),
                Err(err) => {
                    stage_metric("ratelimit", event, "rejected");
                    return Err(err);
                }
            }
        }

        if entry.descriptor.breaker_enabled() {
            if let Err(state) = self.breakers.lock().admit(event, entry.descriptor.circuit_threshold, entry.descriptor.circuit_reset, now_ms) {
                stage_metric("circuit", event, "rejected");
                return match &entry.descriptor.fallback {
                    Some(fallback) => {
                        stage_metric("circuit", event, "fallback");
                        Ok(fallback.clone())
                    }
                    None => Err(CbError::circuit_open(state.to_string())),
                };
            }
        }

        let cache_key = if entry.descriptor.cache_enabled() { Some(cache::params_hash(&params)) } else { None };
        if let Some(hash) = &cache_key {
            if let Some(cached) = cache::get(ctx.store.as_ref(), &self.keys, event, hash).await {
                return Ok(cached);
            }
        }

        let started = Instant::now();
        let outcome = tokio::time::timeout(entry.descriptor.timeout, entry.handler.call(params.clone(), ctx)).await;
        metrics::histogram!("cb_handler_duration_ms", "event" => event).record(started.elapsed().as_secs_f64() * 1000.0);

        let result = match outcome {
            Ok(Ok(value)) => {
                stage_metric("timeout", event, "completed");
                value
            }
            Ok(Err(err)) => {
                stage_metric("timeout", event, "completed");
                if entry.descriptor.breaker_enabled() {
                    self.record_breaker_failure(event, entry.descriptor.circuit_threshold, now_ms);
                }
                record_failure_metric(event, err.kind);
                return Err(err);
            }
            Err(_) => {
                stage_metric("timeout", event, "timedOut");
                if entry.descriptor.breaker_enabled() {
                    self.record_breaker_failure(event, entry.descriptor.circuit_threshold, now_ms);
                }
                let err = CbError::timeout();
                record_failure_metric(event, err.kind);
                return Err(err);
            }
        };

        if entry.descriptor.breaker_enabled() {
            self.breakers.lock().record_success(event);
            stage_metric("circuit", event, "success");
        }

        if let (Some(hash), true) = (&cache_key, entry.descriptor.cache_enabled()) {
            cache::put(ctx.store.as_ref(), &self.keys, event, hash, entry.descriptor.cache_ttl, &result).await;
        }

        metrics::counter!("cb_handler_calls_total", "event" => event, "outcome" => "success").increment(1);

        if entry.descriptor.persist {
            if let Some(hook) = &entry.persist_hook {
                hook.persist(event, &params, &result).await?;
            }
        }

        Ok(result)
    }

    /// Records a body failure or timeout against `event`'s breaker, emitting
    /// `circuit:{event}:opened` the moment this failure is the one that
    /// trips it rather than folding every failure into one bucket.
    fn record_breaker_failure(&self, event: &'static str, threshold: u32, now_ms: u64) {
        let mut breakers = self.breakers.lock();
        let was_open = breakers.state(event) == BreakerState::Open;
        breakers.record_failure(event, threshold, now_ms);
        if !was_open && breakers.state(event) == BreakerState::Open {
            drop(breakers);
            stage_metric("circuit", event, "opened");
        } else {
            drop(breakers);
            stage_metric("circuit", event, "failure");
        }
    }
}

/// `counters.{circuit|ratelimit|timeout}:{event}:{outcome}` (spec.md §4.6
/// stage 7's metrics taxonomy).
fn stage_metric(category: &'static str, event: &'static str, outcome: &'static str) {
    metrics::counter!(format!("counters.{category}:{event}:{outcome}")).increment(1);
}

fn record_failure_metric(event: &'static str, kind: ErrorKind) {
    metrics::counter!("cb_handler_calls_total", "event" => event, "outcome" => "failure", "kind" => kind.to_string())
        .increment(1);
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
