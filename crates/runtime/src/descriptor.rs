// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`HandlerDescriptor`]: the static, data-only shape of one registered
//! operation (spec.md §4.8 "descriptor-based self-registration"). A
//! Registry builds its inventory by reading these off every [`crate::Handler`]
//! it holds, rather than through reflection over method attributes.

use serde_json::Value;
use std::time::Duration;

/// Everything the pipeline needs to know about an event *before* it runs
/// the handler body: what shape its params/result take, and which of the
/// pipeline's stages apply and with what limits (spec.md §4.6).
#[derive(Debug, Clone)]
pub struct HandlerDescriptor {
    pub event: &'static str,
    pub description: &'static str,
    /// JSON Schema for `params`. `None` skips the validate stage.
    pub input_schema: Option<Value>,
    /// JSON Schema for the handler's result. `None` skips output validation.
    pub output_schema: Option<Value>,
    /// Whether a successful call should run through [`crate::context::PersistHook`].
    pub persist: bool,
    /// Calls allowed per caller per rate-limit window. `None` disables
    /// rate limiting for this event.
    pub rate_limit: Option<u32>,
    pub timeout: Duration,
    /// Consecutive failures before the breaker opens. `0` disables the
    /// breaker for this event.
    pub circuit_threshold: u32,
    pub circuit_reset: Duration,
    /// How long a successful result is cached by params hash. `0` disables
    /// caching for this event.
    pub cache_ttl: Duration,
    /// Result returned in place of the body while the breaker is Open
    /// (spec.md §4.6 stage 4, §7's `task.claim` -> `{claimed:false}`
    /// example). `None` means an open breaker surfaces `CircuitOpen`.
    pub fallback: Option<Value>,
}

impl HandlerDescriptor {
    /// A descriptor with every optional stage disabled: validate against no
    /// schema, no rate limit, a generous timeout, no breaker, no cache. Call
    /// sites override only the fields their operation actually needs.
    pub fn new(event: &'static str, description: &'static str) -> Self {
        Self {
            event,
            description,
            input_schema: None,
            output_schema: None,
            persist: false,
            rate_limit: None,
            timeout: Duration::from_secs(30),
            circuit_threshold: 0,
            circuit_reset: Duration::from_secs(30),
            cache_ttl: Duration::ZERO,
            fallback: None,
        }
    }

    pub fn with_input_schema(mut self, schema: Value) -> Self {
        self.input_schema = Some(schema);
        self
    }

    pub fn with_output_schema(mut self, schema: Value) -> Self {
        self.output_schema = Some(schema);
        self
    }

    pub fn persisted(mut self) -> Self {
        self.persist = true;
        self
    }

    pub fn with_rate_limit(mut self, calls_per_window: u32) -> Self {
        self.rate_limit = Some(calls_per_window);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_circuit_breaker(mut self, threshold: u32, reset: Duration) -> Self {
        self.circuit_threshold = threshold;
        self.circuit_reset = reset;
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn with_fallback(mut self, value: Value) -> Self {
        self.fallback = Some(value);
        self
    }

    pub fn cache_enabled(&self) -> bool {
        !self.cache_ttl.is_zero()
    }

    pub fn breaker_enabled(&self) -> bool {
        self.circuit_threshold > 0
    }
}
