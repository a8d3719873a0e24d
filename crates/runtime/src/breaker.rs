// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-event circuit breaker (spec.md §4.6 "circuit-breaker"): in-process
//! state guarded by a mutex, the same concurrency model the teacher uses
//! for its in-memory rate limiter — no store round-trip on the hot path,
//! since a breaker only needs to be consistent within one process.

use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Closed,
    Open,
    HalfOpen,
}

/// One event's breaker state at a point in time, as reported by
/// [`crate::pipeline::HandlerRuntime`] for diagnostics and in
/// [`cb_core::CbError::circuit_open`]'s detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

impl std::fmt::Display for BreakerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BreakerState::Closed => "closed",
            BreakerState::Open => "open",
            BreakerState::HalfOpen => "half_open",
        };
        write!(f, "{s}")
    }
}

struct Breaker {
    phase: Phase,
    consecutive_failures: u32,
    opened_at_ms: u64,
    /// True once the single half-open probe has been handed out; cleared on
    /// the probe's outcome.
    probe_in_flight: bool,
}

impl Breaker {
    fn new() -> Self {
        Self { phase: Phase::Closed, consecutive_failures: 0, opened_at_ms: 0, probe_in_flight: false }
    }
}

/// Per-event breaker table. Held inside [`crate::pipeline::HandlerRuntime`]
/// behind a `parking_lot::Mutex`, never across an `.await` point.
pub struct BreakerTable {
    breakers: HashMap<&'static str, Breaker>,
}

impl BreakerTable {
    pub fn new() -> Self {
        Self { breakers: HashMap::new() }
    }

    /// Whether a call may proceed right now. `Ok(true)` also marks a
    /// half-open probe as in flight, so concurrent callers during the reset
    /// window don't all get let through.
    pub fn admit(&mut self, event: &'static str, threshold: u32, reset: Duration, now_ms: u64) -> Result<(), BreakerState> {
        if threshold == 0 {
            return Ok(());
        }
        let breaker = self.breakers.entry(event).or_insert_with(Breaker::new);
        match breaker.phase {
            Phase::Closed => Ok(()),
            Phase::Open => {
                if now_ms.saturating_sub(breaker.opened_at_ms) >= reset.as_millis() as u64 {
                    if breaker.probe_in_flight {
                        Err(BreakerState::Open)
                    } else {
                        breaker.phase = Phase::HalfOpen;
                        breaker.probe_in_flight = true;
                        Ok(())
                    }
                } else {
                    Err(BreakerState::Open)
                }
            }
            Phase::HalfOpen => {
                if breaker.probe_in_flight {
                    Err(BreakerState::HalfOpen)
                } else {
                    breaker.probe_in_flight = true;
                    Ok(())
                }
            }
        }
    }

    pub fn record_success(&mut self, event: &'static str) {
        if let Some(breaker) = self.breakers.get_mut(event) {
            breaker.phase = Phase::Closed;
            breaker.consecutive_failures = 0;
            breaker.probe_in_flight = false;
        }
    }

    pub fn record_failure(&mut self, event: &'static str, threshold: u32, now_ms: u64) {
        if threshold == 0 {
            return;
        }
        let breaker = self.breakers.entry(event).or_insert_with(Breaker::new);
        breaker.probe_in_flight = false;
        match breaker.phase {
            Phase::HalfOpen => {
                breaker.phase = Phase::Open;
                breaker.opened_at_ms = now_ms;
                breaker.consecutive_failures = threshold;
            }
            Phase::Closed => {
                breaker.consecutive_failures += 1;
                if breaker.consecutive_failures >= threshold {
                    breaker.phase = Phase::Open;
                    breaker.opened_at_ms = now_ms;
                }
            }
            Phase::Open => {}
        }
    }

    pub fn state(&self, event: &'static str) -> BreakerState {
        match self.breakers.get(event).map(|b| b.phase) {
            Some(Phase::Open) => BreakerState::Open,
            Some(Phase::HalfOpen) => BreakerState::HalfOpen,
            Some(Phase::Closed) | None => BreakerState::Closed,
        }
    }
}

impl Default for BreakerTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "breaker_tests.rs"]
mod tests;
