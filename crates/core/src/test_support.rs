// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::clock::FakeClock;
use crate::event::Event;
use crate::id::EventId;
use crate::instance::Instance;
use crate::task::Task;

/// A `FakeClock` pinned to a fixed, readable epoch (2023-11-14T22:13:20Z).
pub fn fixed_clock() -> FakeClock {
    let clock = FakeClock::new();
    clock.set_epoch_ms(1_700_000_000_000);
    clock
}

pub fn task_fixture(id: &str) -> Task {
    Task::builder().id(id).build()
}

pub fn instance_fixture(id: &str) -> Instance {
    Instance::builder().id(id).build()
}

pub fn event_fixture(event_type: &str, payload: serde_json::Value) -> Event {
    let clock = fixed_clock();
    let id = EventId::generate(&clock);
    Event::new(id, event_type, payload, clock.epoch_ms())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::Clock;

    #[test]
    fn task_fixture_is_pending() {
        let task = task_fixture("t-1");
        assert_eq!(task.id, "t-1");
        assert_eq!(task.status, crate::task::TaskStatus::Pending);
    }

    #[test]
    fn instance_fixture_is_healthy_worker() {
        let instance = instance_fixture("w1");
        assert!(instance.is_worker());
        assert_eq!(instance.health, crate::instance::InstanceHealth::Healthy);
    }

    #[test]
    fn event_fixture_carries_fixed_timestamp() {
        let event = event_fixture("task.created", serde_json::json!({"id": "t-1"}));
        assert_eq!(event.timestamp, 1_700_000_000_000);
        assert_eq!(event.event_type, "task.created");
    }

    #[test]
    fn fixed_clock_reports_pinned_epoch() {
        assert_eq!(fixed_clock().epoch_ms(), 1_700_000_000_000);
    }
}
