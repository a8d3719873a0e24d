// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cb-bus: the event bus (spec.md §4.5) — publish/subscribe over the store,
//! exactly-once consumption, and insertion-ordered partitions.

mod error;
mod publisher;
mod subscriber;

pub use error::BusError;
pub use publisher::EventBus;
pub use subscriber::{Dispatcher, EventHandler, EventSubscription};
