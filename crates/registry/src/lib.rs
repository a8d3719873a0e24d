// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cb-registry: the Registry & Dispatcher (spec.md §4.8) — one
//! `execute(event, params, caller)` entry point, built by wiring
//! `cb-tasks`/`cb-instance`/`cb-bus` services into [`cb_runtime::Handler`]
//! implementations and registering them with their
//! [`cb_runtime::HandlerDescriptor`]s.

mod bus_publisher;
mod dyn_adapters;
mod handlers;
mod registry;
mod schemas;

pub use cb_runtime::CallerMetadata;
pub use dyn_adapters::{DynClock, DynStore};
pub use registry::{InventoryEntry, Registry};
