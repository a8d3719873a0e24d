// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cb-runtime: the handler pipeline (spec.md §4.6) — the eight-stage
//! composition every public operation runs through: validate, rate-limit,
//! timeout, circuit-breaker, optional response cache, body, metrics,
//! persist. Built as an explicit composed value rather than decorator
//! reflection (spec.md §9 REDESIGN FLAGS).

mod breaker;
mod cache;
mod context;
mod descriptor;
mod handler;
mod pipeline;
mod rate_limit;
mod validate;

pub use breaker::BreakerState;
pub use context::{CallerMetadata, EventContext, PersistHook, Publisher};
pub use descriptor::HandlerDescriptor;
pub use handler::Handler;
pub use pipeline::{Entry, HandlerRuntime};
