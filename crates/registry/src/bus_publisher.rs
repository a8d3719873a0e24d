// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bridges [`cb_bus::EventBus`] to [`cb_runtime::Publisher`], so handler
//! bodies publish follow-on events (`task.created`, `task.completed`, ...)
//! through the same object-safe handle the pipeline hands them in
//! [`cb_runtime::EventContext`].

use crate::dyn_adapters::{DynClock, DynStore};
use async_trait::async_trait;
use cb_bus::EventBus;
use cb_core::CbError;
use cb_runtime::Publisher;
use serde_json::Value;

pub struct BusPublisher {
    bus: EventBus<DynStore, DynClock>,
}

impl BusPublisher {
    pub fn new(bus: EventBus<DynStore, DynClock>) -> Self {
        Self { bus }
    }
}

#[async_trait]
impl Publisher for BusPublisher {
    async fn publish(&self, event_type: &str, payload: Value) -> Result<(), CbError> {
        self.bus.publish(event_type, payload, None, None).await.map_err(CbError::from)?;
        Ok(())
    }
}
