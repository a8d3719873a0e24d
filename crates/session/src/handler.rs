// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Binds [`SessionService`] to the bus as a [`cb_bus::EventHandler`] so
//! `cb-daemon` can hand it straight to a [`cb_bus::Dispatcher`] the same
//! way it hands any other subscription its handler.

use crate::service::SessionService;
use async_trait::async_trait;
use cb_bus::EventHandler;
use cb_core::{Clock, Event};
use cb_store::StoreAdapter;
use std::sync::Arc;
use tracing::warn;

pub struct SessionFoldHandler<S, C> {
    service: Arc<SessionService<S, C>>,
}

impl<S, C> SessionFoldHandler<S, C> {
    pub fn new(service: Arc<SessionService<S, C>>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl<S, C> EventHandler for SessionFoldHandler<S, C>
where
    S: StoreAdapter + Send + Sync + 'static,
    C: Clock + Send + Sync + 'static,
{
    async fn handle(&self, event: Event) {
        if let Err(error) = self.service.fold_event(&event).await {
            warn!(event_type = %event.event_type, %error, "session fold failed");
        }
    }
}
