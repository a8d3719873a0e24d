// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subscriber dispatch (spec.md §4.5 "Subscribe" / "Concurrency contract").
//!
//! `EventSubscription` wraps the store's raw pub/sub channel and decodes
//! each message back into an [`Event`]. `Dispatcher` hands delivered events
//! to a bounded worker pool so a slow handler body never blocks the
//! subscription's receive loop, the way the teacher's desktop notify
//! adapter offloads blocking work onto `spawn_blocking` rather than
//! running it on the caller's task.

use crate::error::BusError;
use async_trait::async_trait;
use cb_core::Event;
use cb_store::StoreAdapter;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// A live subscription to an exact event type or a `prefix.*` pattern.
pub struct EventSubscription {
    pattern: String,
    receiver: tokio::sync::mpsc::Receiver<cb_store::PubSubMessage>,
}

impl EventSubscription {
    pub async fn bind(store: &dyn StoreAdapter, pattern: &str) -> Result<Self, BusError> {
        let receiver = store.subscribe(pattern).await?;
        Ok(Self { pattern: pattern.to_string(), receiver })
    }

    /// Awaits the next message and decodes it, skipping (with a logged
    /// warning) any payload that isn't a valid `Event` rather than killing
    /// the subscription over one malformed delivery.
    pub async fn recv(&mut self) -> Option<Event> {
        loop {
            let message = self.receiver.recv().await?;
            match serde_json::from_str::<Event>(&message.payload) {
                Ok(event) => return Some(event),
                Err(error) => {
                    tracing::warn!(pattern = %self.pattern, %error, "dropping malformed bus payload");
                }
            }
        }
    }
}

/// A handler bound to a subscription. Implementors MUST NOT synchronously
/// await a response from the same event type they're handling — re-entrancy
/// on one's own type is not supported (spec.md §4.5).
#[async_trait]
pub trait EventHandler: Send + Sync + 'static {
    async fn handle(&self, event: Event);
}

/// Bounded worker pool gating concurrent handler invocations from one
/// subscription's dispatch loop.
pub struct Dispatcher {
    permits: Arc<Semaphore>,
}

impl Dispatcher {
    pub fn new(worker_pool_size: usize) -> Self {
        Self { permits: Arc::new(Semaphore::new(worker_pool_size.max(1))) }
    }

    /// Drains `subscription` until its channel closes, spawning each
    /// handler invocation onto its own task bounded by the pool's permits.
    pub async fn run<H: EventHandler>(&self, mut subscription: EventSubscription, handler: Arc<H>) {
        while let Some(event) = subscription.recv().await {
            let permit = match self.permits.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => break,
            };
            let handler = Arc::clone(&handler);
            tokio::spawn(async move {
                handler.handle(event).await;
                drop(permit);
            });
        }
    }
}

#[cfg(test)]
#[path = "subscriber_tests.rs"]
mod tests;
