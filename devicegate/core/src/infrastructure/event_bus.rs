// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Event Bus Implementation - Pub/Sub for Domain Events
//
// Synchronous in-process fan-out: `emit` delivers on the emitting
// thread, FIFO per emitter, to the listeners registered for the event's
// kind. The bus spawns no threads; listeners must be non-blocking or
// offload themselves. A panicking listener is isolated and reported as
// a `ServiceError` event without affecting the other listeners.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::warn;

use crate::domain::events::{DomainEvent, EventKind};

/// A registered event callback.
pub type Listener = Arc<dyn Fn(&DomainEvent) + Send + Sync>;

/// In-process typed publish/subscribe bus for [`DomainEvent`]s.
#[derive(Default)]
pub struct DomainEventBus {
    listeners: RwLock<HashMap<EventKind, Vec<Listener>>>,
}

impl DomainEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` for events of `kind`. Idempotent per
    /// (listener, kind): re-registering the same `Arc` is a no-op.
    pub fn register(&self, kind: EventKind, listener: Listener) {
        let mut listeners = self.listeners.write();
        let registered = listeners.entry(kind).or_default();
        if !registered.iter().any(|existing| Arc::ptr_eq(existing, &listener)) {
            registered.push(listener);
        }
    }

    /// Deliver `event` to every listener registered for its kind, in
    /// registration order, on the calling thread.
    pub fn emit(&self, event: DomainEvent) {
        let snapshot = {
            let listeners = self.listeners.read();
            listeners.get(&event.kind()).cloned().unwrap_or_default()
        };

        for listener in snapshot {
            if let Err(panic) = catch_unwind(AssertUnwindSafe(|| listener(&event))) {
                let message = panic_message(&panic);
                warn!(kind = ?event.kind(), %message, "event listener panicked");
                // Report the fault to ServiceError listeners, unless the
                // faulting listener was itself handling a ServiceError
                // (no recursive re-entry).
                if event.kind() != EventKind::ServiceError {
                    self.emit(DomainEvent::service_error(format!(
                        "event listener panicked: {message}"
                    )));
                }
            }
        }
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners
            .read()
            .get(&kind)
            .map_or(0, |listeners| listeners.len())
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
