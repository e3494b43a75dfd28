// Copyright (c) 2026 Desaverse contributors
// Licensed under the MIT License. See LICENSE file in the project root.

//! Event bus announcing store changes

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::alerts::LogEntry;
use crate::sensors::{Snapshot, TickOutcome};

/// What changed in the store
#[derive(Debug, Clone)]
pub enum StoreEvent {
    /// A tick finished and published this snapshot
    Ticked {
        outcome: TickOutcome,
        snapshot: Arc<Snapshot>,
    },
    /// Entries were prepended from outside the tick
    LogsAdded {
        entries: Vec<LogEntry>,
        snapshot: Arc<Snapshot>,
    },
}

impl StoreEvent {
    pub fn snapshot(&self) -> &Arc<Snapshot> {
        match self {
            StoreEvent::Ticked { snapshot, .. } | StoreEvent::LogsAdded { snapshot, .. } => snapshot,
        }
    }
}

/// Broadcast channel for store events. Publishing with no subscriber is a no-op.
pub struct EventBus {
    event_tx: broadcast::Sender<StoreEvent>,
    event_counter: AtomicU64,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (event_tx, _) = broadcast::channel(capacity.max(1));

        Self {
            event_tx,
            event_counter: AtomicU64::new(0),
        }
    }

    pub fn publish(&self, event: StoreEvent) {
        self.event_counter.fetch_add(1, Ordering::Relaxed);
        let _ = self.event_tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.event_tx.subscribe()
    }

    /// Events published since creation
    pub fn published(&self) -> u64 {
        self.event_counter.load(Ordering::Relaxed)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}
