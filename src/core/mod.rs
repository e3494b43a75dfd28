// Copyright (c) 2026 Desaverse contributors
// Licensed under the MIT License. See LICENSE file in the project root.

//! Core engine module - wires the store, scheduler and weather poller

mod clock;
mod engine;
mod event_bus;
mod scheduler;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{Engine, FastForward};
pub use event_bus::{EventBus, StoreEvent};
pub use scheduler::{TickHandle, TickScheduler};

use serde::{Deserialize, Serialize};

/// System-wide state
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SystemState {
    pub running: bool,
    /// Tick task alive
    pub ticking: bool,
    pub sensors_total: usize,
    pub sensors_online: usize,
    pub ticks: u64,
    pub log_entries: usize,
    pub revision: u64,
    pub events_published: u64,
    pub weather_enabled: bool,
    pub uptime_seconds: u64,
}
