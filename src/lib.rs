// Copyright (c) 2026 Desaverse contributors
// Licensed under the MIT License. See LICENSE file in the project root.

//! Desaverse - Village IoT Telemetry Engine
//!
//! A simulated smart-village sensor network with:
//! - A 24-sensor village catalog (agriculture, water, weather, security, facilities, livestock)
//! - Battery drain simulation with a daily maintenance reset
//! - A bounded, most-recent-first alert log with low-battery suppression
//! - BMKG weather forecast polling into the same log
//! - Fleet statistics, alert filtering and CSV / JSON lines export
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                    Desaverse Engine                      │
//! ├──────────────────────────────────────────────────────────┤
//! │  ┌───────────┐   tick    ┌─────────────────────────────┐ │
//! │  │   Tick    │ ────────→ │        Sensor Store         │ │
//! │  │ Scheduler │           │  simulator + log (1 writer) │ │
//! │  └───────────┘           └─────────────────────────────┘ │
//! │  ┌───────────┐  add_log        ↓ Arc<Snapshot>          │
//! │  │  Weather  │ ────────→ ┌─────────────────────────────┐ │
//! │  │  Poller   │           │          Event Bus          │ │
//! │  └───────────┘           └─────────────────────────────┘ │
//! │                                ↓                         │
//! │       ┌──────────────┐  ┌──────────────┐  ┌──────────┐   │
//! │       │ FleetSummary │  │ AlertFilter  │  │  Export  │   │
//! │       └──────────────┘  └──────────────┘  └──────────┘   │
//! └──────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![allow(dead_code)]

pub mod alerts;
pub mod config;
pub mod core;
pub mod export;
pub mod sensors;
pub mod weather;

// Re-exports for convenience
pub use alerts::{AlertFilter, AlertStats, LogEntry, LogKind};
pub use config::Config;
pub use core::{Clock, Engine, EventBus, ManualClock, SystemClock, TickScheduler};
pub use export::{ExportFormat, SnapshotExporter};
pub use sensors::{FleetSummary, Sensor, SensorStatus, SensorStore, Snapshot, TickOutcome};
pub use weather::{BmkgClient, WeatherPoller, WeatherSource};

/// Desaverse version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Desaverse name
pub const NAME: &str = "Desaverse";

/// Build info
pub fn build_info() -> BuildInfo {
    BuildInfo {
        version: VERSION.to_string(),
        target: std::env::consts::ARCH.to_string(),
        os: std::env::consts::OS.to_string(),
    }
}

/// Build information
#[derive(Debug, Clone)]
pub struct BuildInfo {
    /// Version string
    pub version: String,
    /// Target architecture
    pub target: String,
    /// Operating system
    pub os: String,
}
