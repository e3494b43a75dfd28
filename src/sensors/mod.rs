// Copyright (c) 2026 Desaverse contributors
// Licensed under the MIT License. See LICENSE file in the project root.

//! Sensor module - village fleet, drain simulation and the shared store

mod catalog;
pub mod simulator;
mod store;
mod summary;
mod traits;

pub use catalog::village_catalog;
pub use simulator::{SensorSimulator, SimulationState, Thresholds, TickOutcome};
pub use store::{SensorStore, Snapshot};
pub use summary::{BatteryBand, FleetSummary};
pub use traits::{DrainPolicy, RandomDrain, ScheduledDrain, Sensor, SensorGroup, SensorStatus, SignalStrength};
