// Copyright (c) 2026 Desaverse contributors
// Licensed under the MIT License. See LICENSE file in the project root.

//! Alert log - bounded event log and alert page queries

mod log;
mod filter;

pub use log::{EventLog, LogEntry, LogKind, CRITICAL_PREFIX, DEFAULT_LOG_CAPACITY, SYSTEM_SENSOR};
pub use filter::{AlertFilter, AlertStats};
