// Copyright (c) 2026 Desaverse contributors
// Licensed under the MIT License. See LICENSE file in the project root.

//! Battery drain simulator for the village sensor fleet
//!
//! One call to [`SensorSimulator::step`] is one tick. A tick either performs
//! the daily maintenance reset (calendar date changed since the last tick) or
//! a drain pass over the registry in order. The drain pass emits low-battery
//! entries at most once per `log_drop_step` points below the low threshold,
//! plus one per distinct value inside the critical band.

use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use tracing::{debug, trace};

use super::{DrainPolicy, Sensor};
use crate::alerts::{LogEntry, LogKind, CRITICAL_PREFIX};

/// `HH:MM:SS`, used for log entry times
pub const LOG_TIME_FORMAT: &str = "%H:%M:%S";
/// `HH:MM`, used for a sensor's last update after a drain
pub const UPDATE_TIME_FORMAT: &str = "%H:%M";

const RESET_EVENT: &str = "Daily maintenance: battery reset";
const RESET_LAST_UPDATE: &str = "just now";
const FULL_BATTERY: u8 = 100;

/// Log suppression thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    /// Entries are only considered below this battery level
    pub low_battery: u8,
    /// Minimum drop since the last logged value before logging again
    pub log_drop_step: u8,
    /// At or below this level every distinct value is logged, with critical wording
    pub critical_battery: u8,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            low_battery: 50,
            log_drop_step: 10,
            critical_battery: 5,
        }
    }
}

/// Mutable bookkeeping carried between ticks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationState {
    /// Drain ticks since the last daily reset
    pub tick: u64,
    /// Calendar date seen by the previous tick
    pub last_day: NaiveDate,
    last_logged: HashMap<String, u8>,
}

impl SimulationState {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            tick: 0,
            last_day: today,
            last_logged: HashMap::new(),
        }
    }

    /// Battery value at the sensor's last low-battery entry, 100 if none
    pub fn last_logged(&self, sensor_id: &str) -> u8 {
        self.last_logged.get(sensor_id).copied().unwrap_or(FULL_BATTERY)
    }
}

/// What a tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Day boundary crossed, every battery restored
    Reset { sensors: usize },
    /// Normal pass
    Drained { drained: usize, logged: usize },
}

pub struct SensorSimulator {
    policy: Box<dyn DrainPolicy>,
    thresholds: Thresholds,
}

impl SensorSimulator {
    pub fn new(policy: Box<dyn DrainPolicy>, thresholds: Thresholds) -> Self {
        Self { policy, thresholds }
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    /// Advance one tick. Returns the entries to prepend, in registry order.
    pub fn step(
        &mut self,
        state: &mut SimulationState,
        sensors: &mut [Sensor],
        now: NaiveDateTime,
    ) -> (TickOutcome, Vec<LogEntry>) {
        let today = now.date();
        if today != state.last_day {
            return self.daily_reset(state, sensors, now);
        }

        state.tick += 1;
        let stamp = now.format(UPDATE_TIME_FORMAT).to_string();
        let log_time = now.format(LOG_TIME_FORMAT).to_string();

        let mut drained = 0;
        let mut logs = Vec::new();

        for sensor in sensors.iter_mut() {
            if !sensor.can_drain() {
                continue;
            }
            if !self.policy.should_drain(sensor, state.tick) {
                continue;
            }

            sensor.battery = sensor.battery.saturating_sub(1);
            sensor.last_update = stamp.clone();
            drained += 1;
            trace!("{} drained to {}%", sensor.id, sensor.battery);

            if let Some(entry) = self.low_battery_entry(state, sensor, &log_time) {
                logs.push(entry);
            }
        }

        debug!(
            "Tick {} ({}): {} drained, {} logged",
            state.tick,
            self.policy.name(),
            drained,
            logs.len()
        );

        let logged = logs.len();
        (TickOutcome::Drained { drained, logged }, logs)
    }

    fn daily_reset(
        &mut self,
        state: &mut SimulationState,
        sensors: &mut [Sensor],
        now: NaiveDateTime,
    ) -> (TickOutcome, Vec<LogEntry>) {
        state.last_day = now.date();
        state.tick = 0;
        state.last_logged.clear();

        for sensor in sensors.iter_mut() {
            sensor.battery = FULL_BATTERY;
            sensor.last_update = RESET_LAST_UPDATE.to_string();
        }

        debug!("Daily reset on {}: {} sensors restored", state.last_day, sensors.len());

        let entry = LogEntry::system(now.format(LOG_TIME_FORMAT).to_string(), RESET_EVENT, LogKind::Success);
        (TickOutcome::Reset { sensors: sensors.len() }, vec![entry])
    }

    fn low_battery_entry(&self, state: &mut SimulationState, sensor: &Sensor, time: &str) -> Option<LogEntry> {
        let battery = sensor.battery;
        if battery >= self.thresholds.low_battery {
            return None;
        }

        let last = state.last_logged(&sensor.id);
        let dropped_enough = last.saturating_sub(battery) >= self.thresholds.log_drop_step;
        let critical = battery <= self.thresholds.critical_battery;

        if !dropped_enough && !(critical && battery != last) {
            return None;
        }

        state.last_logged.insert(sensor.id.clone(), battery);

        let event = if critical {
            format!("{}: battery of {} nearly empty ({}%)", CRITICAL_PREFIX, sensor.name, battery)
        } else {
            format!("Warning: battery of {} at {}%", sensor.name, battery)
        };

        Some(LogEntry::new(time, event, LogKind::Warning, sensor.id.clone()))
    }
}
