// Copyright (c) 2026 Desaverse contributors
// Licensed under the MIT License. See LICENSE file in the project root.

//! Sensor store - single writer, snapshot readers
//!
//! All mutation goes through [`SensorStore::tick`] and
//! [`SensorStore::add_log`]. Readers take an `Arc<Snapshot>` and never observe
//! a half-applied tick.

use chrono::NaiveDateTime;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::simulator::{SensorSimulator, SimulationState, Thresholds, TickOutcome, LOG_TIME_FORMAT};
use super::{village_catalog, DrainPolicy, FleetSummary, Sensor};
use crate::alerts::{EventLog, LogEntry, LogKind};
use crate::config::{Config, SimulationConfig};
use crate::core::{Clock, EventBus, StoreEvent, SystemClock};

const STARTUP_EVENT: &str = "Monitoring system active";

/// Immutable view handed to readers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    /// Registry in catalog order
    pub sensors: Vec<Sensor>,
    /// Most recent first
    pub recent_logs: Vec<LogEntry>,
    /// Bumped on every mutation
    pub revision: u64,
    pub taken_at: NaiveDateTime,
}

impl Snapshot {
    pub fn sensor(&self, id: &str) -> Option<&Sensor> {
        self.sensors.iter().find(|s| s.id == id)
    }

    pub fn summary(&self, low_battery: u8) -> FleetSummary {
        FleetSummary::from_sensors(&self.sensors, low_battery)
    }
}

struct Writer {
    simulator: SensorSimulator,
    state: SimulationState,
    sensors: Vec<Sensor>,
    log: EventLog,
    revision: u64,
}

impl Writer {
    fn publish(&mut self, now: NaiveDateTime) -> Arc<Snapshot> {
        self.revision += 1;
        Arc::new(Snapshot {
            sensors: self.sensors.clone(),
            recent_logs: self.log.to_vec(),
            revision: self.revision,
            taken_at: now,
        })
    }
}

pub struct SensorStore {
    writer: Mutex<Writer>,
    current: RwLock<Arc<Snapshot>>,
    thresholds: Thresholds,
    bus: EventBus,
    clock: Arc<dyn Clock>,
}

impl SensorStore {
    pub fn new(config: &SimulationConfig, catalog: Vec<Sensor>, now: NaiveDateTime) -> Self {
        Self::with_policy(config, catalog, config.build_policy(), now)
    }

    /// Like [`SensorStore::new`] with an explicit drain policy
    pub fn with_policy(
        config: &SimulationConfig,
        catalog: Vec<Sensor>,
        policy: Box<dyn DrainPolicy>,
        now: NaiveDateTime,
    ) -> Self {
        let mut catalog = catalog;
        for sensor in catalog.iter_mut() {
            if !sensor.has_valid_drain_rate() {
                warn!(
                    "Sensor {} has drain rate {}, it will never drain",
                    sensor.id, sensor.drain_rate
                );
            }
            if sensor.battery > 100 {
                warn!("Sensor {} seeded with battery {}, clamped to 100", sensor.id, sensor.battery);
                sensor.battery = 100;
            }
        }

        let thresholds = config.thresholds();
        let simulator = SensorSimulator::new(policy, thresholds);

        let mut log = EventLog::new(config.log_capacity);
        log.push(LogEntry::system(
            now.format(LOG_TIME_FORMAT).to_string(),
            STARTUP_EVENT,
            LogKind::Success,
        ));

        info!(
            "Sensor store seeded with {} sensors ({} drain)",
            catalog.len(),
            simulator.policy_name()
        );

        let mut writer = Writer {
            simulator,
            state: SimulationState::new(now.date()),
            sensors: catalog,
            log,
            revision: 0,
        };
        let snapshot = writer.publish(now);

        Self {
            writer: Mutex::new(writer),
            current: RwLock::new(snapshot),
            thresholds,
            bus: EventBus::default(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Use `clock` for blank log times in [`SensorStore::add_log`]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Seed from the config catalog, or the built-in village catalog when it is empty
    pub fn from_config(config: &Config, now: NaiveDateTime) -> Self {
        let catalog = if config.catalog.is_empty() {
            village_catalog()
        } else {
            config.catalog.clone()
        };
        Self::new(&config.simulation, catalog, now)
    }

    /// Run one tick. The new state is built from a copy and only committed when the step returns.
    pub fn tick(&self, now: NaiveDateTime) -> TickOutcome {
        let mut writer = self.writer.lock();

        let mut state = writer.state.clone();
        let mut sensors = writer.sensors.clone();
        let (outcome, logs) = writer.simulator.step(&mut state, &mut sensors, now);

        writer.state = state;
        writer.sensors = sensors;
        writer.log.push_batch(logs);
        let log_len = writer.log.len();
        let snapshot = writer.publish(now);
        *self.current.write() = snapshot.clone();
        drop(writer);

        debug!("Tick committed as revision {} ({} log entries)", snapshot.revision, log_len);
        self.bus.publish(StoreEvent::Ticked { outcome, snapshot });
        outcome
    }

    /// Prepend one entry, stamped by the store clock when its time is blank
    pub fn add_log(&self, entry: LogEntry) {
        self.add_logs_at(vec![entry], self.clock.now());
    }

    /// Prepend a batch, `entries[0]` ending up at the head
    pub fn add_logs_at(&self, entries: Vec<LogEntry>, now: NaiveDateTime) {
        if entries.is_empty() {
            return;
        }

        let time = now.format(LOG_TIME_FORMAT).to_string();
        let entries: Vec<LogEntry> = entries.into_iter().map(|e| e.sanitized(&time)).collect();

        let mut writer = self.writer.lock();
        writer.log.push_batch(entries.clone());
        let snapshot = writer.publish(now);
        *self.current.write() = snapshot.clone();
        drop(writer);

        self.bus.publish(StoreEvent::LogsAdded { entries, snapshot });
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.current.read().clone()
    }

    pub fn sensor(&self, id: &str) -> Option<Sensor> {
        self.snapshot().sensor(id).cloned()
    }

    pub fn summary(&self) -> FleetSummary {
        self.snapshot().summary(self.thresholds.low_battery)
    }

    /// Drain ticks since the last daily reset
    pub fn tick_counter(&self) -> u64 {
        self.writer.lock().state.tick
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.bus.subscribe()
    }

    /// Store events published since seeding
    pub fn events_published(&self) -> u64 {
        self.bus.published()
    }
}
