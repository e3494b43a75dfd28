// Copyright (c) 2026 Desaverse contributors
// Licensed under the MIT License. See LICENSE file in the project root.

//! Configuration module

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::alerts::DEFAULT_LOG_CAPACITY;
use crate::export::ExportConfig;
use crate::sensors::simulator::Thresholds;
use crate::sensors::{DrainPolicy, RandomDrain, ScheduledDrain, Sensor};
use crate::weather::WeatherConfig;

/// Longest accepted tick or poll period, one day
pub const MAX_INTERVAL_SECS: u64 = 86_400;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to access config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level
    pub log_level: String,

    /// Simulation configuration
    pub simulation: SimulationConfig,

    /// Weather configuration
    pub weather: WeatherConfig,

    /// Export configuration
    pub export: ExportConfig,

    /// Replaces the built-in village catalog when non-empty
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub catalog: Vec<Sensor>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            simulation: SimulationConfig::default(),
            weather: WeatherConfig::default(),
            export: ExportConfig::default(),
            catalog: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Load or create default configuration
    pub fn load_or_create(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            let config = Self::default();

            // Create parent directories
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            config.save(path)?;
            Ok(config)
        }
    }

    /// Get configuration directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("desaverse"))
            .unwrap_or_else(|| PathBuf::from("./config"))
    }

    /// Get default configuration path
    pub fn default_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Reject values the simulator cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sim = &self.simulation;

        if sim.tick_interval_secs == 0 || sim.tick_interval_secs > MAX_INTERVAL_SECS {
            return Err(ConfigError::Invalid(format!(
                "simulation.tick_interval_secs must be within 1..={}, got {}",
                MAX_INTERVAL_SECS, sim.tick_interval_secs
            )));
        }
        if sim.log_capacity == 0 {
            return Err(ConfigError::Invalid("simulation.log_capacity must be > 0".into()));
        }
        if sim.log_drop_step == 0 {
            return Err(ConfigError::Invalid("simulation.log_drop_step must be > 0".into()));
        }
        if sim.low_battery_threshold > 100 {
            return Err(ConfigError::Invalid("simulation.low_battery_threshold must be <= 100".into()));
        }
        if sim.critical_battery >= sim.low_battery_threshold {
            return Err(ConfigError::Invalid(format!(
                "simulation.critical_battery ({}) must be below low_battery_threshold ({})",
                sim.critical_battery, sim.low_battery_threshold
            )));
        }
        if !(0.0..=1.0).contains(&sim.drain_probability) {
            return Err(ConfigError::Invalid(format!(
                "simulation.drain_probability must be within 0..=1, got {}",
                sim.drain_probability
            )));
        }
        if self.weather.enabled
            && (self.weather.poll_interval_secs == 0 || self.weather.poll_interval_secs > MAX_INTERVAL_SECS)
        {
            return Err(ConfigError::Invalid(format!(
                "weather.poll_interval_secs must be within 1..={}, got {}",
                MAX_INTERVAL_SECS, self.weather.poll_interval_secs
            )));
        }

        self.validate_catalog()
    }

    /// Ids must be unique and batteries within 0..=100
    fn validate_catalog(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for sensor in &self.catalog {
            if sensor.id.trim().is_empty() {
                return Err(ConfigError::Invalid("catalog entry with an empty id".into()));
            }
            if sensor.battery > 100 {
                return Err(ConfigError::Invalid(format!(
                    "catalog sensor {} has battery {}, must be <= 100",
                    sensor.id, sensor.battery
                )));
            }
            if !seen.insert(sensor.id.as_str()) {
                return Err(ConfigError::Invalid(format!("duplicate catalog sensor id {}", sensor.id)));
            }
        }
        Ok(())
    }
}

/// Which drain policy the simulator runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrainPolicyKind {
    Scheduled,
    Random,
}

/// Simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seconds between ticks
    pub tick_interval_secs: u64,

    /// Maximum entries kept in the log
    pub log_capacity: usize,

    pub low_battery_threshold: u8,

    pub log_drop_step: u8,

    pub critical_battery: u8,

    pub drain_policy: DrainPolicyKind,

    /// Per-sensor drain chance for the random policy
    pub drain_probability: f64,

    /// Seed for the random policy, entropy when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let thresholds = Thresholds::default();
        Self {
            tick_interval_secs: 60,
            log_capacity: DEFAULT_LOG_CAPACITY,
            low_battery_threshold: thresholds.low_battery,
            log_drop_step: thresholds.log_drop_step,
            critical_battery: thresholds.critical_battery,
            drain_policy: DrainPolicyKind::Scheduled,
            drain_probability: 0.5,
            seed: None,
        }
    }
}

impl SimulationConfig {
    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            low_battery: self.low_battery_threshold,
            log_drop_step: self.log_drop_step,
            critical_battery: self.critical_battery,
        }
    }

    pub fn build_policy(&self) -> Box<dyn DrainPolicy> {
        match self.drain_policy {
            DrainPolicyKind::Scheduled => Box::new(ScheduledDrain),
            DrainPolicyKind::Random => Box::new(RandomDrain::new(self.drain_probability, self.seed)),
        }
    }
}
