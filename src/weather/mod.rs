// Copyright (c) 2026 Desaverse contributors
// Licensed under the MIT License. See LICENSE file in the project root.

//! Weather module - BMKG forecast collaborator feeding the alert log
//!
//! The simulator never fetches weather itself. This module pulls the regional
//! forecast, takes the nearest step as current conditions and hands the
//! derived entries to [`crate::sensors::SensorStore::add_logs_at`].

mod forecast;
mod poller;

pub use forecast::{conditions_to_logs, ForecastArea, ForecastResponse, ForecastStep, WEATHER_SENSOR};
pub use poller::WeatherPoller;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Forecast endpoint returned status {0}")]
    Status(u16),
    #[error("Invalid forecast JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Forecast contains no steps")]
    Empty,
}

/// Alert limits applied to current conditions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherThresholds {
    /// °C
    pub hot_temperature: f64,
    /// km/h
    pub strong_wind: f64,
    /// %
    pub high_humidity: f64,
}

impl Default for WeatherThresholds {
    fn default() -> Self {
        Self {
            hot_temperature: 34.0,
            strong_wind: 25.0,
            high_humidity: 90.0,
        }
    }
}

/// Weather configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// Poll the forecast endpoint
    pub enabled: bool,
    pub endpoint: String,
    /// BMKG administrative level-4 region code
    pub region_code: String,
    pub poll_interval_secs: u64,
    pub timeout_secs: u64,
    pub thresholds: WeatherThresholds,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "https://desaverse.up.railway.app/index.php".to_string(),
            region_code: "35.07.26.2003".to_string(),
            poll_interval_secs: 1800,
            timeout_secs: 15,
            thresholds: WeatherThresholds::default(),
        }
    }
}

/// Anything that can produce a forecast
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn fetch(&self) -> Result<ForecastResponse, WeatherError>;

    fn name(&self) -> &str;
}

/// HTTP client for the BMKG forecast proxy
pub struct BmkgClient {
    client: Client,
    endpoint: String,
    region_code: String,
}

impl BmkgClient {
    pub fn new(config: &WeatherConfig) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            region_code: config.region_code.clone(),
        })
    }
}

#[async_trait]
impl WeatherSource for BmkgClient {
    async fn fetch(&self) -> Result<ForecastResponse, WeatherError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("action", "bmkg_prakiraan"), ("adm4", self.region_code.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(WeatherError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        debug!("Forecast response: {} bytes", body.len());
        ForecastResponse::parse(&body)
    }

    fn name(&self) -> &str {
        "bmkg"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = WeatherConfig::default();
        assert!(config.enabled);
        assert_eq!(config.region_code, "35.07.26.2003");
        assert_eq!(config.thresholds.hot_temperature, 34.0);
        assert_eq!(config.thresholds.strong_wind, 25.0);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: WeatherConfig = toml::from_str("enabled = false\n[thresholds]\nstrong_wind = 40.0\n").unwrap();
        assert!(!config.enabled);
        assert_eq!(config.poll_interval_secs, 1800);
        assert_eq!(config.thresholds.strong_wind, 40.0);
        assert_eq!(config.thresholds.high_humidity, 90.0);
    }

    #[test]
    fn test_client_builds() {
        let client = BmkgClient::new(&WeatherConfig::default()).unwrap();
        assert_eq!(client.name(), "bmkg");
    }
}
