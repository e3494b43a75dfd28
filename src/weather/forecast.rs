// Copyright (c) 2026 Desaverse contributors
// Licensed under the MIT License. See LICENSE file in the project root.

//! BMKG forecast payload and conversion into log entries

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

use super::{WeatherError, WeatherThresholds};
use crate::alerts::{LogEntry, LogKind};
use crate::sensors::simulator::LOG_TIME_FORMAT;

/// Sensor id used for entries derived from the forecast
pub const WEATHER_SENSOR: &str = "WEATHER";

/// `{ data: [ { cuaca: T[][] } ] }`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForecastResponse {
    #[serde(default)]
    pub data: Vec<ForecastArea>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForecastArea {
    #[serde(default)]
    pub cuaca: Vec<Vec<ForecastStep>>,
}

/// One forecast step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastStep {
    /// Temperature, °C
    #[serde(default, deserialize_with = "lenient_number")]
    pub t: Option<f64>,
    /// Relative humidity, %
    #[serde(default, deserialize_with = "lenient_number")]
    pub hu: Option<f64>,
    /// Wind speed, km/h
    #[serde(default, deserialize_with = "lenient_number")]
    pub ws: Option<f64>,
    /// Cloud cover, %
    #[serde(default, deserialize_with = "lenient_number")]
    pub tcc: Option<f64>,
    #[serde(default)]
    pub vs_text: Option<String>,
    #[serde(default)]
    pub datetime: Option<String>,
}

// The endpoint sometimes quotes numbers
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

impl ForecastResponse {
    pub fn parse(body: &str) -> Result<Self, WeatherError> {
        Ok(serde_json::from_str(body)?)
    }

    /// All steps of the first area, flattened in order
    pub fn steps(&self) -> Vec<&ForecastStep> {
        self.data
            .first()
            .map(|area| area.cuaca.iter().flatten().collect())
            .unwrap_or_default()
    }

    /// The nearest forecast step, taken as current conditions
    pub fn current_conditions(&self) -> Result<ForecastStep, WeatherError> {
        self.steps().first().copied().cloned().ok_or(WeatherError::Empty)
    }
}

fn show(value: Option<f64>) -> String {
    value.map(|v| format!("{:.0}", v)).unwrap_or_else(|| "-".to_string())
}

/// One `info` summary plus a `warning` per exceeded threshold
pub fn conditions_to_logs(step: &ForecastStep, now: NaiveDateTime, thresholds: &WeatherThresholds) -> Vec<LogEntry> {
    let time = now.format(LOG_TIME_FORMAT).to_string();
    let mut summary = format!(
        "Weather update: {}°C, humidity {}%, wind {} km/h",
        show(step.t),
        show(step.hu),
        show(step.ws)
    );
    if let Some(visibility) = step.vs_text.as_deref().filter(|v| !v.is_empty()) {
        summary.push_str(&format!(", visibility {}", visibility));
    }

    let mut logs = vec![LogEntry::new(time.clone(), summary, LogKind::Info, WEATHER_SENSOR)];

    if let Some(t) = step.t.filter(|t| *t >= thresholds.hot_temperature) {
        logs.push(LogEntry::new(
            time.clone(),
            format!("High temperature detected ({:.0}°C), limit outdoor activity", t),
            LogKind::Warning,
            WEATHER_SENSOR,
        ));
    }
    if let Some(ws) = step.ws.filter(|ws| *ws >= thresholds.strong_wind) {
        logs.push(LogEntry::new(
            time.clone(),
            format!("Strong wind detected ({:.0} km/h)", ws),
            LogKind::Warning,
            WEATHER_SENSOR,
        ));
    }
    if let Some(hu) = step.hu.filter(|hu| *hu >= thresholds.high_humidity) {
        logs.push(LogEntry::new(
            time,
            format!("High humidity ({:.0}%)", hu),
            LogKind::Warning,
            WEATHER_SENSOR,
        ));
    }

    logs
}
