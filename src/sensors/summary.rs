// Copyright (c) 2026 Desaverse contributors
// Licensed under the MIT License. See LICENSE file in the project root.

//! Fleet statistics for the monitoring and home pages

use serde::Serialize;

use super::{Sensor, SensorStatus};

/// Battery range a sensor falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BatteryBand {
    Good, // > 80
    Fair, // > 50
    Low,
}

impl BatteryBand {
    pub fn of(battery: u8) -> Self {
        if battery > 80 {
            BatteryBand::Good
        } else if battery > 50 {
            BatteryBand::Fair
        } else {
            BatteryBand::Low
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FleetSummary {
    pub total: usize,
    pub online: usize,
    pub warning: usize,
    pub offline: usize,
    pub average_battery: f64,
    pub good: usize,
    pub fair: usize,
    pub low: usize,
    /// Ids below the low-battery threshold, emptiest first
    pub low_battery: Vec<String>,
}

impl FleetSummary {
    pub fn from_sensors(sensors: &[Sensor], low_threshold: u8) -> Self {
        let mut summary = FleetSummary {
            total: sensors.len(),
            ..Default::default()
        };

        let mut battery_sum = 0u64;
        let mut low: Vec<&Sensor> = Vec::new();

        for sensor in sensors {
            match sensor.status {
                SensorStatus::Online => summary.online += 1,
                SensorStatus::Warning => summary.warning += 1,
                SensorStatus::Offline => summary.offline += 1,
            }
            match BatteryBand::of(sensor.battery) {
                BatteryBand::Good => summary.good += 1,
                BatteryBand::Fair => summary.fair += 1,
                BatteryBand::Low => summary.low += 1,
            }
            battery_sum += u64::from(sensor.battery);
            if sensor.battery < low_threshold {
                low.push(sensor);
            }
        }

        if !sensors.is_empty() {
            summary.average_battery = battery_sum as f64 / sensors.len() as f64;
        }

        // Stable, so equal batteries keep registry order
        low.sort_by_key(|s| s.battery);
        summary.low_battery = low.into_iter().map(|s| s.id.clone()).collect();

        summary
    }

    /// "online/total"
    pub fn active_label(&self) -> String {
        format!("{}/{}", self.online, self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::village_catalog;

    #[test]
    fn test_bands() {
        assert_eq!(BatteryBand::of(100), BatteryBand::Good);
        assert_eq!(BatteryBand::of(81), BatteryBand::Good);
        assert_eq!(BatteryBand::of(80), BatteryBand::Fair);
        assert_eq!(BatteryBand::of(51), BatteryBand::Fair);
        assert_eq!(BatteryBand::of(50), BatteryBand::Low);
        assert_eq!(BatteryBand::of(0), BatteryBand::Low);
    }

    #[test]
    fn test_empty_fleet() {
        let summary = FleetSummary::from_sensors(&[], 50);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.average_battery, 0.0);
        assert_eq!(summary.active_label(), "0/0");
    }

    #[test]
    fn test_village_summary() {
        let summary = FleetSummary::from_sensors(&village_catalog(), 50);
        assert_eq!(summary.total, 24);
        assert_eq!(summary.online + summary.warning + summary.offline, 24);
        assert_eq!(summary.offline, 1);
        assert_eq!(summary.warning, 4);
        assert_eq!(summary.active_label(), "19/24");
        assert_eq!(summary.good + summary.fair + summary.low, 24);

        assert_eq!(summary.low_battery.first().map(String::as_str), Some("LIGHT-02"));
        assert_eq!(summary.low_battery[1], "FEED-01");
        assert_eq!(summary.low_battery.len(), 6);
    }
}
