// Copyright (c) 2026 Desaverse contributors
// Licensed under the MIT License. See LICENSE file in the project root.

//! Built-in village sensor catalog

use super::{Sensor, SensorGroup, SensorStatus, SignalStrength};

struct Entry {
    id: &'static str,
    name: &'static str,
    location: &'static str,
    group: SensorGroup,
    status: SensorStatus,
    battery: u8,
    signal: SignalStrength,
    last_update: &'static str,
    drain_rate: i64,
}

use SensorGroup::*;
use SensorStatus::{Offline, Online, Warning};
use SignalStrength::{Excellent, Fair, Good, NoSignal, Weak};

const ENTRIES: [Entry; 24] = [
    // Agriculture
    Entry { id: "SOIL-01", name: "Paddy Soil Moisture", location: "Rice Field Block A (East)", group: Agriculture, status: Online, battery: 85, signal: Excellent, last_update: "10 min ago", drain_rate: 5 },
    Entry { id: "SOIL-02", name: "Corn Soil Moisture", location: "Farmer Group 1 Field", group: Agriculture, status: Online, battery: 90, signal: Good, last_update: "15 min ago", drain_rate: 8 },
    Entry { id: "PH-01", name: "Soil pH Level", location: "Chili Garden", group: Agriculture, status: Online, battery: 78, signal: Good, last_update: "1 hour ago", drain_rate: 15 },
    Entry { id: "TEMP-AGRI", name: "Greenhouse Temperature", location: "Hydroponic Greenhouse", group: Agriculture, status: Online, battery: 95, signal: Excellent, last_update: "5 sec ago", drain_rate: 3 },
    Entry { id: "PEST-01", name: "Automatic Pest Trap", location: "Rice Field Block B (West)", group: Agriculture, status: Warning, battery: 35, signal: Fair, last_update: "30 min ago", drain_rate: 10 },
    // Water & irrigation
    Entry { id: "WLVL-01", name: "Main River Water Level", location: "Village Suspension Bridge", group: Water, status: Online, battery: 98, signal: Excellent, last_update: "realtime", drain_rate: 4 },
    Entry { id: "WLVL-02", name: "Irrigation Gate Level", location: "Secondary Water Gate", group: Water, status: Warning, battery: 20, signal: Good, last_update: "5 min ago", drain_rate: 6 },
    Entry { id: "WQ-01", name: "Water Quality (Turbidity)", location: "Village Fish Pond", group: Water, status: Online, battery: 88, signal: Excellent, last_update: "10 min ago", drain_rate: 12 },
    Entry { id: "FLOW-01", name: "Inflow Discharge", location: "Main Irrigation Channel", group: Water, status: Online, battery: 72, signal: Good, last_update: "2 min ago", drain_rate: 5 },
    // Weather & microclimate
    Entry { id: "RAIN-01", name: "Rainfall Station 1", location: "Village Hall Roof", group: Weather, status: Online, battery: 100, signal: Excellent, last_update: "1 min ago", drain_rate: 20 },
    Entry { id: "WIND-01", name: "Wind Speed", location: "Open Field", group: Weather, status: Online, battery: 92, signal: Excellent, last_update: "realtime", drain_rate: 2 },
    Entry { id: "UV-01", name: "UV Index", location: "Rice Drying Area", group: Weather, status: Online, battery: 80, signal: Good, last_update: "10 min ago", drain_rate: 30 },
    // Security & environment
    Entry { id: "AQI-01", name: "Air Quality (Dust)", location: "Village Main Road", group: Security, status: Online, battery: 65, signal: Good, last_update: "5 min ago", drain_rate: 10 },
    Entry { id: "LAND-01", name: "Ground Shift Detector", location: "North Hill Slope", group: Security, status: Online, battery: 90, signal: Weak, last_update: "1 hour ago", drain_rate: 60 },
    Entry { id: "FIRE-01", name: "Hotspot Detector", location: "Village Border Forest", group: Security, status: Online, battery: 96, signal: Fair, last_update: "2 min ago", drain_rate: 45 },
    Entry { id: "GATE-01", name: "Entrance Gate Sensor", location: "Main Village Gate", group: Security, status: Online, battery: 85, signal: Excellent, last_update: "realtime", drain_rate: 5 },
    // Public facilities & energy
    Entry { id: "LIGHT-01", name: "Street Light 1", location: "Market Crossroads", group: Facilities, status: Online, battery: 45, signal: Good, last_update: "1 min ago", drain_rate: 10 },
    Entry { id: "LIGHT-02", name: "Street Light 2", location: "Cemetery Road", group: Facilities, status: Offline, battery: 0, signal: NoSignal, last_update: "1 day ago", drain_rate: 999 },
    Entry { id: "NRGY-01", name: "Solar Panel Output", location: "Health Post Roof", group: Facilities, status: Online, battery: 100, signal: Excellent, last_update: "10 sec ago", drain_rate: 15 },
    Entry { id: "WASTE-01", name: "Waste Bin Capacity", location: "Market Waste Depot", group: Facilities, status: Warning, battery: 40, signal: Good, last_update: "30 min ago", drain_rate: 25 },
    // Livestock
    Entry { id: "COW-01", name: "Cattle Tracker (GPS)", location: "Pasture", group: Livestock, status: Online, battery: 55, signal: Fair, last_update: "5 min ago", drain_rate: 3 },
    Entry { id: "TEMP-COOP", name: "Chicken Coop Temperature", location: "Coop Group 2", group: Livestock, status: Online, battery: 82, signal: Good, last_update: "1 min ago", drain_rate: 8 },
    Entry { id: "FEED-01", name: "Automatic Feed Stock", location: "Feed Warehouse", group: Livestock, status: Warning, battery: 15, signal: Good, last_update: "2 hours ago", drain_rate: 12 },
    Entry { id: "AMMO-01", name: "Ammonia Gas Level", location: "Cattle Shed Area", group: Livestock, status: Online, battery: 77, signal: Excellent, last_update: "10 min ago", drain_rate: 10 },
];

/// The 24-sensor village deployment used when the config carries no catalog
pub fn village_catalog() -> Vec<Sensor> {
    ENTRIES
        .iter()
        .map(|e| Sensor {
            id: e.id.to_string(),
            name: e.name.to_string(),
            location: e.location.to_string(),
            group: e.group,
            status: e.status,
            battery: e.battery,
            signal: e.signal,
            last_update: e.last_update.to_string(),
            drain_rate: e.drain_rate,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_size_and_unique_ids() {
        let catalog = village_catalog();
        assert_eq!(catalog.len(), 24);
        let ids: HashSet<&str> = catalog.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids.len(), 24);
    }

    #[test]
    fn test_catalog_values_in_range() {
        for sensor in village_catalog() {
            assert!(sensor.battery <= 100, "{} battery out of range", sensor.id);
            assert!(sensor.drain_rate > 0, "{} has no drain rate", sensor.id);
        }
    }

    #[test]
    fn test_dead_street_light_is_offline() {
        let catalog = village_catalog();
        let light = catalog.iter().find(|s| s.id == "LIGHT-02").unwrap();
        assert_eq!(light.status, SensorStatus::Offline);
        assert_eq!(light.battery, 0);
        assert_eq!(light.signal, SignalStrength::NoSignal);
    }
}
