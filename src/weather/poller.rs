// Copyright (c) 2026 Desaverse contributors
// Licensed under the MIT License. See LICENSE file in the project root.

//! Periodic forecast polling into the sensor store

use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::{conditions_to_logs, WeatherError, WeatherSource, WeatherThresholds};
use crate::core::Clock;
use crate::sensors::SensorStore;

pub struct WeatherPoller {
    source: Arc<dyn WeatherSource>,
    store: Arc<SensorStore>,
    clock: Arc<dyn Clock>,
    thresholds: WeatherThresholds,
}

impl WeatherPoller {
    pub fn new(
        source: Arc<dyn WeatherSource>,
        store: Arc<SensorStore>,
        clock: Arc<dyn Clock>,
        thresholds: WeatherThresholds,
    ) -> Self {
        Self {
            source,
            store,
            clock,
            thresholds,
        }
    }

    /// Fetch once and append the derived entries. Returns how many were added.
    pub async fn poll_once(&self) -> Result<usize, WeatherError> {
        let forecast = self.source.fetch().await?;
        let current = forecast.current_conditions()?;
        let now = self.clock.now();
        let logs = conditions_to_logs(&current, now, &self.thresholds);
        let count = logs.len();
        self.store.add_logs_at(logs, now);
        debug!("Weather poll via {} added {} entries", self.source.name(), count);
        Ok(count)
    }

    /// Poll until shutdown. A failed fetch is logged and retried on the next period.
    pub async fn run(self, period: Duration, mut shutdown: broadcast::Receiver<()>) {
        info!("Starting weather poller ({}, every {:?})", self.source.name(), period);
        let mut poll_interval = interval(period);
        poll_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = poll_interval.tick() => {
                    if let Err(e) = self.poll_once().await {
                        warn!("Weather poll failed: {}", e);
                    }
                }
                _ = shutdown.recv() => {
                    info!("Weather poller shutting down...");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::core::ManualClock;
    use crate::weather::{ForecastResponse, WEATHER_SENSOR};
    use async_trait::async_trait;
    use chrono::NaiveDate;

    struct FixedSource(&'static str);

    #[async_trait]
    impl WeatherSource for FixedSource {
        async fn fetch(&self) -> Result<ForecastResponse, WeatherError> {
            ForecastResponse::parse(self.0)
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    fn setup(body: &'static str) -> (WeatherPoller, Arc<SensorStore>) {
        let now = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap().and_hms_opt(9, 0, 0).unwrap();
        let clock = Arc::new(ManualClock::new(now));
        let store = Arc::new(SensorStore::from_config(&Config::default(), now));
        let poller = WeatherPoller::new(
            Arc::new(FixedSource(body)),
            store.clone(),
            clock,
            WeatherThresholds::default(),
        );
        (poller, store)
    }

    #[tokio::test]
    async fn test_poll_appends_entries() {
        let (poller, store) = setup(r#"{"data": [{"cuaca": [[{"t": 36, "hu": 60, "ws": 5}]]}]}"#);
        let added = poller.poll_once().await.unwrap();
        assert_eq!(added, 2);

        let snapshot = store.snapshot();
        assert_eq!(snapshot.recent_logs.len(), 3);
        assert!(snapshot.recent_logs[0].event.starts_with("Weather update"));
        assert_eq!(snapshot.recent_logs[1].sensor, WEATHER_SENSOR);
        assert!(snapshot.recent_logs[2].is_system());
    }

    #[tokio::test]
    async fn test_poll_failure_leaves_log_untouched() {
        let (poller, store) = setup(r#"{"data": []}"#);
        let before = store.snapshot();
        assert!(matches!(poller.poll_once().await, Err(WeatherError::Empty)));
        assert_eq!(store.snapshot().recent_logs, before.recent_logs);
    }
}
