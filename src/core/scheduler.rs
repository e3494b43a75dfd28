// Copyright (c) 2026 Desaverse contributors
// Licensed under the MIT License. See LICENSE file in the project root.

//! Tick scheduler driving the sensor store

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use super::Clock;
use crate::config::MAX_INTERVAL_SECS;
use crate::sensors::{SensorStore, TickOutcome};

const MIN_PERIOD: Duration = Duration::from_millis(10);
const MAX_PERIOD: Duration = Duration::from_secs(MAX_INTERVAL_SECS);

pub struct TickScheduler;

impl TickScheduler {
    /// Start ticking `store` every `period`. The first tick runs one period after spawn.
    /// Must be called from within a tokio runtime.
    pub fn spawn(store: Arc<SensorStore>, clock: Arc<dyn Clock>, period: Duration) -> TickHandle {
        let period = if period < MIN_PERIOD {
            warn!("Tick period {:?} too short, using {:?}", period, MIN_PERIOD);
            MIN_PERIOD
        } else if period > MAX_PERIOD {
            warn!("Tick period {:?} too long, using {:?}", period, MAX_PERIOD);
            MAX_PERIOD
        } else {
            period
        };

        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let ticks = Arc::new(AtomicU64::new(0));
        let task = tokio::spawn(run(store, clock, period, ticks.clone(), shutdown_rx));

        info!("Tick scheduler started (every {:?})", period);

        TickHandle {
            shutdown_tx,
            ticks,
            task: Some(task),
        }
    }
}

async fn run(
    store: Arc<SensorStore>,
    clock: Arc<dyn Clock>,
    period: Duration,
    ticks: Arc<AtomicU64>,
    mut shutdown: broadcast::Receiver<()>,
) {
    let start = Instant::now().checked_add(period).unwrap_or_else(Instant::now);
    let mut tick_interval = interval_at(start, period);
    tick_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = tick_interval.tick() => {
                let now = clock.now();
                match catch_unwind(AssertUnwindSafe(|| store.tick(now))) {
                    Ok(outcome) => {
                        ticks.fetch_add(1, Ordering::Relaxed);
                        match outcome {
                            TickOutcome::Reset { sensors } => info!("Daily reset at {}: {} sensors restored", now, sensors),
                            TickOutcome::Drained { drained, logged } => debug!("Tick at {}: {} drained, {} logged", now, drained, logged),
                        }
                    }
                    Err(_) => error!("Tick at {} panicked, previous snapshot kept", now),
                }
            }
            // Also fires when the handle is dropped
            _ = shutdown.recv() => {
                info!("Tick scheduler shutting down...");
                break;
            }
        }
    }
}

/// Cancellation handle for a running scheduler. Dropping it stops the task.
pub struct TickHandle {
    shutdown_tx: broadcast::Sender<()>,
    ticks: Arc<AtomicU64>,
    task: Option<JoinHandle<()>>,
}

impl TickHandle {
    /// Completed ticks so far
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().map(|t| !t.is_finished()).unwrap_or(false)
    }

    /// Signal shutdown and wait for the task to exit
    pub async fn stop(mut self) {
        let _ = self.shutdown_tx.send(());
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!("Tick scheduler task ended abnormally: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::core::ManualClock;
    use crate::sensors::{village_catalog, DrainPolicy, Sensor};
    use chrono::{NaiveDate, NaiveDateTime};

    fn morning() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 1).unwrap().and_hms_opt(8, 0, 0).unwrap()
    }

    fn setup() -> (Arc<SensorStore>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(morning()));
        let store = Arc::new(SensorStore::from_config(&Config::default(), morning()));
        (store, clock)
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_on_interval() {
        let (store, clock) = setup();
        let handle = TickScheduler::spawn(store.clone(), clock, Duration::from_secs(60));

        // Nothing at spawn time
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(handle.ticks(), 0);

        tokio::time::sleep(Duration::from_secs(271)).await;
        assert_eq!(handle.ticks(), 5);
        assert_eq!(store.tick_counter(), 5);
        assert!(handle.is_running());

        handle.stop().await;
        assert_eq!(store.snapshot().revision, 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_day_change_through_clock() {
        let (store, clock) = setup();
        let handle = TickScheduler::spawn(store.clone(), clock.clone(), Duration::from_secs(60));

        tokio::time::sleep(Duration::from_secs(121)).await;
        assert_eq!(store.tick_counter(), 2);

        clock.set(morning() + chrono::Duration::days(1));
        tokio::time::sleep(Duration::from_secs(60)).await;

        let snapshot = store.snapshot();
        assert!(snapshot.sensors.iter().all(|s| s.battery == 100));
        assert!(snapshot.recent_logs[0].is_system());
        assert_eq!(store.tick_counter(), 0);
        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_ticking() {
        let (store, clock) = setup();
        let handle = TickScheduler::spawn(store.clone(), clock, Duration::from_secs(60));
        tokio::time::sleep(Duration::from_secs(61)).await;
        drop(handle);

        let revision = store.snapshot().revision;
        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(store.snapshot().revision, revision);
    }

    #[tokio::test(start_paused = true)]
    async fn test_oversized_period_is_clamped() {
        let (store, clock) = setup();
        let handle = TickScheduler::spawn(store.clone(), clock, Duration::from_secs(u64::MAX));

        tokio::time::sleep(Duration::from_secs(MAX_INTERVAL_SECS + 1)).await;
        assert_eq!(handle.ticks(), 1);
        handle.stop().await;
    }

    struct PanickingDrain;

    impl DrainPolicy for PanickingDrain {
        fn should_drain(&mut self, _sensor: &Sensor, _tick: u64) -> bool {
            panic!("policy failure");
        }

        fn name(&self) -> &'static str {
            "panicking"
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_tick_is_contained() {
        let clock = Arc::new(ManualClock::new(morning()));
        let config = Config::default();
        let store = Arc::new(SensorStore::with_policy(
            &config.simulation,
            village_catalog(),
            Box::new(PanickingDrain),
            morning(),
        ));
        let before = store.snapshot();

        let handle = TickScheduler::spawn(store.clone(), clock, Duration::from_secs(60));
        tokio::time::sleep(Duration::from_secs(181)).await;

        assert_eq!(handle.ticks(), 0);
        assert!(handle.is_running());
        assert_eq!(store.snapshot(), before);
        handle.stop().await;
    }
}
