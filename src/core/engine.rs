// Copyright (c) 2026 Desaverse contributors
// Licensed under the MIT License. See LICENSE file in the project root.

//! Main engine

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::{Clock, SystemClock, SystemState, TickHandle, TickScheduler};
use crate::config::Config;
use crate::export::{ExportReport, SnapshotExporter};
use crate::sensors::{SensorStore, TickOutcome};
use crate::weather::{BmkgClient, WeatherPoller, WeatherSource};

/// Totals from a synchronous run of ticks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FastForward {
    pub ticks: u64,
    pub resets: u64,
    pub drained: usize,
    pub logged: usize,
}

struct WeatherTask {
    shutdown_tx: broadcast::Sender<()>,
    task: JoinHandle<()>,
}

/// Main Desaverse engine
pub struct Engine {
    pub config: Arc<Config>,
    store: Arc<SensorStore>,
    clock: Arc<dyn Clock>,
    state: Arc<RwLock<SystemState>>,
    start_time: Option<Instant>,
    ticker: Option<TickHandle>,
    weather: Option<WeatherTask>,
}

impl Engine {
    pub async fn new(config: Config) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock)).await
    }

    pub async fn with_clock(config: Config, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate().context("Invalid configuration")?;
        let store = Arc::new(SensorStore::from_config(&config, clock.now()).with_clock(clock.clone()));

        Ok(Self {
            config: Arc::new(config),
            store,
            clock,
            state: Arc::new(RwLock::new(SystemState::default())),
            start_time: None,
            ticker: None,
            weather: None,
        })
    }

    pub async fn start(&mut self) -> Result<()> {
        info!("Starting Desaverse engine...");
        self.start_time = Some(Instant::now());

        let period = Duration::from_secs(self.config.simulation.tick_interval_secs);
        self.ticker = Some(TickScheduler::spawn(self.store.clone(), self.clock.clone(), period));

        if self.config.weather.enabled {
            let client = BmkgClient::new(&self.config.weather).context("Failed to build weather client")?;
            self.start_weather(Arc::new(client));
        }

        {
            let mut state = self.state.write().await;
            state.running = true;
            state.weather_enabled = self.weather.is_some();
        }

        info!("Desaverse engine started");
        Ok(())
    }

    /// Start polling a specific forecast source
    pub fn start_weather(&mut self, source: Arc<dyn WeatherSource>) {
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let poller = WeatherPoller::new(
            source,
            self.store.clone(),
            self.clock.clone(),
            self.config.weather.thresholds.clone(),
        );
        let period = Duration::from_secs(self.config.weather.poll_interval_secs.max(1));
        let task = tokio::spawn(poller.run(period, shutdown_rx));
        self.weather = Some(WeatherTask { shutdown_tx, task });
    }

    pub async fn stop(&mut self) -> Result<()> {
        info!("Stopping Desaverse engine...");

        if let Some(ticker) = self.ticker.take() {
            ticker.stop().await;
        }

        if let Some(weather) = self.weather.take() {
            let _ = weather.shutdown_tx.send(());
            if let Err(e) = weather.task.await {
                warn!("Weather poller ended abnormally: {}", e);
            }
        }

        {
            let mut state = self.state.write().await;
            state.running = false;
        }

        if self.config.export.on_shutdown {
            let report = self.export(&self.config.export.path)?;
            info!("Shutdown export: {} sensors, {} log entries", report.sensors, report.logs);
        }

        info!("Desaverse engine stopped");
        Ok(())
    }

    /// Run `ticks` ticks back to back against the engine clock
    pub fn fast_forward(&self, ticks: u64) -> FastForward {
        let mut totals = FastForward::default();
        for _ in 0..ticks {
            match self.store.tick(self.clock.now()) {
                TickOutcome::Reset { .. } => totals.resets += 1,
                TickOutcome::Drained { drained, logged } => {
                    totals.drained += drained;
                    totals.logged += logged;
                }
            }
            totals.ticks += 1;
        }
        totals
    }

    /// Write the current snapshot using the configured format
    pub fn export(&self, dir: &Path) -> Result<ExportReport> {
        let exporter = SnapshotExporter::new(dir, self.config.export.format)
            .with_context(|| format!("Failed to prepare export directory {:?}", dir))?;
        let report = exporter.export(&self.store.snapshot()).context("Snapshot export failed")?;
        Ok(report)
    }

    pub fn store(&self) -> Arc<SensorStore> {
        self.store.clone()
    }

    pub async fn state(&self) -> SystemState {
        let snapshot = self.store.snapshot();
        let summary = self.store.summary();

        let mut state = self.state.read().await.clone();
        state.sensors_total = summary.total;
        state.sensors_online = summary.online;
        state.ticks = self.ticker.as_ref().map(|t| t.ticks()).unwrap_or(0);
        state.ticking = self.ticker.as_ref().map(|t| t.is_running()).unwrap_or(false);
        state.events_published = self.store.events_published();
        state.log_entries = snapshot.recent_logs.len();
        state.revision = snapshot.revision;
        state.uptime_seconds = self.uptime();
        state
    }

    pub fn uptime(&self) -> u64 {
        self.start_time.map(|t| t.elapsed().as_secs()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::{LogEntry, LogKind};
    use crate::core::ManualClock;
    use crate::export::ExportFormat;
    use crate::weather::{ForecastResponse, WeatherError, WEATHER_SENSOR};
    use async_trait::async_trait;
    use chrono::NaiveDate;

    fn clock() -> Arc<ManualClock> {
        let start = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap().and_hms_opt(8, 0, 0).unwrap();
        Arc::new(ManualClock::new(start))
    }

    fn offline_config() -> Config {
        let mut config = Config::default();
        config.weather.enabled = false;
        config
    }

    #[tokio::test]
    async fn test_rejects_invalid_config() {
        let mut config = offline_config();
        config.simulation.log_capacity = 0;
        assert!(Engine::with_clock(config, clock()).await.is_err());
    }

    #[tokio::test]
    async fn test_fast_forward() {
        let clock = clock();
        let engine = Engine::with_clock(offline_config(), clock.clone()).await.unwrap();

        let totals = engine.fast_forward(60);
        assert_eq!(totals.ticks, 60);
        assert_eq!(totals.resets, 0);
        assert!(totals.drained > 0);

        clock.advance(chrono::Duration::days(1));
        let totals = engine.fast_forward(1);
        assert_eq!(totals.resets, 1);
        assert!(engine.store().snapshot().sensors.iter().all(|s| s.battery == 100));
    }

    #[tokio::test]
    async fn test_manual_log_uses_engine_clock() {
        let clock = clock();
        let engine = Engine::with_clock(offline_config(), clock.clone()).await.unwrap();

        clock.advance(chrono::Duration::minutes(45));
        engine.store().add_log(LogEntry::system("", "Gate opened", LogKind::Info));

        let snapshot = engine.store().snapshot();
        assert_eq!(snapshot.recent_logs[0].time, "08:45:00");
        assert_eq!(snapshot.taken_at, clock.now());
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_stop() {
        let mut engine = Engine::with_clock(offline_config(), clock()).await.unwrap();
        engine.start().await.unwrap();
        assert!(engine.state().await.running);

        tokio::time::sleep(Duration::from_secs(121)).await;
        let state = engine.state().await;
        assert_eq!(state.ticks, 2);
        assert!(state.ticking);
        assert_eq!(state.events_published, 2);
        assert_eq!(state.sensors_total, 24);
        assert!(!state.weather_enabled);

        engine.stop().await.unwrap();
        let state = engine.state().await;
        assert!(!state.running);
        assert!(!state.ticking);
    }

    struct CalmSource;

    #[async_trait]
    impl WeatherSource for CalmSource {
        async fn fetch(&self) -> Result<ForecastResponse, WeatherError> {
            ForecastResponse::parse(r#"{"data": [{"cuaca": [[{"t": 27, "hu": 70, "ws": 4}]]}]}"#)
        }

        fn name(&self) -> &str {
            "calm"
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_weather_entries_reach_log() {
        let mut engine = Engine::with_clock(offline_config(), clock()).await.unwrap();
        engine.start_weather(Arc::new(CalmSource));

        // The poller fetches immediately on start
        tokio::time::sleep(Duration::from_secs(1)).await;
        let snapshot = engine.store().snapshot();
        assert_eq!(snapshot.recent_logs[0].sensor, WEATHER_SENSOR);

        engine.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_export_on_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = offline_config();
        config.export.on_shutdown = true;
        config.export.format = ExportFormat::Json;
        config.export.path = dir.path().to_path_buf();

        let mut engine = Engine::with_clock(config, clock()).await.unwrap();
        engine.start().await.unwrap();
        engine.stop().await.unwrap();

        let files: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(files.len(), 2);
    }

    #[tokio::test]
    async fn test_failed_export_still_stops() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "file").unwrap();

        let mut config = offline_config();
        config.export.on_shutdown = true;
        config.export.path = blocker.join("export");

        let mut engine = Engine::with_clock(config, clock()).await.unwrap();
        engine.start().await.unwrap();
        assert!(engine.stop().await.is_err());

        let state = engine.state().await;
        assert!(!state.running);
        assert!(!state.ticking);
    }
}
