// Copyright (c) 2026 Desaverse contributors
// Licensed under the MIT License. See LICENSE file in the project root.

//! Desaverse - Village IoT Telemetry Engine
//!
//! Runs the sensor simulation headless: ticks the village fleet, polls the
//! weather forecast and keeps the alert log until Ctrl+C.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use desaverse::{build_info, AlertStats, Config, Engine, VERSION};

/// Desaverse - Village IoT Telemetry Engine
#[derive(Parser, Debug)]
#[command(name = "desaverse")]
#[command(author = "Desaverse Project")]
#[command(version = VERSION)]
#[command(about = "Simulated village sensor network with battery alerts and weather feed")]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable trace-level logging
    #[arg(long)]
    trace: bool,

    /// Seconds between simulation ticks
    #[arg(long)]
    tick_secs: Option<u64>,

    /// Do not poll the weather forecast
    #[arg(long)]
    no_weather: bool,

    /// Export a snapshot to this directory on shutdown
    #[arg(long)]
    export_dir: Option<PathBuf>,

    /// Run this many ticks immediately, print a summary and exit
    #[arg(long, value_name = "TICKS")]
    fast_forward: Option<u64>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Load or create configuration
    let config_path = args.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load_or_create(&config_path)?;

    // Initialize logging
    let log_level = if args.trace {
        Level::TRACE
    } else if args.debug {
        Level::DEBUG
    } else {
        Level::from_str(&config.log_level).unwrap_or(Level::INFO)
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(args.debug)
        .with_line_number(args.debug)
        .with_ansi(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let info = build_info();
    info!("Desaverse v{} ({}/{})", info.version, info.os, info.target);
    info!("Configuration loaded from {:?}", config_path);

    // Override with command line args
    if let Some(secs) = args.tick_secs {
        config.simulation.tick_interval_secs = secs;
    }
    if args.no_weather {
        config.weather.enabled = false;
    }
    if let Some(dir) = args.export_dir {
        config.export.on_shutdown = true;
        config.export.path = dir;
    }
    config.validate()?;

    let rt = tokio::runtime::Runtime::new()?;
    match args.fast_forward {
        Some(ticks) => rt.block_on(run_fast_forward(config, ticks)),
        None => rt.block_on(run_headless(config)),
    }
}

/// Tick synchronously and print the resulting fleet state
async fn run_fast_forward(config: Config, ticks: u64) -> Result<()> {
    let export = config.export.on_shutdown.then(|| config.export.path.clone());
    let engine = Engine::new(config).await?;

    let totals = engine.fast_forward(ticks);
    let store = engine.store();
    let snapshot = store.snapshot();
    let summary = store.summary();
    let stats = AlertStats::from_entries(&snapshot.recent_logs);

    println!("Ticks:        {} ({} daily resets)", totals.ticks, totals.resets);
    println!("Drained:      {} battery points", totals.drained);
    println!("Logged:       {} entries", totals.logged);
    println!("Active:       {}", summary.active_label());
    println!("Avg battery:  {:.1}%", summary.average_battery);
    println!("Low battery:  {}", summary.low_battery.join(", "));
    println!(
        "Log:          {} entries ({} warnings, {} critical)",
        stats.total, stats.warnings, stats.critical
    );
    for entry in snapshot.recent_logs.iter().take(5) {
        println!("  [{}] {:<8} {:<10} {}", entry.time, entry.kind.display_kind(), entry.sensor, entry.event);
    }

    if let Some(dir) = export {
        let report = engine.export(&dir)?;
        println!("Exported to {:?} and {:?}", report.sensors_file, report.logs_file);
    }

    Ok(())
}

/// Run until Ctrl+C
async fn run_headless(config: Config) -> Result<()> {
    info!("Initializing headless mode...");

    let mut engine = Engine::new(config).await?;
    engine.start().await?;

    info!("Desaverse running, {} sensors", engine.state().await.sensors_total);
    info!("   Press Ctrl+C to shutdown");

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;

    info!("Shutdown signal received, cleaning up...");
    engine.stop().await?;

    let state = engine.state().await;
    info!(
        "Desaverse shutdown complete after {} ticks (revision {})",
        state.ticks, state.revision
    );

    Ok(())
}
