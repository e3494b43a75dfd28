// Copyright (c) 2026 Desaverse contributors
// Licensed under the MIT License. See LICENSE file in the project root.

//! Snapshot exporter

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::info;

use super::{ExportError, ExportFormat};
use crate::alerts::LogEntry;
use crate::sensors::{Sensor, Snapshot};

const SENSOR_HEADER: &str = "id,name,location,group,status,battery,signal,last_update,drain_rate";
const LOG_HEADER: &str = "time,type,sensor,event";

/// Files written by one export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub sensors_file: PathBuf,
    pub logs_file: PathBuf,
    pub sensors: usize,
    pub logs: usize,
}

/// Writes snapshots to a directory
pub struct SnapshotExporter {
    path: PathBuf,
    format: ExportFormat,
}

impl SnapshotExporter {
    pub fn new(path: impl Into<PathBuf>, format: ExportFormat) -> Result<Self, ExportError> {
        let path = path.into();

        // Create directory if it doesn't exist
        std::fs::create_dir_all(&path)?;

        Ok(Self { path, format })
    }

    /// Write `sensors-<stamp>` and `logs-<stamp>` files for the snapshot
    pub fn export(&self, snapshot: &Snapshot) -> Result<ExportReport, ExportError> {
        let stamp = snapshot.taken_at.format("%Y%m%d_%H%M%S");
        let ext = self.format.extension();
        let sensors_file = self.path.join(format!("sensors-{}-r{}.{}", stamp, snapshot.revision, ext));
        let logs_file = self.path.join(format!("logs-{}-r{}.{}", stamp, snapshot.revision, ext));

        let mut writer = BufWriter::new(File::create(&sensors_file)?);
        self.write_sensors(&snapshot.sensors, &mut writer)?;

        let mut writer = BufWriter::new(File::create(&logs_file)?);
        self.write_logs(&snapshot.recent_logs, &mut writer)?;

        info!("Exported snapshot r{} to {:?}", snapshot.revision, self.path);

        Ok(ExportReport {
            sensors_file,
            logs_file,
            sensors: snapshot.sensors.len(),
            logs: snapshot.recent_logs.len(),
        })
    }

    pub fn write_sensors<W: Write>(&self, sensors: &[Sensor], writer: &mut W) -> Result<(), ExportError> {
        match self.format {
            ExportFormat::Json => {
                for sensor in sensors {
                    let json = serde_json::to_string(sensor)?;
                    writeln!(writer, "{}", json)?;
                }
            }
            ExportFormat::Csv => {
                writeln!(writer, "{}", SENSOR_HEADER)?;
                for s in sensors {
                    writeln!(
                        writer,
                        "{},{},{},{},{},{},{},{},{}",
                        csv_field(&s.id),
                        csv_field(&s.name),
                        csv_field(&s.location),
                        s.group,
                        s.status,
                        s.battery,
                        s.signal,
                        csv_field(&s.last_update),
                        s.drain_rate
                    )?;
                }
            }
        }

        writer.flush()?;
        Ok(())
    }

    pub fn write_logs<W: Write>(&self, logs: &[LogEntry], writer: &mut W) -> Result<(), ExportError> {
        match self.format {
            ExportFormat::Json => {
                for entry in logs {
                    let json = serde_json::to_string(entry)?;
                    writeln!(writer, "{}", json)?;
                }
            }
            ExportFormat::Csv => {
                writeln!(writer, "{}", LOG_HEADER)?;
                for entry in logs {
                    writeln!(
                        writer,
                        "{},{},{},{}",
                        csv_field(&entry.time),
                        entry.kind.display_kind(),
                        csv_field(&entry.sensor),
                        csv_field(&entry.event)
                    )?;
                }
            }
        }

        writer.flush()?;
        Ok(())
    }
}

/// Quote a field when it contains a separator, quote or line break
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
