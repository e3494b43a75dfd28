// Copyright (c) 2026 Desaverse contributors
// Licensed under the MIT License. See LICENSE file in the project root.

//! Log entries and the bounded most-recent-first event log

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// Sensor id used for engine-level events
pub const SYSTEM_SENSOR: &str = "SYSTEM";

/// Default number of entries kept in the log
pub const DEFAULT_LOG_CAPACITY: usize = 20;

/// Leading word of critical-battery wording
pub const CRITICAL_PREFIX: &str = "CRITICAL";

const MISSING_EVENT: &str = "(no description)";

/// Category of a log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    Success,
    Warning,
    Info,
    Error,
}

impl LogKind {
    /// Kind used by the alert views; errors are shown as warnings
    pub fn display_kind(self) -> LogKind {
        match self {
            LogKind::Error => LogKind::Warning,
            other => other,
        }
    }
}

impl Default for LogKind {
    fn default() -> Self {
        LogKind::Info
    }
}

impl fmt::Display for LogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogKind::Success => "success",
            LogKind::Warning => "warning",
            LogKind::Info => "info",
            LogKind::Error => "error",
        };
        f.pad(s)
    }
}

/// One recorded system or sensor event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub event: String,
    #[serde(rename = "type", default)]
    pub kind: LogKind,
    #[serde(default)]
    pub sensor: String,
}

impl LogEntry {
    pub fn new(time: impl Into<String>, event: impl Into<String>, kind: LogKind, sensor: impl Into<String>) -> Self {
        Self {
            time: time.into(),
            event: event.into(),
            kind,
            sensor: sensor.into(),
        }
    }

    pub fn system(time: impl Into<String>, event: impl Into<String>, kind: LogKind) -> Self {
        Self::new(time, event, kind, SYSTEM_SENSOR)
    }

    /// Fill blank fields with safe defaults instead of rejecting the entry
    pub fn sanitized(mut self, now: &str) -> Self {
        if self.time.trim().is_empty() {
            self.time = now.to_string();
        }
        if self.event.trim().is_empty() {
            self.event = MISSING_EVENT.to_string();
        }
        if self.sensor.trim().is_empty() {
            self.sensor = SYSTEM_SENSOR.to_string();
        }
        self
    }

    pub fn is_system(&self) -> bool {
        self.sensor == SYSTEM_SENSOR
    }

    /// Critical entries are still `Warning` typed; only the wording escalates
    pub fn is_critical(&self) -> bool {
        self.kind.display_kind() == LogKind::Warning && self.event.starts_with(CRITICAL_PREFIX)
    }
}

/// Bounded log, newest entry first
#[derive(Debug, Clone)]
pub struct EventLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Prepend one entry, evicting the oldest past capacity
    pub fn push(&mut self, entry: LogEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(self.capacity);
    }

    /// Prepend a batch keeping its internal order: `batch[0]` becomes the head
    pub fn push_batch(&mut self, batch: Vec<LogEntry>) {
        for entry in batch.into_iter().rev() {
            self.entries.push_front(entry);
        }
        self.entries.truncate(self.capacity);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_vec(&self) -> Vec<LogEntry> {
        self.entries.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(n: usize) -> LogEntry {
        LogEntry::new(format!("10:00:{:02}", n), format!("event {}", n), LogKind::Info, "T-01")
    }

    #[test]
    fn test_push_caps_and_orders() {
        let mut log = EventLog::new(20);
        for n in 0..25 {
            log.push(entry(n));
        }
        assert_eq!(log.len(), 20);
        let events: Vec<String> = log.to_vec().into_iter().map(|e| e.event).collect();
        let expected: Vec<String> = (5..25).rev().map(|n| format!("event {}", n)).collect();
        assert_eq!(events, expected);
    }

    #[test]
    fn test_push_batch_keeps_batch_order() {
        let mut log = EventLog::new(5);
        log.push(entry(0));
        log.push_batch(vec![entry(1), entry(2), entry(3)]);
        let events: Vec<String> = log.to_vec().into_iter().map(|e| e.event).collect();
        assert_eq!(events, vec!["event 1", "event 2", "event 3", "event 0"]);

        log.push_batch((4..10).map(entry).collect());
        assert_eq!(log.len(), 5);
        assert_eq!(log.to_vec()[0].event, "event 4");
    }

    #[test]
    fn test_zero_capacity_is_raised_to_one() {
        let mut log = EventLog::new(0);
        log.push(entry(1));
        log.push(entry(2));
        assert_eq!(log.len(), 1);
        assert_eq!(log.to_vec(), vec![entry(2)]);
    }

    #[test]
    fn test_sanitized_fills_blanks() {
        let raw: LogEntry = serde_json::from_str(r#"{"type": "warning"}"#).unwrap();
        let clean = raw.sanitized("08:15:00");
        assert_eq!(clean.time, "08:15:00");
        assert_eq!(clean.event, MISSING_EVENT);
        assert_eq!(clean.sensor, SYSTEM_SENSOR);
        assert_eq!(clean.kind, LogKind::Warning);
    }

    #[test]
    fn test_error_displays_as_warning() {
        assert_eq!(LogKind::Error.display_kind(), LogKind::Warning);
        assert_eq!(LogKind::Success.display_kind(), LogKind::Success);
        let json = serde_json::to_value(LogEntry::system("t", "e", LogKind::Success)).unwrap();
        assert_eq!(json["type"], "success");
        assert_eq!(json["sensor"], "SYSTEM");
    }
}
