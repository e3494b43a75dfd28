// Copyright (c) 2026 Desaverse contributors
// Licensed under the MIT License. See LICENSE file in the project root.

//! Alert page queries over the event log

use serde::{Deserialize, Serialize};

use super::{LogEntry, LogKind};

/// Level filter plus free-text search
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertFilter {
    /// Matched against `LogKind::display_kind`, so `Error` and `Warning` select the same entries
    pub level: Option<LogKind>,
    pub query: Option<String>,
}

impl AlertFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn level(level: LogKind) -> Self {
        Self {
            level: Some(level),
            query: None,
        }
    }

    pub fn with_query(mut self, query: &str) -> Self {
        let query = query.trim();
        self.query = if query.is_empty() { None } else { Some(query.to_lowercase()) };
        self
    }

    pub fn matches(&self, entry: &LogEntry) -> bool {
        if let Some(level) = self.level {
            if entry.kind.display_kind() != level.display_kind() {
                return false;
            }
        }

        match &self.query {
            Some(query) => {
                let query = query.to_lowercase();
                entry.event.to_lowercase().contains(&query) || entry.sensor.to_lowercase().contains(&query)
            }
            None => true,
        }
    }

    /// Matching entries in log order (newest first)
    pub fn apply<'a>(&self, entries: &'a [LogEntry]) -> Vec<&'a LogEntry> {
        entries.iter().filter(|e| self.matches(e)).collect()
    }
}

/// Per-level counts for the alert page header
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertStats {
    pub total: usize,
    pub critical: usize,
    pub warnings: usize,
    pub info: usize,
    pub success: usize,
}

impl AlertStats {
    pub fn from_entries(entries: &[LogEntry]) -> Self {
        let mut stats = AlertStats {
            total: entries.len(),
            ..Default::default()
        };

        for entry in entries {
            match entry.kind.display_kind() {
                LogKind::Warning | LogKind::Error => {
                    stats.warnings += 1;
                    if entry.is_critical() {
                        stats.critical += 1;
                    }
                }
                LogKind::Info => stats.info += 1,
                LogKind::Success => stats.success += 1,
            }
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<LogEntry> {
        vec![
            LogEntry::new("10:05:00", "CRITICAL: battery of Feed Stock nearly empty (5%)", LogKind::Warning, "FEED-01"),
            LogEntry::new("10:04:00", "Warning: battery of Street Light 1 at 39%", LogKind::Warning, "LIGHT-01"),
            LogEntry::new("10:03:00", "Weather update: 27°C", LogKind::Info, "WEATHER"),
            LogEntry::new("10:02:00", "Gateway timeout", LogKind::Error, "GATE-01"),
            LogEntry::system("10:00:00", "Monitoring system active", LogKind::Success),
        ]
    }

    #[test]
    fn test_filter_by_level_maps_errors() {
        let entries = sample();
        let warnings = AlertFilter::level(LogKind::Warning).apply(&entries);
        assert_eq!(warnings.len(), 3);
        let errors = AlertFilter::level(LogKind::Error).apply(&entries);
        assert_eq!(errors.len(), 3);
        assert_eq!(AlertFilter::all().apply(&entries).len(), 5);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let entries = sample();
        let hits = AlertFilter::all().with_query("light-01").apply(&entries);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].sensor, "LIGHT-01");

        let hits = AlertFilter::level(LogKind::Warning).with_query("BATTERY").apply(&entries);
        assert_eq!(hits.len(), 2);

        let blank = AlertFilter::all().with_query("   ");
        assert_eq!(blank.query, None);
    }

    #[test]
    fn test_stats() {
        let stats = AlertStats::from_entries(&sample());
        assert_eq!(
            stats,
            AlertStats {
                total: 5,
                critical: 1,
                warnings: 3,
                info: 1,
                success: 1,
            }
        );
    }
}
