//! Event Log
//!
//! Bounded, append-only record of what the engine observed and did.
//! Oldest entry is evicted first once the log is at capacity.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::logic::threat::{DetectionEvent, RiskLevel};

// ============================================================================
// ENTRY KIND
// ============================================================================

/// What a log entry records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// A consumed detection event
    Detection,
    /// Automated response rotated the identity
    Mitigation,
    /// User asked for an emergency rotation
    RotationInitiated,
    /// Manual or scheduled rotation finished
    RotationCompleted,
    /// Daemon lifecycle (start/stop)
    System,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Detection => "detection",
            EntryKind::Mitigation => "mitigation",
            EntryKind::RotationInitiated => "rotation_initiated",
            EntryKind::RotationCompleted => "rotation_completed",
            EntryKind::System => "system",
        }
    }

    /// Entry documents an identity actually being replaced
    pub fn is_rotation(&self) -> bool {
        matches!(self, EntryKind::Mitigation | EntryKind::RotationCompleted)
    }
}

// ============================================================================
// LOG ENTRY
// ============================================================================

/// Immutable, timestamped log record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub description: String,
    pub origin: String,
    pub severity: RiskLevel,
    pub kind: EntryKind,
}

impl LogEntry {
    pub fn new(
        timestamp: DateTime<Utc>,
        description: impl Into<String>,
        origin: impl Into<String>,
        severity: RiskLevel,
        kind: EntryKind,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            description: description.into(),
            origin: origin.into(),
            severity,
            kind,
        }
    }

    pub fn from_event(event: &DetectionEvent, timestamp: DateTime<Utc>) -> Self {
        Self::new(
            timestamp,
            event.description.clone(),
            event.origin.clone(),
            event.severity,
            EntryKind::Detection,
        )
    }

    /// One JSON object per line, for the audit trail
    pub fn to_jsonl(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

// ============================================================================
// EVENT LOG
// ============================================================================

#[derive(Debug, Clone)]
pub struct EventLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    total_appended: u64,
}

impl EventLog {
    /// Capacity below 1 is raised to 1
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            total_appended: 0,
        }
    }

    /// Append as newest, evicting the oldest entry first when full
    pub fn append(&mut self, entry: LogEntry) {
        if self.entries.len() >= self.capacity {
            if let Some(evicted) = self.entries.pop_front() {
                log::trace!("[EventLog] Evicted entry {} ({})", evicted.id, evicted.description);
            }
        }
        self.entries.push_back(entry);
        self.total_appended += 1;
    }

    /// Ordered copy, oldest first
    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.entries.iter().cloned().collect()
    }

    /// Ordered copy, newest first (display order)
    pub fn newest_first(&self) -> Vec<LogEntry> {
        self.entries.iter().rev().cloned().collect()
    }

    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Appends since creation, evicted ones included
    pub fn total_appended(&self) -> u64 {
        self.total_appended
    }

    /// Entries with severity other than SAFE
    pub fn threat_count(&self) -> usize {
        threat_count(self.entries.iter())
    }

    /// Entries that record an identity rotation
    pub fn rotation_count(&self) -> usize {
        rotation_count(self.entries.iter())
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_LOG_CAPACITY)
    }
}

pub fn threat_count<'a>(entries: impl IntoIterator<Item = &'a LogEntry>) -> usize {
    entries.into_iter().filter(|e| e.severity.is_elevated()).count()
}

pub fn rotation_count<'a>(entries: impl IntoIterator<Item = &'a LogEntry>) -> usize {
    entries.into_iter().filter(|e| e.kind.is_rotation()).count()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(n: usize, severity: RiskLevel) -> LogEntry {
        LogEntry::new(Utc::now(), format!("event {}", n), "test", severity, EntryKind::Detection)
    }

    #[test]
    fn test_capacity_never_exceeded_and_latest_retained() {
        for capacity in [1usize, 3, 50] {
            let mut log = EventLog::new(capacity);
            for n in 0..(capacity * 3 + 1) {
                log.append(entry(n, RiskLevel::Medium));
                assert!(log.len() <= capacity);

                let expected_len = (n + 1).min(capacity);
                assert_eq!(log.len(), expected_len);

                let first_kept = n + 1 - expected_len;
                let descriptions: Vec<String> =
                    log.snapshot().into_iter().map(|e| e.description).collect();
                let expected: Vec<String> =
                    (first_kept..=n).map(|i| format!("event {}", i)).collect();
                assert_eq!(descriptions, expected);
            }
            assert_eq!(log.total_appended(), (capacity * 3 + 1) as u64);
        }
    }

    #[test]
    fn test_zero_capacity_is_raised() {
        let mut log = EventLog::new(0);
        assert_eq!(log.capacity(), 1);
        log.append(entry(0, RiskLevel::Safe));
        log.append(entry(1, RiskLevel::Safe));
        assert_eq!(log.len(), 1);
        assert_eq!(log.latest().map(|e| e.description.as_str()), Some("event 1"));
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut log = EventLog::new(5);
        log.append(entry(0, RiskLevel::High));
        let snap = log.snapshot();
        log.append(entry(1, RiskLevel::High));
        assert_eq!(snap.len(), 1);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_newest_first_reverses() {
        let mut log = EventLog::new(5);
        for n in 0..3 {
            log.append(entry(n, RiskLevel::Safe));
        }
        let display = log.newest_first();
        assert_eq!(display[0].description, "event 2");
        assert_eq!(display[2].description, "event 0");
    }

    #[test]
    fn test_derived_counts() {
        let mut log = EventLog::new(10);
        log.append(entry(0, RiskLevel::Medium));
        log.append(entry(1, RiskLevel::High));
        log.append(LogEntry::new(Utc::now(), "mitigated", "IPS Service", RiskLevel::Safe, EntryKind::Mitigation));
        log.append(LogEntry::new(Utc::now(), "initiated", "Local System", RiskLevel::Safe, EntryKind::RotationInitiated));
        log.append(LogEntry::new(Utc::now(), "rotated", "Local System", RiskLevel::Safe, EntryKind::RotationCompleted));

        assert_eq!(log.threat_count(), 2);
        assert_eq!(log.rotation_count(), 2);
    }

    #[test]
    fn test_jsonl_is_single_line() {
        let line = entry(7, RiskLevel::High).to_jsonl().unwrap();
        assert!(!line.contains('\n'));
        assert!(line.contains("\"severity\":\"high\""));
        assert!(line.contains("\"kind\":\"detection\""));
    }
}
