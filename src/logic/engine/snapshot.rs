//! Engine Snapshot
//!
//! Read-only view handed to UI renderers. Counts are derived from the
//! copied log, never stored on their own.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::logic::detection::Sensitivity;
use crate::logic::event_log::{self, LogEntry};
use crate::logic::identity::Identity;
use crate::logic::state::EngineState;
use crate::logic::threat::RiskLevel;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub current_level: RiskLevel,
    pub identity: Identity,
    /// Oldest first
    pub log: Vec<LogEntry>,
    pub log_capacity: usize,
    /// Entries with severity other than SAFE
    pub threat_count: usize,
    /// Entries recording an identity rotation
    pub rotation_count: usize,
    /// Entries ever appended, evicted ones included
    pub total_events: u64,
    /// Identity rotations since start, evicted ones included
    pub total_rotations: u64,
    pub auto_response_enabled: bool,
    pub detection_enabled: bool,
    /// MAC spoofing: rotations also replace the hardware id
    pub hardware_id_rotation: bool,
    pub sensitivity: Sensitivity,
    pub captured_at: DateTime<Utc>,
}

impl EngineSnapshot {
    pub(crate) fn capture(state: &EngineState, sensitivity: Sensitivity) -> Self {
        let log = state.log().snapshot();
        Self {
            current_level: state.current_level(),
            identity: state.identity().clone(),
            threat_count: event_log::threat_count(&log),
            rotation_count: event_log::rotation_count(&log),
            log,
            log_capacity: state.log().capacity(),
            total_events: state.log().total_appended(),
            total_rotations: state.identity.rotations(),
            auto_response_enabled: state.auto_response_enabled(),
            detection_enabled: state.detection_enabled(),
            hardware_id_rotation: state.identity.rotates_hardware_id(),
            sensitivity,
            captured_at: Utc::now(),
        }
    }

    /// Log in display order
    pub fn newest_first(&self) -> Vec<LogEntry> {
        self.log.iter().rev().cloned().collect()
    }

    pub fn status_text(&self) -> &'static str {
        self.current_level.status_text()
    }
}
