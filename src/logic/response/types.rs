//! Response Types

use serde::{Deserialize, Serialize};

use crate::logic::event_log::{EntryKind, LogEntry};
use crate::logic::identity::Identity;
use crate::logic::threat::Transition;

// ============================================================================
// MITIGATION TRIGGER
// ============================================================================

/// Why an identity rotation happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MitigationTrigger {
    /// Response policy reacting to a HIGH event
    Automated,
    /// User pressed panic rotate
    Manual,
    /// Periodic auto-rotation
    Scheduled,
}

impl MitigationTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            MitigationTrigger::Automated => "automated",
            MitigationTrigger::Manual => "manual",
            MitigationTrigger::Scheduled => "scheduled",
        }
    }

    pub fn origin(&self) -> &'static str {
        match self {
            MitigationTrigger::Automated => "IPS Service",
            MitigationTrigger::Manual => "Local System",
            MitigationTrigger::Scheduled => "Rotation Scheduler",
        }
    }

    /// Entry logged before the rotation, if any
    pub fn initiation(&self) -> Option<&'static str> {
        match self {
            MitigationTrigger::Manual => Some("Emergency identity rotation initiated"),
            _ => None,
        }
    }

    /// Entry logged once the new identity is in place
    pub fn completion(&self) -> (&'static str, EntryKind) {
        match self {
            MitigationTrigger::Automated => (
                "Automated mitigation: source blocked and identity rotated",
                EntryKind::Mitigation,
            ),
            MitigationTrigger::Manual => (
                "Emergency identity rotation success",
                EntryKind::RotationCompleted,
            ),
            MitigationTrigger::Scheduled => (
                "Scheduled identity rotation success",
                EntryKind::RotationCompleted,
            ),
        }
    }

    /// Whether the rotation also resets the risk level to SAFE
    pub fn restores_safe(&self) -> bool {
        !matches!(self, MitigationTrigger::Scheduled)
    }
}

impl std::fmt::Display for MitigationTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// MITIGATION
// ============================================================================

/// Outcome of one committed rotation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mitigation {
    pub trigger: MitigationTrigger,
    pub identity: Identity,
    /// Entries appended by this mitigation, in order
    pub entries: Vec<LogEntry>,
    /// Level change caused by the SAFE restore (None for scheduled rotations)
    pub transition: Option<Transition>,
}
