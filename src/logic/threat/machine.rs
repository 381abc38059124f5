//! Threat State Machine
//!
//! Holds the current risk level and consumes detection events.
//! Any level may follow any other: the last consumed event wins.

use chrono::{DateTime, Utc};

use super::types::{DetectionEvent, RiskLevel, Transition};
use crate::logic::event_log::{EventLog, LogEntry};

#[derive(Debug, Clone, Default)]
pub struct ThreatStateMachine {
    level: RiskLevel,
}

impl ThreatStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(&self) -> RiskLevel {
        self.level
    }

    /// Log the event, then adopt its severity.
    ///
    /// Returns the transition and the appended entry.
    pub fn on_event(
        &mut self,
        event: &DetectionEvent,
        log: &mut EventLog,
        now: DateTime<Utc>,
    ) -> (Transition, LogEntry) {
        let entry = LogEntry::from_event(event, now);
        log.append(entry.clone());

        let transition = self.set_level(event.severity);
        if transition.changed() {
            log::info!(
                "[ThreatState] {} -> {} ({} from {})",
                transition.from, transition.to, event.description, event.origin
            );
        }
        (transition, entry)
    }

    /// Direct transition, used by the response policy's own SAFE restore
    pub(crate) fn set_level(&mut self, level: RiskLevel) -> Transition {
        let from = self.level;
        self.level = level;
        Transition { from, to: level }
    }
}
