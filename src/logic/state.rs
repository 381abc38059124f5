//! Engine State
//!
//! The single unit of shared mutable state. Always accessed through the
//! engine's mutex; nothing in here synchronizes on its own.

use chrono::{DateTime, Utc};

use crate::logic::event_log::{EventLog, LogEntry};
use crate::logic::identity::{Identity, IdentityStore};
use crate::logic::threat::{DetectionEvent, RiskLevel, ThreatStateMachine, Transition};

#[derive(Debug)]
pub struct EngineState {
    pub(crate) machine: ThreatStateMachine,
    pub(crate) identity: IdentityStore,
    pub(crate) log: EventLog,
    pub(crate) auto_response_enabled: bool,
    pub(crate) detection_enabled: bool,
}

impl EngineState {
    pub fn new(identity: IdentityStore, log_capacity: usize, auto_response_enabled: bool) -> Self {
        Self {
            machine: ThreatStateMachine::new(),
            identity,
            log: EventLog::new(log_capacity),
            auto_response_enabled,
            detection_enabled: true,
        }
    }

    pub fn current_level(&self) -> RiskLevel {
        self.machine.level()
    }

    pub fn identity(&self) -> &Identity {
        self.identity.current()
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn auto_response_enabled(&self) -> bool {
        self.auto_response_enabled
    }

    pub fn detection_enabled(&self) -> bool {
        self.detection_enabled
    }

    /// Feed one event through the state machine
    pub(crate) fn consume(&mut self, event: &DetectionEvent, now: DateTime<Utc>) -> (Transition, LogEntry) {
        self.machine.on_event(event, &mut self.log, now)
    }

    pub(crate) fn append(&mut self, entry: LogEntry) {
        self.log.append(entry);
    }
}
