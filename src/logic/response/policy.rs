//! Response Policy
//!
//! Decides whether a consumed event calls for mitigation and performs it.
//! Every rotation, automated or not, goes through `mitigate`, which the
//! engine only ever calls while holding the state lock.

use chrono::{DateTime, Utc};

use super::types::{Mitigation, MitigationTrigger};
use crate::logic::event_log::{EntryKind, LogEntry};
use crate::logic::state::EngineState;
use crate::logic::threat::{RiskLevel, Transition};

pub struct ResponsePolicy;

impl ResponsePolicy {
    /// Run right after an event was consumed.
    ///
    /// Mitigates only when the event left the engine at HIGH and auto-response is on.
    pub fn after_event(
        state: &mut EngineState,
        transition: Transition,
        now: DateTime<Utc>,
    ) -> Option<Mitigation> {
        if transition.to != RiskLevel::High {
            return None;
        }

        if !state.auto_response_enabled {
            log::warn!("[ResponsePolicy] HIGH risk persists: automated response disabled");
            return None;
        }

        Some(Self::mitigate(state, MitigationTrigger::Automated, now))
    }

    /// Rotate the identity and log it; restore SAFE unless scheduled.
    pub fn mitigate(
        state: &mut EngineState,
        trigger: MitigationTrigger,
        now: DateTime<Utc>,
    ) -> Mitigation {
        let mut entries = Vec::with_capacity(2);

        if let Some(description) = trigger.initiation() {
            let entry = LogEntry::new(
                now,
                description,
                trigger.origin(),
                RiskLevel::Safe,
                EntryKind::RotationInitiated,
            );
            state.append(entry.clone());
            entries.push(entry);
        }

        let identity = state.identity.rotate(now);

        let (description, kind) = trigger.completion();
        let entry = LogEntry::new(now, description, trigger.origin(), RiskLevel::Safe, kind);
        state.append(entry.clone());
        entries.push(entry);

        let transition = if trigger.restores_safe() {
            Some(state.machine.set_level(RiskLevel::Safe))
        } else {
            None
        };

        log::info!(
            "[ResponsePolicy] {} rotation committed: {} / {}",
            trigger, identity.address, identity.hardware_id
        );

        Mitigation {
            trigger,
            identity,
            entries,
            transition,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::identity::IdentityStore;
    use crate::logic::threat::DetectionEvent;

    fn state(auto_response: bool) -> EngineState {
        EngineState::new(IdentityStore::with_seed(Utc::now(), 21), 50, auto_response)
    }

    fn high_event() -> DetectionEvent {
        DetectionEvent::new("Critical port scan attempt", "210.5.4.1", RiskLevel::High)
    }

    #[test]
    fn test_high_event_mitigated_when_enabled() {
        let mut state = state(true);
        let before = state.identity().clone();
        let now = Utc::now();

        let (transition, _) = state.consume(&high_event(), now);
        let mitigation = ResponsePolicy::after_event(&mut state, transition, now).expect("mitigation");

        assert_eq!(mitigation.trigger, MitigationTrigger::Automated);
        assert_eq!(state.current_level(), RiskLevel::Safe);
        assert!(!state.identity().same_endpoint(&before));
        assert_eq!(state.log().len(), 2);

        let last = state.log().latest().unwrap();
        assert_eq!(last.kind, EntryKind::Mitigation);
        assert_eq!(last.severity, RiskLevel::Safe);
        assert_eq!(
            mitigation.transition,
            Some(Transition { from: RiskLevel::High, to: RiskLevel::Safe })
        );
    }

    #[test]
    fn test_high_event_persists_when_disabled() {
        let mut state = state(false);
        let before = state.identity().clone();
        let now = Utc::now();

        let (transition, _) = state.consume(&high_event(), now);
        assert!(ResponsePolicy::after_event(&mut state, transition, now).is_none());

        assert_eq!(state.current_level(), RiskLevel::High);
        assert_eq!(state.identity(), &before);
        assert_eq!(state.log().len(), 1);
    }

    #[test]
    fn test_medium_event_never_mitigated() {
        let mut state = state(true);
        let now = Utc::now();
        let event = DetectionEvent::new("Suspicious data outflow detected", "Tracking.io", RiskLevel::Medium);

        let (transition, _) = state.consume(&event, now);
        assert!(ResponsePolicy::after_event(&mut state, transition, now).is_none());
        assert_eq!(state.current_level(), RiskLevel::Medium);
    }

    #[test]
    fn test_manual_mitigation_logs_two_entries() {
        let mut state = state(false);
        let now = Utc::now();

        let mitigation = ResponsePolicy::mitigate(&mut state, MitigationTrigger::Manual, now);

        assert_eq!(mitigation.entries.len(), 2);
        assert_eq!(mitigation.entries[0].kind, EntryKind::RotationInitiated);
        assert_eq!(mitigation.entries[1].kind, EntryKind::RotationCompleted);
        assert!(mitigation.entries.iter().all(|e| e.timestamp == now));
        assert_eq!(mitigation.identity.last_rotation, now);
        assert_eq!(state.log().rotation_count(), 1);
    }

    #[test]
    fn test_scheduled_rotation_keeps_level() {
        let mut state = state(false);
        let now = Utc::now();
        let event = DetectionEvent::new("Suspicious data outflow detected", "Tracking.io", RiskLevel::Medium);
        state.consume(&event, now);

        let mitigation = ResponsePolicy::mitigate(&mut state, MitigationTrigger::Scheduled, now);

        assert!(mitigation.transition.is_none());
        assert_eq!(mitigation.entries.len(), 1);
        assert_eq!(state.current_level(), RiskLevel::Medium);
    }
}
