//! Event Emitter - change notifications for UI renderers
//!
//! Published as part of each commit, so every subscriber sees changes in
//! commit order. Subscribers that fall behind lose notifications instead of
//! blocking the engine.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::logic::detection::Sensitivity;
use crate::logic::event_log::LogEntry;
use crate::logic::identity::Identity;
use crate::logic::response::MitigationTrigger;
use crate::logic::threat::Transition;

/// Event names
pub mod names {
    pub const LEVEL_CHANGED: &str = "threat:level-changed";
    pub const LOG_APPENDED: &str = "log:appended";
    pub const IDENTITY_ROTATED: &str = "identity:rotated";
    pub const SETTINGS_CHANGED: &str = "settings:changed";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingsChange {
    AutoResponse(bool),
    Detection(bool),
    HardwareIdRotation(bool),
    Sensitivity(Sensitivity),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    LevelChanged(Transition),
    LogAppended(LogEntry),
    IdentityRotated {
        trigger: MitigationTrigger,
        identity: Identity,
    },
    SettingsChanged {
        change: SettingsChange,
    },
}

impl EngineEvent {
    pub fn name(&self) -> &'static str {
        match self {
            EngineEvent::LevelChanged(_) => names::LEVEL_CHANGED,
            EngineEvent::LogAppended(_) => names::LOG_APPENDED,
            EngineEvent::IdentityRotated { .. } => names::IDENTITY_ROTATED,
            EngineEvent::SettingsChanged { .. } => names::SETTINGS_CHANGED,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Notifier {
    sender: broadcast::Sender<EngineEvent>,
}

impl Notifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Emit event to all listeners
    pub fn emit(&self, event: EngineEvent) {
        let name = event.name();
        if self.sender.send(event).is_err() {
            // No subscribers - nothing to redraw
            log::trace!("No subscribers, event '{}' dropped", name);
        }
    }

    pub fn emit_all(&self, events: impl IntoIterator<Item = EngineEvent>) {
        for event in events {
            self.emit(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::threat::RiskLevel;

    #[test]
    fn test_emit_without_subscribers_is_silent() {
        let notifier = Notifier::new(4);
        notifier.emit(EngineEvent::SettingsChanged { change: SettingsChange::Detection(false) });
        assert_eq!(notifier.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_subscriber_receives_in_order() {
        let notifier = Notifier::new(8);
        let mut rx = notifier.subscribe();

        let t = Transition { from: RiskLevel::Safe, to: RiskLevel::High };
        notifier.emit_all([
            EngineEvent::LevelChanged(t),
            EngineEvent::SettingsChanged { change: SettingsChange::AutoResponse(false) },
        ]);

        match rx.recv().await.unwrap() {
            EngineEvent::LevelChanged(got) => assert_eq!(got, t),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(rx.recv().await.unwrap().name(), names::SETTINGS_CHANGED);
    }

    #[test]
    fn test_event_serializes_with_tag() {
        let json = serde_json::to_string(&EngineEvent::SettingsChanged { change: SettingsChange::AutoResponse(true) }).unwrap();
        assert!(json.contains("\"type\":\"settings_changed\""));
    }
}
