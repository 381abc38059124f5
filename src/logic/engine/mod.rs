//! Threat Response Engine
//!
//! Owns the engine state and funnels every mutation through one lock:
//! scheduler ticks, panic rotations, reputation checks and settings changes.
//!
//! ## Locking
//! - `state` guards EngineState; held only for a synchronous commit.
//! - `detector` guards the detection source; never held together with `state`.
//! - Nothing is locked across an `.await`.

mod snapshot;


pub use snapshot::EngineSnapshot;

use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, watch};

use crate::constants::NOTIFICATION_CHANNEL_CAPACITY;
use crate::error::{EngineError, EngineResult};
use crate::logic::config::EngineConfig;
use crate::logic::detection::{
    DetectionSource, RandomDetector, ReputationChecker, ReputationVerdict, Sensitivity,
};
use crate::logic::event_log::{EntryKind, LogEntry};
use crate::logic::events::{EngineEvent, Notifier, SettingsChange};
use crate::logic::identity::{Identity, IdentityStore};
use crate::logic::response::{Mitigation, MitigationTrigger, ResponsePolicy};
use crate::logic::state::EngineState;
use crate::logic::threat::{DetectionEvent, RiskLevel, Transition};

const REPUTATION_BLOCK_DESCRIPTION: &str = "Connection blocked - high risk server";

// ============================================================================
// STEP OUTCOME
// ============================================================================

/// Everything one consumed event caused, committed atomically
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepOutcome {
    pub entry: LogEntry,
    pub transition: Transition,
    pub mitigation: Option<Mitigation>,
}

impl StepOutcome {
    /// Level after the whole step (mitigation included)
    pub fn final_level(&self) -> RiskLevel {
        self.mitigation
            .as_ref()
            .and_then(|m| m.transition)
            .map(|t| t.to)
            .unwrap_or(self.transition.to)
    }

    pub fn mitigated(&self) -> bool {
        self.mitigation.is_some()
    }
}

// ============================================================================
// ENGINE
// ============================================================================

struct Inner {
    state: Mutex<EngineState>,
    detector: Mutex<Box<dyn DetectionSource>>,
    notifier: Notifier,
    shutdown: watch::Sender<bool>,
    config: EngineConfig,
}

/// Cheap to clone handle; all clones share one engine
#[derive(Clone)]
pub struct Engine {
    inner: Arc<Inner>,
}

impl Engine {
    /// Engine with the randomized detector configured by `config`
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        let checker = ReputationChecker::new(&config.denylist)?;
        let detector = match config.detection_seed {
            Some(seed) => RandomDetector::with_seed(seed, config.sensitivity, checker),
            None => RandomDetector::new(config.sensitivity, checker),
        };
        let identity = IdentityStore::new(Utc::now());
        Ok(Self::with_parts(config, Box::new(detector), identity))
    }

    /// Engine with a custom detection source
    pub fn with_source(config: EngineConfig, source: Box<dyn DetectionSource>) -> Self {
        Self::with_parts(config, source, IdentityStore::new(Utc::now()))
    }

    pub fn with_parts(
        config: EngineConfig,
        source: Box<dyn DetectionSource>,
        identity: IdentityStore,
    ) -> Self {
        log::info!(
            "[Engine] Created: source={}, log capacity={}, auto-response={}",
            source.name(),
            config.log_capacity,
            config.auto_response
        );

        let identity = identity.with_hardware_id_rotation(config.rotate_hardware_id);
        let state = EngineState::new(identity, config.log_capacity, config.auto_response);
        let (shutdown, _) = watch::channel(false);

        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(state),
                detector: Mutex::new(source),
                notifier: Notifier::new(NOTIFICATION_CHANNEL_CAPACITY),
                shutdown,
                config,
            }),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    /// Change notifications, in commit order
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        let receiver = self.inner.notifier.subscribe();
        log::debug!("[Engine] Subscriber attached ({} active)", self.inner.notifier.subscriber_count());
        receiver
    }

    // ------------------------------------------------------------------------
    // Event intake
    // ------------------------------------------------------------------------

    /// Consume one detection event and apply the response policy, as one step
    pub fn submit(&self, event: DetectionEvent) -> StepOutcome {
        let mut state = self.inner.state.lock();
        // Read under the lock so timestamps follow commit order
        let now = Utc::now();

        let (transition, entry) = state.consume(&event, now);
        let mitigation = ResponsePolicy::after_event(&mut state, transition, now);

        let outcome = StepOutcome {
            entry,
            transition,
            mitigation,
        };
        self.notify_step(&outcome);
        outcome
    }

    /// One monitoring interval: ask the source for an event and consume it
    pub fn tick(&self) -> Option<StepOutcome> {
        if !self.inner.state.lock().detection_enabled() {
            return None;
        }

        let event = self.inner.detector.lock().tick()?;
        log::debug!("[Engine] Detection: {} ({}) from {}", event.description, event.severity, event.origin);
        Some(self.submit(event))
    }

    // ------------------------------------------------------------------------
    // User actions
    // ------------------------------------------------------------------------

    /// Emergency rotation, regardless of level or auto-response toggle
    pub fn panic_rotate(&self) -> Identity {
        log::warn!("[Engine] Emergency identity rotation requested");
        self.rotate(MitigationTrigger::Manual).identity
    }

    /// Periodic rotation driven by the monitoring loop
    pub fn scheduled_rotate(&self) -> Identity {
        self.rotate(MitigationTrigger::Scheduled).identity
    }

    fn rotate(&self, trigger: MitigationTrigger) -> Mitigation {
        let mut state = self.inner.state.lock();
        let now = Utc::now();
        let mitigation = ResponsePolicy::mitigate(&mut state, trigger, now);
        self.notify_mitigation(&mitigation);
        mitigation
    }

    /// Classify a user supplied URL or address.
    ///
    /// The simulated lookup latency is waited out without any lock held.
    /// A SAFE verdict is informational and never lowers the current level.
    pub async fn check_reputation(&self, target: &str) -> EngineResult<ReputationVerdict> {
        let target = target.trim();
        if target.is_empty() {
            return Err(EngineError::InvalidTarget(
                "Please enter a valid URL or IP".to_string(),
            ));
        }

        let mut shutdown = self.inner.shutdown.subscribe();
        let stopped = *shutdown.borrow();
        if stopped {
            return Err(EngineError::ShuttingDown);
        }

        log::info!("[Engine] Checking reputation for {}", target);

        let latency = self.inner.config.reputation_latency;
        if !latency.is_zero() {
            tokio::select! {
                _ = tokio::time::sleep(latency) => {}
                _ = wait_for_shutdown(&mut shutdown) => {
                    log::info!("[Engine] Reputation check for {} cancelled by shutdown", target);
                    return Err(EngineError::ShuttingDown);
                }
            }
        }

        let verdict = self.inner.detector.lock().check_reputation(target);

        if verdict.is_safe() {
            log::info!("[Engine] {} is trusted (risk {}%)", target, verdict.risk_score);
            return Ok(verdict);
        }

        log::warn!("[Engine] {} classified {} (risk {}%)", target, verdict.level, verdict.risk_score);
        self.submit(DetectionEvent::new(
            REPUTATION_BLOCK_DESCRIPTION,
            target,
            verdict.level,
        ));
        Ok(verdict)
    }

    /// Record a daemon lifecycle entry (start/stop)
    pub fn record_system_event(&self, description: &str, origin: &str) -> LogEntry {
        let mut state = self.inner.state.lock();
        let entry = LogEntry::new(Utc::now(), description, origin, RiskLevel::Safe, EntryKind::System);
        state.append(entry.clone());
        self.inner.notifier.emit(EngineEvent::LogAppended(entry.clone()));
        entry
    }

    // ------------------------------------------------------------------------
    // Settings
    // ------------------------------------------------------------------------

    /// Toggle automated mitigation; the current level is left alone
    pub fn set_auto_response(&self, enabled: bool) {
        let mut state = self.inner.state.lock();
        state.auto_response_enabled = enabled;
        log::info!("[Engine] Automated response {}", if enabled { "enabled" } else { "disabled" });
        self.inner.notifier.emit(EngineEvent::SettingsChanged {
            change: SettingsChange::AutoResponse(enabled),
        });
    }

    /// Pause or resume detection ticks
    pub fn set_detection_enabled(&self, enabled: bool) {
        let mut state = self.inner.state.lock();
        state.detection_enabled = enabled;
        log::info!("[Engine] Real-time detection {}", if enabled { "enabled" } else { "paused" });
        self.inner.notifier.emit(EngineEvent::SettingsChanged {
            change: SettingsChange::Detection(enabled),
        });
    }

    /// MAC spoofing: whether later rotations replace the hardware id
    pub fn set_hardware_id_rotation(&self, enabled: bool) {
        let mut state = self.inner.state.lock();
        state.identity.set_rotate_hardware_id(enabled);
        log::info!("[Engine] MAC spoofing {}", if enabled { "enabled" } else { "disabled" });
        self.inner.notifier.emit(EngineEvent::SettingsChanged {
            change: SettingsChange::HardwareIdRotation(enabled),
        });
    }

    pub fn set_sensitivity(&self, sensitivity: Sensitivity) {
        self.inner.detector.lock().set_sensitivity(sensitivity);
        log::info!("[Engine] Detection sensitivity set to {}", sensitivity);
        self.inner.notifier.emit(EngineEvent::SettingsChanged {
            change: SettingsChange::Sensitivity(sensitivity),
        });
    }

    pub fn sensitivity(&self) -> Sensitivity {
        self.inner.detector.lock().sensitivity()
    }

    // ------------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------------

    /// Consistent copy of the whole engine state
    pub fn snapshot(&self) -> EngineSnapshot {
        let sensitivity = self.sensitivity();
        let state = self.inner.state.lock();
        EngineSnapshot::capture(&state, sensitivity)
    }

    pub fn current_level(&self) -> RiskLevel {
        self.inner.state.lock().current_level()
    }

    pub fn identity(&self) -> Identity {
        self.inner.state.lock().identity().clone()
    }

    // ------------------------------------------------------------------------
    // Shutdown
    // ------------------------------------------------------------------------

    /// Stop the monitoring loop and abort pending reputation waits
    pub fn shutdown(&self) {
        if !self.inner.shutdown.send_replace(true) {
            log::info!("[Engine] Shutdown requested");
        }
    }

    pub fn is_shutting_down(&self) -> bool {
        *self.inner.shutdown.borrow()
    }

    pub fn shutdown_signal(&self) -> watch::Receiver<bool> {
        self.inner.shutdown.subscribe()
    }

    // ------------------------------------------------------------------------
    // Notifications (called with the state lock held, so order matches commits)
    // ------------------------------------------------------------------------

    fn notify_step(&self, outcome: &StepOutcome) {
        let notifier = &self.inner.notifier;
        notifier.emit(EngineEvent::LogAppended(outcome.entry.clone()));
        if outcome.transition.changed() {
            notifier.emit(EngineEvent::LevelChanged(outcome.transition));
        }
        if let Some(mitigation) = &outcome.mitigation {
            self.notify_mitigation(mitigation);
        }
    }

    fn notify_mitigation(&self, mitigation: &Mitigation) {
        let notifier = &self.inner.notifier;
        notifier.emit_all(mitigation.entries.iter().cloned().map(EngineEvent::LogAppended));
        notifier.emit(EngineEvent::IdentityRotated {
            trigger: mitigation.trigger,
            identity: mitigation.identity.clone(),
        });
        if let Some(transition) = mitigation.transition.filter(|t| t.changed()) {
            notifier.emit(EngineEvent::LevelChanged(transition));
        }
    }
}

/// Resolves once the shutdown flag is raised
pub async fn wait_for_shutdown(signal: &mut watch::Receiver<bool>) {
    if signal.wait_for(|stop| *stop).await.is_err() {
        // Sender gone: the engine itself was dropped
        log::debug!("[Engine] Shutdown channel closed");
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.inner.config)
            .field("shutting_down", &self.is_shutting_down())
            .finish()
    }
}
