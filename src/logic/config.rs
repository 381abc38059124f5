//! Engine Configuration
//!
//! Assembled from `constants` defaults and environment overrides.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::logic::detection::Sensitivity;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Event log capacity (FIFO eviction beyond it)
    pub log_capacity: usize,
    /// Monitoring loop tick interval
    pub tick_interval: Duration,
    /// Simulated reputation lookup latency
    pub reputation_latency: Duration,
    /// Initial state of the automated response toggle
    pub auto_response: bool,
    pub sensitivity: Sensitivity,
    /// Fixed detector seed (random if None)
    pub detection_seed: Option<u64>,
    /// Scheduled identity rotation
    pub auto_rotation: bool,
    pub rotation_interval: Duration,
    /// MAC spoofing on rotation
    pub rotate_hardware_id: bool,
    /// Reputation denylist keywords
    pub denylist: Vec<String>,
    /// JSONL audit trail, if any
    pub audit_log_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            log_capacity: constants::DEFAULT_LOG_CAPACITY,
            tick_interval: Duration::from_secs(constants::DEFAULT_TICK_INTERVAL_SECS),
            reputation_latency: Duration::from_millis(constants::DEFAULT_REPUTATION_LATENCY_MS),
            auto_response: constants::DEFAULT_AUTO_RESPONSE,
            sensitivity: Sensitivity::default(),
            detection_seed: None,
            auto_rotation: constants::DEFAULT_AUTO_ROTATION,
            rotation_interval: Duration::from_secs(constants::DEFAULT_ROTATION_INTERVAL_MINS * 60),
            rotate_hardware_id: constants::DEFAULT_MAC_SPOOFING,
            denylist: constants::DEFAULT_DENYLIST.iter().map(|k| k.to_string()).collect(),
            audit_log_path: None,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let sensitivity = match constants::get_detection_sensitivity() {
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                log::warn!("{} - falling back to {}", e, Sensitivity::default());
                Sensitivity::default()
            }),
            None => Sensitivity::default(),
        };

        Self {
            log_capacity: constants::get_log_capacity(),
            tick_interval: constants::get_tick_interval(),
            reputation_latency: constants::get_reputation_latency(),
            auto_response: constants::is_auto_response_enabled(),
            sensitivity,
            detection_seed: constants::get_detection_seed(),
            auto_rotation: constants::is_auto_rotation_enabled(),
            rotation_interval: constants::get_rotation_interval(),
            rotate_hardware_id: constants::is_mac_spoofing_enabled(),
            denylist: constants::get_denylist(),
            audit_log_path: constants::get_audit_log_path(),
        }
    }

    /// Zero latency, fixed seed: what the tests want
    pub fn for_testing() -> Self {
        Self {
            reputation_latency: Duration::ZERO,
            detection_seed: Some(0x5EED),
            ..Self::default()
        }
    }

    pub fn with_log_capacity(mut self, capacity: usize) -> Self {
        self.log_capacity = capacity.max(1);
        self
    }

    pub fn with_auto_response(mut self, enabled: bool) -> Self {
        self.auto_response = enabled;
        self
    }

    pub fn with_reputation_latency(mut self, latency: Duration) -> Self {
        self.reputation_latency = latency;
        self
    }

    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    pub fn with_hardware_id_rotation(mut self, enabled: bool) -> Self {
        self.rotate_hardware_id = enabled;
        self
    }

    pub fn with_auto_rotation(mut self, interval: Duration) -> Self {
        self.auto_rotation = true;
        self.rotation_interval = interval;
        self
    }
}
