//! Central Configuration Constants
//!
//! Single source of truth for all engine defaults.
//! Every value can be overridden through the environment (see helpers below).

use std::time::Duration;

/// Maximum number of entries retained by the in-memory event log
pub const DEFAULT_LOG_CAPACITY: usize = 50;

/// Monitoring loop tick interval (seconds)
pub const DEFAULT_TICK_INTERVAL_SECS: u64 = 5;

/// Simulated latency of a reputation lookup (milliseconds)
pub const DEFAULT_REPUTATION_LATENCY_MS: u64 = 2_000;

/// Automated mitigation on HIGH events is enabled out of the box
pub const DEFAULT_AUTO_RESPONSE: bool = true;

/// Scheduled identity rotation is opt-in
pub const DEFAULT_AUTO_ROTATION: bool = false;

/// Rotations also replace the hardware id (MAC spoofing)
pub const DEFAULT_MAC_SPOOFING: bool = true;

/// Scheduled rotation interval (minutes) and its accepted range
pub const DEFAULT_ROTATION_INTERVAL_MINS: u64 = 15;
pub const MIN_ROTATION_INTERVAL_MINS: u64 = 5;
pub const MAX_ROTATION_INTERVAL_MINS: u64 = 120;

/// Keywords that mark a target as unsafe in the reputation check
pub const DEFAULT_DENYLIST: &[&str] = &["malware", "phishing", "tracker"];

/// Identity the engine boots with, before any rotation
pub const SEED_ADDRESS: &str = "10.20.30.150";
pub const SEED_HARDWARE_ID: &str = "00:0A:95:9D:68:F1";

/// Capacity of the change-notification channel
pub const NOTIFICATION_CHANNEL_CAPACITY: usize = 256;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "Threat Response Core";

// ============================================
// Helper functions to read from env with fallback
// ============================================

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

fn env_flag(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|s| {
            let s = s.trim().to_lowercase();
            s != "false" && s != "0" && s != "off"
        })
        .unwrap_or(default)
}

/// Get log capacity from environment or use default (never below 1)
pub fn get_log_capacity() -> usize {
    env_parse::<usize>("THREAT_LOG_CAPACITY")
        .unwrap_or(DEFAULT_LOG_CAPACITY)
        .max(1)
}

/// Get monitoring tick interval from environment or use default
pub fn get_tick_interval() -> Duration {
    let secs = env_parse::<u64>("THREAT_TICK_INTERVAL_SECS")
        .filter(|s| *s > 0)
        .unwrap_or(DEFAULT_TICK_INTERVAL_SECS);
    Duration::from_secs(secs)
}

/// Get reputation lookup latency from environment or use default
pub fn get_reputation_latency() -> Duration {
    Duration::from_millis(
        env_parse("THREAT_REPUTATION_LATENCY_MS").unwrap_or(DEFAULT_REPUTATION_LATENCY_MS),
    )
}

/// Check if automated response is enabled
pub fn is_auto_response_enabled() -> bool {
    env_flag("THREAT_AUTO_RESPONSE", DEFAULT_AUTO_RESPONSE)
}

/// Check if scheduled identity rotation is enabled
pub fn is_auto_rotation_enabled() -> bool {
    env_flag("THREAT_AUTO_ROTATION", DEFAULT_AUTO_ROTATION)
}

/// Check if rotations should also spoof a new hardware id
pub fn is_mac_spoofing_enabled() -> bool {
    env_flag("THREAT_MAC_SPOOFING", DEFAULT_MAC_SPOOFING)
}

/// Get scheduled rotation interval (clamped to the accepted range)
pub fn get_rotation_interval() -> Duration {
    let mins = env_parse::<u64>("THREAT_ROTATION_INTERVAL_MINS")
        .unwrap_or(DEFAULT_ROTATION_INTERVAL_MINS);
    Duration::from_secs(clamp_rotation_minutes(mins) * 60)
}

/// Clamp a rotation interval to MIN..=MAX minutes
pub fn clamp_rotation_minutes(mins: u64) -> u64 {
    mins.clamp(MIN_ROTATION_INTERVAL_MINS, MAX_ROTATION_INTERVAL_MINS)
}

/// Get the detection sensitivity name (parsed by the config layer)
pub fn get_detection_sensitivity() -> Option<String> {
    std::env::var("THREAT_DETECTION_SENSITIVITY").ok()
}

/// Get a fixed RNG seed for the detector, if any
pub fn get_detection_seed() -> Option<u64> {
    env_parse("THREAT_DETECTION_SEED")
}

/// Get reputation denylist keywords (comma separated) or the defaults
pub fn get_denylist() -> Vec<String> {
    let from_env: Vec<String> = std::env::var("THREAT_DENYLIST")
        .map(|s| {
            s.split(',')
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect()
        })
        .unwrap_or_default();

    if from_env.is_empty() {
        DEFAULT_DENYLIST.iter().map(|k| k.to_string()).collect()
    } else {
        from_env
    }
}

/// Get the JSONL audit trail path, if configured
pub fn get_audit_log_path() -> Option<std::path::PathBuf> {
    std::env::var("THREAT_AUDIT_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(std::path::PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_interval_clamped() {
        assert_eq!(clamp_rotation_minutes(1), MIN_ROTATION_INTERVAL_MINS);
        assert_eq!(clamp_rotation_minutes(30), 30);
        assert_eq!(clamp_rotation_minutes(500), MAX_ROTATION_INTERVAL_MINS);
    }

    #[test]
    fn test_default_denylist_is_lowercase() {
        assert!(DEFAULT_DENYLIST.iter().all(|k| k.chars().all(|c| c.is_ascii_lowercase())));
    }
}
