//! Engine Commands - API for UI bridges
//!
//! Thin wrappers over the process-wide engine. Errors are flattened to
//! `String` so a frontend can show them as-is.

use std::path::Path;

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::logic::config::EngineConfig;
use crate::logic::detection::{ReputationVerdict, Sensitivity};
use crate::logic::engine::{Engine, EngineSnapshot};
use crate::logic::event_log::LogEntry;
use crate::logic::identity::Identity;

static ENGINE: OnceCell<Engine> = OnceCell::new();

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Status bar view of the current level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreatStatus {
    pub level: String,
    /// 0 = safe, 2 = high
    pub severity: u8,
    pub label: String,
    pub status_text: String,
    pub color: String,
    pub threat_count: usize,
    pub rotation_count: usize,
}

// ============================================================================
// LIFECYCLE
// ============================================================================

/// Create the global engine. Later calls return the existing one.
pub fn init(config: EngineConfig) -> Result<Engine, String> {
    if let Some(existing) = ENGINE.get() {
        log::warn!("Engine already initialized, ignoring new config");
        return Ok(existing.clone());
    }

    ENGINE
        .get_or_try_init(|| Engine::new(config))
        .cloned()
        .map_err(|e| e.to_string())
}

/// Handle to the global engine
pub fn engine() -> EngineResult<Engine> {
    engine_in(&ENGINE)
}

fn engine_in(cell: &OnceCell<Engine>) -> EngineResult<Engine> {
    cell.get().cloned().ok_or(EngineError::NotInitialized)
}

fn with_engine() -> Result<Engine, String> {
    engine().map_err(|e| e.to_string())
}

// ============================================================================
// USER ACTIONS
// ============================================================================

/// Emergency identity rotation
pub async fn panic_rotate() -> Result<Identity, String> {
    Ok(with_engine()?.panic_rotate())
}

/// Classify a URL or IP; unsafe targets are logged as detections
pub async fn check_reputation(target: String) -> Result<ReputationVerdict, String> {
    with_engine()?
        .check_reputation(&target)
        .await
        .map_err(|e| e.to_string())
}

// ============================================================================
// READS
// ============================================================================

pub async fn get_snapshot() -> Result<EngineSnapshot, String> {
    Ok(with_engine()?.snapshot())
}

pub async fn get_threat_status() -> Result<ThreatStatus, String> {
    let snap = with_engine()?.snapshot();
    let level = snap.current_level;

    Ok(ThreatStatus {
        level: level.as_str().to_string(),
        severity: level.severity_level(),
        label: level.display_label().to_string(),
        status_text: level.status_text().to_string(),
        color: level.color().to_string(),
        threat_count: snap.threat_count,
        rotation_count: snap.rotation_count,
    })
}

/// Log entries, newest first
pub async fn get_event_log(limit: Option<usize>) -> Result<Vec<LogEntry>, String> {
    let snap = with_engine()?.snapshot();
    let limit = limit.unwrap_or(snap.log_capacity);
    let mut entries = snap.newest_first();
    entries.truncate(limit);
    Ok(entries)
}

pub async fn get_identity() -> Result<Identity, String> {
    Ok(with_engine()?.identity())
}

/// Write the current snapshot as pretty JSON
pub async fn export_snapshot(path: String) -> Result<bool, String> {
    let snap = with_engine()?.snapshot();
    let content = serde_json::to_string_pretty(&snap)
        .map_err(|e| format!("JSON error: {}", e))?;

    let path = Path::new(&path);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| format!("File write error: {}", e))?;
    }
    std::fs::write(path, content).map_err(|e| format!("File write error: {}", e))?;

    log::info!("Exported snapshot to {:?}", path);
    Ok(true)
}

// ============================================================================
// SETTINGS
// ============================================================================

pub async fn set_auto_response(enabled: bool) -> Result<bool, String> {
    with_engine()?.set_auto_response(enabled);
    Ok(enabled)
}

pub async fn set_detection_enabled(enabled: bool) -> Result<bool, String> {
    with_engine()?.set_detection_enabled(enabled);
    Ok(enabled)
}

pub async fn set_mac_spoofing(enabled: bool) -> Result<bool, String> {
    with_engine()?.set_hardware_id_rotation(enabled);
    Ok(enabled)
}

/// Accepts "low", "medium" or "high"
pub async fn set_detection_sensitivity(sensitivity: String) -> Result<String, String> {
    let sensitivity: Sensitivity = sensitivity.parse()?;
    with_engine()?.set_sensitivity(sensitivity);
    Ok(sensitivity.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::threat::RiskLevel;
    use tempfile::TempDir;

    #[test]
    fn test_uninitialized_cell() {
        let cell = OnceCell::new();
        let err = engine_in(&cell).unwrap_err();
        assert!(matches!(err, EngineError::NotInitialized));
        assert_eq!(err.to_string(), "Engine not initialized");
    }

    // The only test touching the global engine
    #[tokio::test]
    async fn test_global_command_flow() {
        let config = EngineConfig::for_testing().with_auto_response(false);
        let first = init(config.clone()).unwrap();
        let second = init(config.with_log_capacity(3)).unwrap();
        assert_eq!(second.config().log_capacity, first.config().log_capacity);

        let status = get_threat_status().await.unwrap();
        assert_eq!(status.label, "LOW");
        assert_eq!(status.severity, 0);

        let err = check_reputation("   ".to_string()).await.unwrap_err();
        assert_eq!(err, "Invalid target: Please enter a valid URL or IP");

        let verdict = check_reputation("tracker-malware.net".to_string()).await.unwrap();
        assert_eq!(verdict.level, RiskLevel::High);
        let status = get_threat_status().await.unwrap();
        assert_eq!(status.level, "high");
        assert_eq!(status.severity, 2);

        let before = get_identity().await.unwrap();
        let after = panic_rotate().await.unwrap();
        assert!(!after.same_endpoint(&before));
        assert_eq!(get_snapshot().await.unwrap().current_level, RiskLevel::Safe);

        let log = get_event_log(Some(2)).await.unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].description, "Emergency identity rotation success");
        assert_eq!(log[1].description, "Emergency identity rotation initiated");

        assert!(!set_mac_spoofing(false).await.unwrap());
        let kept = panic_rotate().await.unwrap();
        assert_eq!(kept.hardware_id, after.hardware_id);

        assert_eq!(set_detection_sensitivity("HIGH".to_string()).await.unwrap(), "high");
        assert!(set_detection_sensitivity("paranoid".to_string()).await.is_err());
        assert!(!set_auto_response(false).await.unwrap());
        assert!(!set_detection_enabled(false).await.unwrap());

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("snapshot.json");
        assert!(export_snapshot(path.to_string_lossy().into_owned()).await.unwrap());
        let exported: EngineSnapshot =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(exported.rotation_count, 2);
        assert_eq!(exported.total_rotations, 2);
        assert!(!exported.hardware_id_rotation);
        assert!(!exported.detection_enabled);
    }
}
