//! Threat Response Core - Headless Daemon
//!
//! Runs the engine with its monitoring loop until Ctrl-C. Notifications
//! are written to the log in place of a UI renderer.

use tokio::sync::broadcast::error::RecvError;

use threat_response_core::api::commands;
use threat_response_core::constants::{APP_NAME, APP_VERSION};
use threat_response_core::logic::engine::Engine;
use threat_response_core::logic::events::EngineEvent;
use threat_response_core::logic::{analysis_loop, audit};
use threat_response_core::EngineConfig;

const DAEMON_ORIGIN: &str = "Local Daemon";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting {} v{}...", APP_NAME, APP_VERSION);

    let config = EngineConfig::from_env();
    let engine = match commands::init(config) {
        Ok(engine) => engine,
        Err(e) => {
            log::error!("Engine init failed: {}", e);
            std::process::exit(1);
        }
    };

    // Audit trail is optional; a bad path only costs the trail
    let audit_handle = match engine.config().audit_log_path.clone() {
        Some(path) => match audit::spawn(&engine, &path) {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::warn!("Audit trail init failed: {} - entries will not be persisted", e);
                None
            }
        },
        None => None,
    };

    let renderer = tokio::spawn(render_notifications(engine.clone()));

    engine.record_system_event("System start", DAEMON_ORIGIN);
    let monitor = analysis_loop::start(engine.clone());

    let snap = engine.snapshot();
    log::info!("{}", snap.status_text());
    log::info!("Identity: {} ({})", snap.identity.address, snap.identity.hardware_id);

    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl-C: {}", e);
    }

    log::info!("Shutting down...");
    engine.record_system_event("System stop", DAEMON_ORIGIN);
    engine.shutdown();

    match monitor.await {
        Ok(stats) => log::info!(
            "Monitor summary: {} ticks, {} events, {} mitigations, {} scheduled rotations",
            stats.ticks,
            stats.events,
            stats.mitigations,
            stats.scheduled_rotations
        ),
        Err(e) => log::error!("Monitoring loop failed: {}", e),
    }

    if let Some(handle) = audit_handle {
        if let Err(e) = handle.await {
            log::error!("Audit trail task failed: {}", e);
        }
    }
    renderer.abort();

    let snap = engine.snapshot();
    log::info!(
        "Final state: level {}, {} threats and {} rotations in log, {} events total",
        snap.current_level.display_label(),
        snap.threat_count,
        snap.rotation_count,
        snap.total_events
    );
}

/// Stand-in for the dashboard: log every notification
async fn render_notifications(engine: Engine) {
    let mut events = engine.subscribe();

    loop {
        match events.recv().await {
            Ok(EngineEvent::LevelChanged(transition)) => {
                log::info!(
                    "[UI] Threat level {} -> {}: {}",
                    transition.from.display_label(),
                    transition.to.display_label(),
                    transition.to.status_text()
                );
            }
            Ok(EngineEvent::LogAppended(entry)) => {
                log::info!(
                    "[UI] {} | {} | {} | {}",
                    entry.timestamp.format("%H:%M:%S"),
                    entry.severity.display_label(),
                    entry.origin,
                    entry.description
                );
            }
            Ok(EngineEvent::IdentityRotated { trigger, identity }) => {
                log::info!(
                    "[UI] Identity rotated ({}): {} / {}",
                    trigger,
                    identity.address,
                    identity.hardware_id
                );
            }
            Ok(event @ EngineEvent::SettingsChanged { .. }) => {
                log::debug!("[UI] {}", event.name());
            }
            Err(RecvError::Lagged(missed)) => {
                log::warn!("[UI] Renderer lagged, {} notifications missed", missed);
            }
            Err(RecvError::Closed) => break,
        }
    }
}
