//! Monitoring Loop
//!
//! Ticks the detection source at a fixed interval and, when enabled, rotates
//! the identity on its own schedule. Both go through the engine's serialized
//! paths. Stops when the engine's shutdown signal is raised.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

use crate::logic::engine::{wait_for_shutdown, Engine};

const MIN_PERIOD: Duration = Duration::from_millis(10);

/// Counters reported when the loop exits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub ticks: u64,
    pub events: u64,
    pub mitigations: u64,
    pub scheduled_rotations: u64,
}

/// Spawn the loop on the current runtime
pub fn start(engine: Engine) -> JoinHandle<LoopStats> {
    tokio::spawn(run(engine))
}

pub async fn run(engine: Engine) -> LoopStats {
    let config = engine.config().clone();
    let mut shutdown = engine.shutdown_signal();
    let mut stats = LoopStats::default();

    let mut ticker = periodic(config.tick_interval);
    let mut rotation = config.auto_rotation.then(|| periodic(config.rotation_interval));

    log::info!(
        "Monitoring loop started (tick every {:?}, scheduled rotation: {})",
        config.tick_interval,
        match &rotation {
            Some(_) => format!("every {:?}", config.rotation_interval),
            None => "off".to_string(),
        }
    );

    loop {
        tokio::select! {
            biased;

            _ = wait_for_shutdown(&mut shutdown) => break,

            _ = ticker.tick() => {
                stats.ticks += 1;
                if let Some(outcome) = engine.tick() {
                    stats.events += 1;
                    if outcome.mitigated() {
                        stats.mitigations += 1;
                        log::warn!(
                            "[Monitor] {} from {} mitigated, identity rotated",
                            outcome.entry.description,
                            outcome.entry.origin
                        );
                    } else {
                        log::info!(
                            "[Monitor] {} from {} -> level {}",
                            outcome.entry.description,
                            outcome.entry.origin,
                            outcome.final_level()
                        );
                    }
                }
            }

            _ = next_rotation(&mut rotation) => {
                stats.scheduled_rotations += 1;
                let identity = engine.scheduled_rotate();
                log::info!("[Monitor] Scheduled rotation: now {}", identity.address);
            }
        }
    }

    log::info!(
        "Monitoring loop stopped after {} ticks ({} events, {} mitigations)",
        stats.ticks, stats.events, stats.mitigations
    );
    stats
}

/// First tick one full period from now
fn periodic(period: Duration) -> Interval {
    // interval_at panics on a zero period
    let period = period.max(MIN_PERIOD);
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

async fn next_rotation(rotation: &mut Option<Interval>) {
    match rotation {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::logic::config::EngineConfig;
    use crate::logic::event_log::EntryKind;

    fn engine(config: EngineConfig) -> Engine {
        Engine::new(config).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_ticks_at_interval_and_stops_on_shutdown() {
        let engine = engine(EngineConfig::for_testing().with_tick_interval(Duration::from_secs(5)));
        let handle = start(engine.clone());

        tokio::time::sleep(Duration::from_secs(5 * 10 + 1)).await;
        engine.shutdown();

        let stats = handle.await.unwrap();
        assert_eq!(stats.ticks, 10);
        assert_eq!(stats.scheduled_rotations, 0);
        assert!(stats.events <= stats.ticks);
        assert!(engine.snapshot().total_events >= stats.events);
    }

    #[tokio::test(start_paused = true)]
    async fn test_paused_detection_consumes_nothing() {
        let engine = engine(EngineConfig::for_testing().with_tick_interval(Duration::from_secs(1)));
        engine.set_detection_enabled(false);
        let handle = start(engine.clone());

        tokio::time::sleep(Duration::from_secs(100)).await;
        engine.shutdown();

        let stats = handle.await.unwrap();
        assert!(stats.ticks >= 99);
        assert_eq!(stats.events, 0);
        assert!(engine.snapshot().log.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_scheduled_rotation() {
        let config = EngineConfig::for_testing()
            .with_tick_interval(Duration::from_secs(3600))
            .with_auto_rotation(Duration::from_secs(5 * 60));
        let engine = engine(config);
        let before = engine.identity();
        let handle = start(engine.clone());

        tokio::time::sleep(Duration::from_secs(11 * 60)).await;
        engine.shutdown();

        let stats = handle.await.unwrap();
        assert_eq!(stats.scheduled_rotations, 2);

        let snap = engine.snapshot();
        assert!(!snap.identity.same_endpoint(&before));
        let scheduled = snap
            .log
            .iter()
            .filter(|e| e.kind == EntryKind::RotationCompleted)
            .count();
        assert_eq!(scheduled, 2);
    }

    #[tokio::test]
    async fn test_shutdown_before_start_exits_immediately() {
        let engine = engine(EngineConfig::for_testing());
        engine.shutdown();
        let stats = run(engine).await;
        assert_eq!(stats, LoopStats::default());
    }
}
