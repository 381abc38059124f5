//! Audit Trail Recorder
//!
//! Append-only JSONL copy of every committed log entry. The in-memory event
//! log forgets old entries; this file does not.
//!
//! Runs as a notification subscriber, so file I/O never happens under the
//! engine's state lock.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::error::EngineResult;
use crate::logic::engine::{wait_for_shutdown, Engine};
use crate::logic::event_log::LogEntry;
use crate::logic::events::EngineEvent;

/// Append-only JSONL recorder
pub struct AuditRecorder {
    writer: BufWriter<File>,
    path: PathBuf,
    recorded: u64,
}

impl AuditRecorder {
    /// Open (or create) the trail file for appending
    pub fn open(path: &Path) -> EngineResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        log::info!("Opened audit trail: {:?}", path);

        Ok(Self {
            writer: BufWriter::new(file),
            path: path.to_path_buf(),
            recorded: 0,
        })
    }

    /// Record one entry and flush for durability
    pub fn record(&mut self, entry: &LogEntry) -> EngineResult<()> {
        let line = entry.to_jsonl()?;
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        self.recorded += 1;
        Ok(())
    }

    pub fn recorded(&self) -> u64 {
        self.recorded
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Read a trail back, skipping lines that fail to parse
pub fn read_entries(path: &Path) -> EngineResult<Vec<LogEntry>> {
    let content = std::fs::read_to_string(path)?;
    Ok(content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match serde_json::from_str(line) {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::warn!("Skipping malformed audit line: {}", e);
                None
            }
        })
        .collect())
}

/// Subscribe to `engine` and record entries until shutdown.
///
/// The file is opened before returning, so a bad path fails fast.
/// The task resolves to the number of entries recorded.
pub fn spawn(engine: &Engine, path: &Path) -> EngineResult<JoinHandle<u64>> {
    let mut recorder = AuditRecorder::open(path)?;
    let mut events = engine.subscribe();
    let mut shutdown = engine.shutdown_signal();

    Ok(tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;

                received = events.recv() => match received {
                    Ok(EngineEvent::LogAppended(entry)) => {
                        if let Err(e) = recorder.record(&entry) {
                            log::error!("Failed to write audit entry {}: {}", entry.id, e);
                        }
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(missed)) => {
                        log::warn!("Audit trail lagged, {} notifications missed", missed);
                    }
                    Err(RecvError::Closed) => break,
                },

                _ = wait_for_shutdown(&mut shutdown) => {
                    // Drain what was committed before the signal
                    while let Ok(event) = events.try_recv() {
                        if let EngineEvent::LogAppended(entry) = event {
                            if let Err(e) = recorder.record(&entry) {
                                log::error!("Failed to write audit entry {}: {}", entry.id, e);
                            }
                        }
                    }
                    break;
                }
            }
        }

        log::info!("Audit trail closed: {} entries written to {:?}", recorder.recorded(), recorder.path());
        recorder.recorded()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    use crate::logic::config::EngineConfig;
    use crate::logic::event_log::EntryKind;
    use crate::logic::threat::{DetectionEvent, RiskLevel};

    #[test]
    fn test_record_and_read_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("audit.jsonl");

        let mut recorder = AuditRecorder::open(&path).unwrap();
        let entry = LogEntry::new(Utc::now(), "System start", "Local Daemon", RiskLevel::Safe, EntryKind::System);
        recorder.record(&entry).unwrap();
        assert_eq!(recorder.recorded(), 1);

        let read = read_entries(&path).unwrap();
        assert_eq!(read, vec![entry]);
    }

    #[test]
    fn test_reopen_appends() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("audit.jsonl");

        for n in 0..2 {
            let mut recorder = AuditRecorder::open(&path).unwrap();
            let entry = LogEntry::new(Utc::now(), format!("run {}", n), "test", RiskLevel::Medium, EntryKind::Detection);
            recorder.record(&entry).unwrap();
        }

        std::fs::OpenOptions::new()
            .append(true)
            .open(&path)
            .and_then(|mut f| f.write_all(b"not json\n"))
            .unwrap();

        let read = read_entries(&path).unwrap();
        assert_eq!(read.len(), 2);
        assert_eq!(read[1].description, "run 1");
    }

    #[tokio::test]
    async fn test_spawned_recorder_follows_engine() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("audit.jsonl");

        // Capacity 1: the trail must keep what the in-memory log evicts
        let engine = Engine::new(EngineConfig::for_testing().with_log_capacity(1)).unwrap();
        let handle = spawn(&engine, &path).unwrap();

        engine.submit(DetectionEvent::new("Critical port scan attempt", "210.5.4.1", RiskLevel::High));
        engine.panic_rotate();
        engine.shutdown();

        let written = handle.await.unwrap();
        assert_eq!(written, 4);

        let kinds: Vec<EntryKind> = read_entries(&path).unwrap().into_iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                EntryKind::Detection,
                EntryKind::Mitigation,
                EntryKind::RotationInitiated,
                EntryKind::RotationCompleted,
            ]
        );
        assert_eq!(engine.snapshot().log.len(), 1);
    }
}
