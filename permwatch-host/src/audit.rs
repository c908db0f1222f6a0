//! Audit system for tracking grant changes
//!
//! Provides a trait-based audit system that embedders can customize to log
//! every snapshot change (hydration, grant, revoke) to their preferred
//! destination.

use chrono::Utc;
use permwatch_api::{Capability, PermissionDelta, PermissionSet};
use serde::Serialize;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};
use thiserror::Error;

/// A recorded change to the grant snapshot
#[derive(Debug, Clone, Serialize)]
pub struct PermissionEvent {
    /// When the change was committed (RFC 3339)
    pub timestamp: String,
    /// What kind of change it was
    pub kind: PermissionEventKind,
    /// Capabilities involved in the change
    pub permissions: Vec<Capability>,
    /// Host patterns involved in the change
    pub hosts: Vec<String>,
}

impl PermissionEvent {
    fn new(kind: PermissionEventKind, permissions: Vec<Capability>, hosts: Vec<String>) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            kind,
            permissions,
            hosts,
        }
    }

    /// Event for a full fetch that replaced the snapshot
    pub fn hydrated(snapshot: &PermissionSet) -> Self {
        Self::new(
            PermissionEventKind::Hydrated,
            snapshot.permissions.iter().copied().collect(),
            snapshot.hosts.clone(),
        )
    }

    /// Event for an incremental grant
    pub fn granted(delta: &PermissionDelta) -> Self {
        Self::new(
            PermissionEventKind::Granted,
            delta.permissions.clone(),
            delta.hosts.clone(),
        )
    }

    /// Event for an incremental revocation
    pub fn revoked(delta: &PermissionDelta) -> Self {
        Self::new(
            PermissionEventKind::Revoked,
            delta.permissions.clone(),
            delta.hosts.clone(),
        )
    }
}

/// Type of snapshot change
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PermissionEventKind {
    /// Snapshot replaced wholesale by a platform fetch
    Hydrated,
    /// Capabilities or host patterns were granted
    Granted,
    /// Capabilities or host patterns were revoked
    Revoked,
}

/// Error type for audit operations
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Failed to write audit log: {0}")]
    WriteError(#[from] std::io::Error),

    #[error("Failed to serialize audit event: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Trait for audit event sinks
///
/// Embedders implement this trait to customize where grant changes are sent.
pub trait AuditSink: Send + Sync {
    /// Record an audit event
    fn record(&self, event: PermissionEvent) -> Result<(), AuditError>;

    /// Flush any buffered events
    fn flush(&self) -> Result<(), AuditError>;
}

// ============================================================================
// File-based Audit Sink
// ============================================================================

/// File-based audit sink (JSONL format)
///
/// Writes events to a file in JSON Lines format, one object per line.
/// Default location: `~/.config/<app>/grants.jsonl`
pub struct FileAuditSink {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl FileAuditSink {
    /// Create a new file audit sink
    pub fn new(path: impl AsRef<Path>) -> Result<Self, AuditError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            path,
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    /// Create a sink in the default location for an application
    pub fn default_for_app(app_name: &str) -> Result<Self, AuditError> {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from(".config"));
        let path = config_dir.join(app_name).join("grants.jsonl");
        Self::new(path)
    }

    /// Get the log file path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AuditSink for FileAuditSink {
    fn record(&self, event: PermissionEvent) -> Result<(), AuditError> {
        let json = serde_json::to_string(&event)?;
        let mut writer = self.writer.lock().unwrap();
        writeln!(writer, "{}", json)?;
        Ok(())
    }

    fn flush(&self) -> Result<(), AuditError> {
        let mut writer = self.writer.lock().unwrap();
        writer.flush()?;
        Ok(())
    }
}

impl fmt::Debug for FileAuditSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileAuditSink")
            .field("path", &self.path)
            .finish()
    }
}

// ============================================================================
// In-Memory Audit Sink
// ============================================================================

/// In-memory audit sink for testing or session-only history
pub struct MemoryAuditSink {
    events: RwLock<Vec<PermissionEvent>>,
    max_events: usize,
}

impl MemoryAuditSink {
    /// Create a new memory sink with default capacity (1000 events)
    pub fn new() -> Self {
        Self::with_capacity(1000)
    }

    /// Create a new memory sink with specified capacity
    pub fn with_capacity(max_events: usize) -> Self {
        Self {
            events: RwLock::new(Vec::with_capacity(max_events.min(1000))),
            max_events,
        }
    }

    /// Get all recorded events
    pub fn events(&self) -> Vec<PermissionEvent> {
        self.events.read().unwrap().clone()
    }

    /// Get event count
    pub fn count(&self) -> usize {
        self.events.read().unwrap().len()
    }

    /// Clear all events
    pub fn clear(&self) {
        self.events.write().unwrap().clear();
    }

    /// Find events by kind
    pub fn find_by_kind(&self, kind: PermissionEventKind) -> Vec<PermissionEvent> {
        self.events
            .read()
            .unwrap()
            .iter()
            .filter(|e| e.kind == kind)
            .cloned()
            .collect()
    }
}

impl Default for MemoryAuditSink {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, event: PermissionEvent) -> Result<(), AuditError> {
        let mut events = self.events.write().unwrap();
        if events.len() >= self.max_events {
            events.remove(0); // FIFO eviction
        }
        events.push(event);
        Ok(())
    }

    fn flush(&self) -> Result<(), AuditError> {
        Ok(())
    }
}

impl fmt::Debug for MemoryAuditSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryAuditSink")
            .field("count", &self.count())
            .field("max_events", &self.max_events)
            .finish()
    }
}

/// Null audit sink (discards all events)
#[derive(Debug, Default)]
pub struct NullAuditSink;

impl NullAuditSink {
    pub fn new() -> Self {
        Self
    }
}

impl AuditSink for NullAuditSink {
    fn record(&self, _event: PermissionEvent) -> Result<(), AuditError> {
        Ok(())
    }

    fn flush(&self) -> Result<(), AuditError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use permwatch_api::Capability;

    #[test]
    fn test_memory_sink() {
        let sink = MemoryAuditSink::new();
        let delta = PermissionDelta::new().with_capability(Capability::Bookmarks);

        sink.record(PermissionEvent::granted(&delta)).unwrap();

        assert_eq!(sink.count(), 1);
        let events = sink.find_by_kind(PermissionEventKind::Granted);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].permissions, vec![Capability::Bookmarks]);
    }

    #[test]
    fn test_memory_sink_eviction() {
        let sink = MemoryAuditSink::with_capacity(2);

        for host in ["a.com", "b.com", "c.com"] {
            let delta = PermissionDelta::new().with_host(host);
            sink.record(PermissionEvent::granted(&delta)).unwrap();
        }

        assert_eq!(sink.count(), 2);
        let events = sink.events();
        assert_eq!(events[0].hosts, vec!["b.com"]);
        assert_eq!(events[1].hosts, vec!["c.com"]);
    }

    #[test]
    fn test_null_sink() {
        let sink = NullAuditSink::new();
        let delta = PermissionDelta::new();

        assert!(sink.record(PermissionEvent::revoked(&delta)).is_ok());
        assert!(sink.flush().is_ok());
    }

    #[test]
    fn test_event_serialization() {
        let snapshot = PermissionSet::from_grants([Capability::Tabs], ["https://a.com/*"]);
        let event = PermissionEvent::hydrated(&snapshot);

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("hydrated"));
        assert!(json.contains("tabs"));
        assert!(json.contains("https://a.com/*"));
    }

    #[test]
    fn test_file_sink() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grants.jsonl");

        let sink = FileAuditSink::new(&path).unwrap();
        let delta = PermissionDelta::new().with_capability(Capability::History);

        sink.record(PermissionEvent::granted(&delta)).unwrap();
        sink.record(PermissionEvent::revoked(&delta)).unwrap();
        sink.flush().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.contains("granted"));
        assert!(content.contains("revoked"));
    }
}
