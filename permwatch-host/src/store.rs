//! Observable permission grant store
//!
//! Owns the single current [`PermissionSet`] snapshot and propagates every
//! commit to registered observers. Until the first hydration the store holds
//! an explicit unknown sentinel (`None`): consumers must read it as "nothing
//! granted yet", not "nothing granted".

use crate::audit::{AuditSink, NullAuditSink, PermissionEvent};
use crate::platform::PermissionPlatform;
use permwatch_api::{PermissionDelta, PermissionSet};
use std::sync::{Arc, Mutex, RwLock};

/// Handle returned by [`PermissionStore::subscribe`], used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

type ObserverCallback = Arc<dyn Fn(&PermissionSet) + Send + Sync>;

struct Observers {
    next_id: u64,
    entries: Vec<(ObserverId, ObserverCallback)>,
}

/// A cheaply cloneable handle to the shared grant snapshot.
///
/// All clones observe the same snapshot and observer list. Mutating
/// operations are infallible in-memory commits; observers are invoked
/// synchronously after each commit, in registration order, with no
/// content diffing (committing an identical snapshot still notifies).
#[derive(Clone)]
pub struct PermissionStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    snapshot: RwLock<Option<PermissionSet>>,
    observers: Mutex<Observers>,
    audit: Arc<dyn AuditSink>,
}

impl PermissionStore {
    /// Create a store at the unknown sentinel, with auditing disabled
    pub fn new() -> Self {
        Self::with_audit(Arc::new(NullAuditSink))
    }

    /// Create a store that records every commit to the given audit sink
    pub fn with_audit(audit: Arc<dyn AuditSink>) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                snapshot: RwLock::new(None),
                observers: Mutex::new(Observers {
                    next_id: 0,
                    entries: Vec::new(),
                }),
                audit,
            }),
        }
    }

    /// Current snapshot, or `None` while the store is still unknown.
    ///
    /// Never blocks beyond the internal lock, never fails.
    pub fn snapshot(&self) -> Option<PermissionSet> {
        self.inner.snapshot.read().unwrap().clone()
    }

    /// Whether a first hydration has completed
    pub fn is_hydrated(&self) -> bool {
        self.inner.snapshot.read().unwrap().is_some()
    }

    /// Fetch the full grant from the platform and commit it.
    ///
    /// Unconditionally overwrites any prior snapshot, including the unknown
    /// sentinel, and notifies all observers. Awaiting this inherits the
    /// platform's response time; no timeout is applied here.
    pub async fn hydrate(&self, platform: &dyn PermissionPlatform) {
        let grants = platform.get_all().await;
        self.replace(grants);
    }

    /// Commit a full snapshot wholesale and notify observers
    pub fn replace(&self, grants: PermissionSet) {
        tracing::info!(
            permissions = grants.permissions.len(),
            hosts = grants.hosts.len(),
            "Snapshot hydrated"
        );
        self.record(PermissionEvent::hydrated(&grants));

        {
            let mut snapshot = self.inner.snapshot.write().unwrap();
            *snapshot = Some(grants.clone());
        }
        self.notify(&grants);
    }

    /// Apply a grant event to the snapshot.
    ///
    /// Capabilities are unioned in; host patterns are appended with
    /// duplicates kept. An event arriving before the first hydration is
    /// dropped silently.
    pub fn apply_granted(&self, delta: &PermissionDelta) {
        let next = {
            let mut snapshot = self.inner.snapshot.write().unwrap();
            let Some(current) = snapshot.as_ref() else {
                tracing::debug!("Grant event before first hydration, dropped");
                return;
            };
            let next = current.with_granted(delta);
            *snapshot = Some(next.clone());
            next
        };

        tracing::debug!(
            permissions = ?delta.permissions,
            hosts = ?delta.hosts,
            "Grant applied"
        );
        self.record(PermissionEvent::granted(delta));
        self.notify(&next);
    }

    /// Apply a revoke event to the snapshot.
    ///
    /// Capabilities and host patterns are removed by exact match only (no
    /// host normalization). An event arriving before the first hydration is
    /// dropped silently.
    pub fn apply_revoked(&self, delta: &PermissionDelta) {
        let next = {
            let mut snapshot = self.inner.snapshot.write().unwrap();
            let Some(current) = snapshot.as_ref() else {
                tracing::debug!("Revoke event before first hydration, dropped");
                return;
            };
            let next = current.with_revoked(delta);
            *snapshot = Some(next.clone());
            next
        };

        tracing::debug!(
            permissions = ?delta.permissions,
            hosts = ?delta.hosts,
            "Revocation applied"
        );
        self.record(PermissionEvent::revoked(delta));
        self.notify(&next);
    }

    /// Register an observer called synchronously after every commit
    pub fn subscribe(
        &self,
        callback: impl Fn(&PermissionSet) + Send + Sync + 'static,
    ) -> ObserverId {
        let mut observers = self.inner.observers.lock().unwrap();
        let id = ObserverId(observers.next_id);
        observers.next_id += 1;
        observers.entries.push((id, Arc::new(callback)));
        id
    }

    /// Remove an observer; returns false if the id was already gone
    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        let mut observers = self.inner.observers.lock().unwrap();
        let before = observers.entries.len();
        observers.entries.retain(|(entry_id, _)| *entry_id != id);
        observers.entries.len() != before
    }

    // Callbacks run without the observer lock held, so an observer may
    // re-read the store or manage subscriptions from within a notification.
    fn notify(&self, snapshot: &PermissionSet) {
        let callbacks: Vec<ObserverCallback> = {
            let observers = self.inner.observers.lock().unwrap();
            observers.entries.iter().map(|(_, cb)| cb.clone()).collect()
        };
        for callback in callbacks {
            callback(snapshot);
        }
    }

    fn record(&self, event: PermissionEvent) {
        if let Err(e) = self.inner.audit.record(event) {
            tracing::warn!(error = %e, "Failed to record audit event");
        }
    }
}

impl Default for PermissionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PermissionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionStore")
            .field("snapshot", &*self.inner.snapshot.read().unwrap())
            .finish_non_exhaustive()
    }
}
