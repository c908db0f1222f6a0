//! Platform permission API abstraction
//!
//! The host platform owns the actual permission grants; this module defines
//! the narrow surface the store needs from it: one full fetch plus two event
//! subscription primitives. A real browser binding implements
//! [`PermissionPlatform`]; [`MemoryPlatform`] is an in-process implementation
//! for tests and embedders without a browser host.

use async_trait::async_trait;
use permwatch_api::{PermissionDelta, PermissionSet};
use std::sync::{Arc, Mutex};

/// Callback invoked with the delta a platform event carried
pub type DeltaCallback = Arc<dyn Fn(PermissionDelta) + Send + Sync>;

/// The permission surface of the host platform
#[async_trait]
pub trait PermissionPlatform: Send + Sync {
    /// Fetch the full current grant.
    ///
    /// Request/response with no timeout at this layer; a platform that never
    /// responds simply never resolves, and callers own any deadline. Fetch
    /// failures are the implementation's concern and are not modeled here.
    async fn get_all(&self) -> PermissionSet;

    /// Register a listener invoked whenever capabilities or hosts are granted
    fn on_added(&self, callback: DeltaCallback);

    /// Register a listener invoked whenever capabilities or hosts are revoked
    fn on_removed(&self, callback: DeltaCallback);
}

/// In-process platform implementation.
///
/// Holds its own grant table and fires registered listeners when
/// [`grant`](MemoryPlatform::grant) or [`revoke`](MemoryPlatform::revoke)
/// are called, mimicking the event delivery of a real host.
#[derive(Clone, Default)]
pub struct MemoryPlatform {
    grants: Arc<Mutex<PermissionSet>>,
    added: Arc<Mutex<Vec<DeltaCallback>>>,
    removed: Arc<Mutex<Vec<DeltaCallback>>>,
}

impl MemoryPlatform {
    /// Create a platform with nothing granted
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a platform pre-seeded with grants (no events fired)
    pub fn with_grants(grants: PermissionSet) -> Self {
        let platform = Self::new();
        platform.set_grants(grants);
        platform
    }

    /// Replace the grant table without firing listeners
    pub fn set_grants(&self, grants: PermissionSet) {
        *self.grants.lock().unwrap() = grants;
    }

    /// Grant a delta and fire the added listeners
    pub fn grant(&self, delta: PermissionDelta) {
        {
            let mut grants = self.grants.lock().unwrap();
            *grants = grants.with_granted(&delta);
        }
        for callback in self.listeners(&self.added) {
            callback(delta.clone());
        }
    }

    /// Revoke a delta and fire the removed listeners
    pub fn revoke(&self, delta: PermissionDelta) {
        {
            let mut grants = self.grants.lock().unwrap();
            *grants = grants.with_revoked(&delta);
        }
        for callback in self.listeners(&self.removed) {
            callback(delta.clone());
        }
    }

    // Snapshot the listener list so callbacks run without the lock held.
    fn listeners(&self, slot: &Arc<Mutex<Vec<DeltaCallback>>>) -> Vec<DeltaCallback> {
        slot.lock().unwrap().clone()
    }
}

#[async_trait]
impl PermissionPlatform for MemoryPlatform {
    async fn get_all(&self) -> PermissionSet {
        self.grants.lock().unwrap().clone()
    }

    fn on_added(&self, callback: DeltaCallback) {
        self.added.lock().unwrap().push(callback);
    }

    fn on_removed(&self, callback: DeltaCallback) {
        self.removed.lock().unwrap().push(callback);
    }
}

impl std::fmt::Debug for MemoryPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryPlatform")
            .field("grants", &*self.grants.lock().unwrap())
            .finish()
    }
}
