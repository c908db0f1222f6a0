//! Platform change watcher
//!
//! Keeps a [`PermissionStore`] current with the host platform: one full
//! hydration for the baseline, then incremental updates from the platform's
//! grant/revoke events.

use crate::audit::{AuditSink, NullAuditSink};
use crate::platform::PermissionPlatform;
use crate::store::PermissionStore;
use std::sync::Arc;

/// Watches a platform and feeds its permission events into a store.
///
/// Construction performs a full hydration BEFORE registering the event
/// listeners, so no event can arrive while the store still holds the unknown
/// sentinel due to a missing baseline.
///
/// Construct at most once per platform per process: the platform has no
/// listener deduplication, so a second watcher would deliver every event
/// twice.
pub struct PlatformWatcher {
    store: PermissionStore,
    _platform: Arc<dyn PermissionPlatform>,
}

impl PlatformWatcher {
    /// Hydrate the store from the platform, then subscribe to its changes
    pub async fn new(store: PermissionStore, platform: Arc<dyn PermissionPlatform>) -> Self {
        store.hydrate(platform.as_ref()).await;

        let granted = store.clone();
        platform.on_added(Arc::new(move |delta| {
            granted.apply_granted(&delta);
        }));

        let revoked = store.clone();
        platform.on_removed(Arc::new(move |delta| {
            revoked.apply_revoked(&delta);
        }));

        tracing::info!("Watching platform for permission changes");
        Self {
            store,
            _platform: platform,
        }
    }

    /// Get a handle to the tracked store
    pub fn store(&self) -> &PermissionStore {
        &self.store
    }
}

impl std::fmt::Debug for PlatformWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformWatcher")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

/// Builder assembling a watcher from its parts.
///
/// The store defaults to a fresh one with auditing disabled; only the
/// platform is mandatory.
pub struct PlatformWatcherBuilder {
    platform: Option<Arc<dyn PermissionPlatform>>,
    audit: Option<Arc<dyn AuditSink>>,
}

impl PlatformWatcherBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            platform: None,
            audit: None,
        }
    }

    /// Set the platform to watch
    pub fn platform(mut self, platform: impl PermissionPlatform + 'static) -> Self {
        self.platform = Some(Arc::new(platform));
        self
    }

    /// Set the audit sink the store records commits to
    pub fn audit(mut self, audit: impl AuditSink + 'static) -> Self {
        self.audit = Some(Arc::new(audit));
        self
    }

    /// Hydrate and start watching
    pub async fn build(self) -> Result<PlatformWatcher, BuilderError> {
        let platform = self.platform.ok_or(BuilderError::MissingPlatform)?;
        let audit = self.audit.unwrap_or_else(|| Arc::new(NullAuditSink));
        let store = PermissionStore::with_audit(audit);

        Ok(PlatformWatcher::new(store, platform).await)
    }
}

impl Default for PlatformWatcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur while assembling a watcher
#[derive(Debug, thiserror::Error)]
pub enum BuilderError {
    #[error("No platform configured")]
    MissingPlatform,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryPlatform;
    use permwatch_api::{Capability, PermissionDelta, PermissionSet};

    #[tokio::test]
    async fn test_watcher_hydrates_before_listening() {
        let platform = MemoryPlatform::with_grants(PermissionSet::from_grants(
            [Capability::Bookmarks],
            ["https://a.com/*"],
        ));

        let watcher = PlatformWatcher::new(PermissionStore::new(), Arc::new(platform)).await;

        let snapshot = watcher.store().snapshot().unwrap();
        assert!(snapshot.contains(Capability::Bookmarks));
        assert_eq!(snapshot.hosts, vec!["https://a.com/*"]);
    }

    #[tokio::test]
    async fn test_watcher_applies_platform_events() {
        let platform = MemoryPlatform::new();
        let watcher = PlatformWatcher::new(PermissionStore::new(), Arc::new(platform.clone())).await;

        platform.grant(
            PermissionDelta::new()
                .with_capability(Capability::TabGroups)
                .with_host("https://b.com/*"),
        );

        let snapshot = watcher.store().snapshot().unwrap();
        assert!(snapshot.contains(Capability::TabGroups));
        assert_eq!(snapshot.hosts, vec!["https://b.com/*"]);

        platform.revoke(PermissionDelta::new().with_capability(Capability::TabGroups));
        assert!(!watcher.store().snapshot().unwrap().contains(Capability::TabGroups));
    }

    #[tokio::test]
    async fn test_builder_requires_platform() {
        let err = PlatformWatcherBuilder::new().build().await.unwrap_err();
        assert!(matches!(err, BuilderError::MissingPlatform));
    }

    #[tokio::test]
    async fn test_builder_defaults() {
        let watcher = PlatformWatcherBuilder::new()
            .platform(MemoryPlatform::new())
            .build()
            .await
            .unwrap();

        assert!(watcher.store().is_hydrated());
    }
}
