//! Integration tests for end-to-end grant tracking

use permwatch_host::{
    contains_host_permission, Capability, MemoryAuditSink, MemoryPlatform, PermissionDelta,
    PermissionEventKind, PermissionSet, PermissionStore, PlatformWatcher, PlatformWatcherBuilder,
    RequiredPermissions,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[tokio::test]
async fn test_end_to_end_grant_tracking() {
    let platform = MemoryPlatform::with_grants(PermissionSet::from_grants(
        [Capability::Bookmarks],
        ["https://*.example.com/*"],
    ));

    let watcher = PlatformWatcher::new(PermissionStore::new(), Arc::new(platform.clone())).await;
    let store = watcher.store();

    let notified = Arc::new(AtomicUsize::new(0));
    let counter = notified.clone();
    store.subscribe(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    // Baseline loaded before listeners, so the host is covered already.
    let snapshot = store.snapshot().expect("hydrated");
    assert!(contains_host_permission(&snapshot.hosts, "example.com"));
    assert!(!contains_host_permission(&snapshot.hosts, "other.com"));

    // A platform grant event flows into the snapshot and notifies.
    platform.grant(
        PermissionDelta::new()
            .with_capability(Capability::Favicon)
            .with_host("https://news.ycombinator.com/*"),
    );
    assert_eq!(notified.load(Ordering::SeqCst), 1);

    let snapshot = store.snapshot().unwrap();
    assert!(snapshot.contains(Capability::Favicon));
    assert!(contains_host_permission(&snapshot.hosts, "news.ycombinator.com"));

    // Revocation flows through as well.
    platform.revoke(PermissionDelta::new().with_capability(Capability::Favicon));
    assert_eq!(notified.load(Ordering::SeqCst), 2);
    assert!(!store.snapshot().unwrap().contains(Capability::Favicon));
}

#[tokio::test]
async fn test_revocation_leaves_case_variant_still_matching() {
    let platform = MemoryPlatform::with_grants(PermissionSet::from_grants(
        Vec::<Capability>::new(),
        ["HTTPS://Example.COM/*"],
    ));
    let watcher = PlatformWatcher::new(PermissionStore::new(), Arc::new(platform.clone())).await;

    // Revoking with different casing misses: host removal is exact-match.
    platform.revoke(PermissionDelta::new().with_host("https://example.com/*"));

    let snapshot = watcher.store().snapshot().unwrap();
    assert_eq!(snapshot.hosts, vec!["HTTPS://Example.COM/*"]);
    // The matcher still covers the host through the surviving variant.
    assert!(contains_host_permission(&snapshot.hosts, "example.com"));
}

#[tokio::test]
async fn test_required_permissions_drive_prompt_decision() {
    let platform = MemoryPlatform::new();
    let watcher = PlatformWatcherBuilder::new()
        .platform(platform.clone())
        .build()
        .await
        .unwrap();
    let store = watcher.store();

    let required = RequiredPermissions::new()
        .with_capability(Capability::Bookmarks)
        .with_capability(Capability::Favicon)
        .with_host("example.com");

    let missing = required.missing_from(store.snapshot().as_ref());
    assert_eq!(missing.permissions.len(), 2);
    assert_eq!(missing.hosts, vec!["example.com"]);

    // The consumer would now prompt; the platform answers with a grant.
    platform.grant(missing);

    assert!(required.satisfied_by(store.snapshot().as_ref()));
}

#[tokio::test]
async fn test_audit_trail_of_a_session() {
    let sink = Arc::new(MemoryAuditSink::new());
    let store = PermissionStore::with_audit(sink.clone());
    let platform = MemoryPlatform::new();

    let _watcher = PlatformWatcher::new(store, Arc::new(platform.clone())).await;

    platform.grant(PermissionDelta::new().with_capability(Capability::History));
    platform.revoke(PermissionDelta::new().with_capability(Capability::History));

    assert_eq!(sink.find_by_kind(PermissionEventKind::Hydrated).len(), 1);
    assert_eq!(sink.find_by_kind(PermissionEventKind::Granted).len(), 1);
    assert_eq!(sink.find_by_kind(PermissionEventKind::Revoked).len(), 1);
}
