//! permwatch-host: Reactive permission grant tracking
//!
//! Keeps one observable snapshot of everything an extension host platform
//! has granted (named capabilities plus host patterns) and answers whether a
//! host is already covered by a granted pattern.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                        PlatformWatcher                        │
//! │                                                               │
//! │  ┌────────────────────┐   deltas   ┌───────────────────────┐  │
//! │  │ PermissionPlatform │───────────►│    PermissionStore    │  │
//! │  │  (browser binding, │  hydrate   │ Option<PermissionSet> │  │
//! │  │   MemoryPlatform)  │            │ observers + AuditSink │  │
//! │  └────────────────────┘            └───────────────────────┘  │
//! └───────────────────────────────────────────────────────────────┘
//!              consumers: snapshot() / subscribe(),
//!        RequiredPermissions, contains_host_permission
//! ```
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use permwatch_host::{contains_host_permission, MemoryPlatform, PlatformWatcherBuilder};
//!
//! let watcher = PlatformWatcherBuilder::new()
//!     .platform(MemoryPlatform::new())
//!     .build()
//!     .await?;
//!
//! let snapshot = watcher.store().snapshot();
//! if let Some(snapshot) = snapshot {
//!     let covered = contains_host_permission(&snapshot.hosts, "sub.example.com");
//! }
//! ```

pub mod audit;
pub mod matcher;
pub mod platform;
pub mod request;
pub mod store;
pub mod watch;

// Re-exports for convenience
pub use audit::{AuditError, AuditSink, FileAuditSink, MemoryAuditSink, NullAuditSink};
pub use audit::{PermissionEvent, PermissionEventKind};
pub use matcher::{contains_host_permission, normalize_host};
pub use platform::{DeltaCallback, MemoryPlatform, PermissionPlatform};
pub use request::RequiredPermissions;
pub use store::{ObserverId, PermissionStore};
pub use watch::{BuilderError, PlatformWatcher, PlatformWatcherBuilder};

pub use permwatch_api::{Capability, ParseCapabilityError, PermissionDelta, PermissionSet};
