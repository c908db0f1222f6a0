//! permwatch-api: Shared types for the permwatch permission tracker
//!
//! This crate defines the data exchanged between an extension host platform
//! and the grant store: the capability vocabulary, the grant snapshot, and
//! the partial deltas delivered by grant/revoke events. Serialization uses
//! the platform's camelCase permission tags.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A named optional permission the host platform can grant.
///
/// The vocabulary is the platform's fixed set of optional permissions plus
/// two extension-specific extras, `tabGroups` and `favicon`. Tags outside
/// the vocabulary fail to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Capability {
    Bookmarks,
    BrowsingData,
    ClipboardRead,
    ClipboardWrite,
    Cookies,
    Downloads,
    Geolocation,
    History,
    Idle,
    Management,
    Notifications,
    Privacy,
    Proxy,
    Sessions,
    Tabs,
    TopSites,
    WebNavigation,
    WebRequest,
    WebRequestBlocking,
    /// Chrome-only tab grouping APIs.
    TabGroups,
    /// Access to the internal favicon cache.
    Favicon,
}

impl Capability {
    /// All known capabilities, in tag order.
    pub const ALL: [Capability; 21] = [
        Capability::Bookmarks,
        Capability::BrowsingData,
        Capability::ClipboardRead,
        Capability::ClipboardWrite,
        Capability::Cookies,
        Capability::Downloads,
        Capability::Geolocation,
        Capability::History,
        Capability::Idle,
        Capability::Management,
        Capability::Notifications,
        Capability::Privacy,
        Capability::Proxy,
        Capability::Sessions,
        Capability::Tabs,
        Capability::TopSites,
        Capability::WebNavigation,
        Capability::WebRequest,
        Capability::WebRequestBlocking,
        Capability::TabGroups,
        Capability::Favicon,
    ];

    /// The platform tag for this capability (e.g. `"clipboardRead"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Bookmarks => "bookmarks",
            Capability::BrowsingData => "browsingData",
            Capability::ClipboardRead => "clipboardRead",
            Capability::ClipboardWrite => "clipboardWrite",
            Capability::Cookies => "cookies",
            Capability::Downloads => "downloads",
            Capability::Geolocation => "geolocation",
            Capability::History => "history",
            Capability::Idle => "idle",
            Capability::Management => "management",
            Capability::Notifications => "notifications",
            Capability::Privacy => "privacy",
            Capability::Proxy => "proxy",
            Capability::Sessions => "sessions",
            Capability::Tabs => "tabs",
            Capability::TopSites => "topSites",
            Capability::WebNavigation => "webNavigation",
            Capability::WebRequest => "webRequest",
            Capability::WebRequestBlocking => "webRequestBlocking",
            Capability::TabGroups => "tabGroups",
            Capability::Favicon => "favicon",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = ParseCapabilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Capability::ALL
            .iter()
            .find(|c| c.as_str() == s)
            .copied()
            .ok_or_else(|| ParseCapabilityError(s.to_string()))
    }
}

/// Error returned when a permission tag is outside the known vocabulary
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown capability tag: {0}")]
pub struct ParseCapabilityError(pub String);

/// One snapshot of everything the platform has granted.
///
/// Capabilities have set semantics: granting twice collapses to one entry.
/// Host patterns keep the platform's order and are NOT deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSet {
    /// Granted capabilities
    #[serde(default)]
    pub permissions: BTreeSet<Capability>,

    /// Granted host patterns, as returned by the platform (may contain
    /// wildcard origin patterns and duplicates)
    #[serde(default)]
    pub hosts: Vec<String>,
}

impl PermissionSet {
    /// Create an empty snapshot (nothing granted)
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot from explicit grants
    pub fn from_grants(
        permissions: impl IntoIterator<Item = Capability>,
        hosts: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            permissions: permissions.into_iter().collect(),
            hosts: hosts.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether a capability is currently granted
    pub fn contains(&self, capability: Capability) -> bool {
        self.permissions.contains(&capability)
    }

    /// Whether nothing at all is granted
    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty() && self.hosts.is_empty()
    }

    /// Derive the snapshot after a grant event.
    ///
    /// Capabilities are unioned in; host patterns are appended verbatim,
    /// keeping any duplicates the platform delivers.
    pub fn with_granted(&self, delta: &PermissionDelta) -> Self {
        let mut next = self.clone();
        next.permissions.extend(delta.permissions.iter().copied());
        next.hosts.extend(delta.hosts.iter().cloned());
        next
    }

    /// Derive the snapshot after a revoke event.
    ///
    /// Capabilities are removed by exact match. Host patterns are removed by
    /// exact string comparison only; no normalization is applied, so a stored
    /// pattern with different casing or shape survives revocation.
    pub fn with_revoked(&self, delta: &PermissionDelta) -> Self {
        let mut next = self.clone();
        for capability in &delta.permissions {
            next.permissions.remove(capability);
        }
        next.hosts.retain(|h| !delta.hosts.iter().any(|r| r == h));
        next
    }
}

/// Partial payload describing what a single platform event granted or
/// revoked. Both fields may be empty; the platform omits what a given event
/// does not touch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionDelta {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub permissions: Vec<Capability>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hosts: Vec<String>,
}

impl PermissionDelta {
    /// Create an empty delta
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a capability to the delta
    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.permissions.push(capability);
        self
    }

    /// Add a host pattern to the delta
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.hosts.push(host.into());
        self
    }

    /// Whether the delta carries no changes
    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty() && self.hosts.is_empty()
    }
}
