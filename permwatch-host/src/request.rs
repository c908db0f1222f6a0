//! Required-grant checks
//!
//! Consumers declare the capabilities and hosts a feature needs, then ask
//! what is still missing from the current snapshot to decide whether a grant
//! prompt is required. Against the unknown sentinel everything counts as
//! missing ("nothing granted yet").

use crate::matcher::contains_host_permission;
use permwatch_api::{Capability, PermissionDelta, PermissionSet};

/// The grants a feature needs before it can run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequiredPermissions {
    /// Required capabilities
    pub capabilities: Vec<Capability>,
    /// Required hosts; covered when any granted pattern matches them
    pub hosts: Vec<String>,
}

impl RequiredPermissions {
    /// Create an empty requirement
    pub fn new() -> Self {
        Self::default()
    }

    /// Require a capability
    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.capabilities.push(capability);
        self
    }

    /// Require a host to be covered by a granted pattern
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.hosts.push(host.into());
        self
    }

    /// Whether nothing is required
    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty() && self.hosts.is_empty()
    }

    /// What the snapshot is still missing.
    ///
    /// Capabilities are checked by set membership; hosts via
    /// [`contains_host_permission`], so a loose substring match counts as
    /// covered. `None` (the unknown sentinel) leaves everything missing.
    pub fn missing_from(&self, snapshot: Option<&PermissionSet>) -> PermissionDelta {
        let Some(snapshot) = snapshot else {
            return PermissionDelta {
                permissions: self.capabilities.clone(),
                hosts: self.hosts.clone(),
            };
        };

        PermissionDelta {
            permissions: self
                .capabilities
                .iter()
                .copied()
                .filter(|c| !snapshot.contains(*c))
                .collect(),
            hosts: self
                .hosts
                .iter()
                .filter(|h| !contains_host_permission(&snapshot.hosts, h))
                .cloned()
                .collect(),
        }
    }

    /// Whether the snapshot already covers everything required
    pub fn satisfied_by(&self, snapshot: Option<&PermissionSet>) -> bool {
        self.missing_from(snapshot).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_snapshot_everything_missing() {
        let required = RequiredPermissions::new()
            .with_capability(Capability::Bookmarks)
            .with_host("example.com");

        let missing = required.missing_from(None);
        assert_eq!(missing.permissions, vec![Capability::Bookmarks]);
        assert_eq!(missing.hosts, vec!["example.com"]);
        assert!(!required.satisfied_by(None));
    }

    #[test]
    fn test_empty_requirement_always_satisfied() {
        let required = RequiredPermissions::new();
        assert!(required.satisfied_by(None));
        assert!(required.satisfied_by(Some(&PermissionSet::new())));
    }

    #[test]
    fn test_satisfied_by_loose_host_match() {
        let required = RequiredPermissions::new()
            .with_capability(Capability::Favicon)
            .with_host("example.com");
        let snapshot = PermissionSet::from_grants(
            [Capability::Favicon],
            ["https://*.example.com/*"],
        );

        // Substring coverage: the pattern text contains "example.com".
        assert!(required.satisfied_by(Some(&snapshot)));
    }

    #[test]
    fn test_partially_missing() {
        let required = RequiredPermissions::new()
            .with_capability(Capability::Bookmarks)
            .with_capability(Capability::Favicon)
            .with_host("other.com");
        let snapshot = PermissionSet::from_grants(
            [Capability::Bookmarks],
            ["https://example.com/*"],
        );

        let missing = required.missing_from(Some(&snapshot));
        assert_eq!(missing.permissions, vec![Capability::Favicon]);
        assert_eq!(missing.hosts, vec!["other.com"]);
    }
}
