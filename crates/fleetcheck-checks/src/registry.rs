// crates/fleetcheck-checks/src/registry.rs
// ============================================================================
// Module: Check Registry
// Description: Registry for built-in and custom verification checks.
// Purpose: Resolve catalog check identifiers to check implementations.
// Dependencies: fleetcheck-core, thiserror
// ============================================================================

//! ## Overview
//! The check registry resolves catalog identifiers to check implementations
//! and implements the core [`fleetcheck_core::CheckLookup`] interface for
//! seamless integration with plan building. Built-ins are registered under
//! stable dotted identifiers; custom checks can be added as long as their
//! identifiers do not collide.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;

use fleetcheck_core::Check;
use fleetcheck_core::CheckId;
use fleetcheck_core::CheckLookup;
use thiserror::Error;

use crate::BgpPeersEstablished;
use crate::HostReachability;
use crate::InterfaceStatus;
use crate::SystemUptime;

// ============================================================================
// SECTION: Registry Errors
// ============================================================================

/// Registration failures.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A check is already registered under the identifier.
    #[error("check already registered: {0}")]
    AlreadyRegistered(CheckId),
}

// ============================================================================
// SECTION: Check Registry
// ============================================================================

/// Check registry keyed by stable check identifier.
///
/// # Invariants
/// - Check identifiers are unique within the registry.
/// - Registered checks are stored behind `Arc<dyn Check>` trait objects.
#[derive(Default)]
pub struct CheckRegistry {
    /// Check implementations keyed by identifier.
    checks: BTreeMap<CheckId, Arc<dyn Check>>,
}

impl CheckRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            checks: BTreeMap::new(),
        }
    }

    /// Creates a registry with all built-in checks registered.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        // Identifier collisions are impossible for the fixed built-in set.
        let builtins: [Arc<dyn Check>; 4] = [
            Arc::new(BgpPeersEstablished),
            Arc::new(InterfaceStatus),
            Arc::new(SystemUptime),
            Arc::new(HostReachability),
        ];
        for check in builtins {
            registry.checks.insert(check.id(), check);
        }
        registry
    }

    /// Registers a check under its own identifier.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when the identifier is already registered.
    pub fn register(&mut self, check: Arc<dyn Check>) -> Result<(), RegistryError> {
        let id = check.id();
        if self.checks.contains_key(&id) {
            return Err(RegistryError::AlreadyRegistered(id));
        }
        self.checks.insert(id, check);
        Ok(())
    }

    /// Returns the registered check identifiers in sorted order.
    #[must_use]
    pub fn ids(&self) -> Vec<CheckId> {
        self.checks.keys().cloned().collect()
    }
}

impl CheckLookup for CheckRegistry {
    fn lookup(&self, id: &CheckId) -> Option<Arc<dyn Check>> {
        self.checks.get(id).cloned()
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions and helpers are permitted."
    )]

    use super::*;

    #[test]
    fn builtins_are_resolvable() {
        let registry = CheckRegistry::with_builtins();
        for id in [
            "bgp.peers-established",
            "interfaces.status",
            "system.uptime",
            "connectivity.reachability",
        ] {
            assert!(registry.lookup(&CheckId::new(id)).is_some(), "missing {id}");
        }
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = CheckRegistry::with_builtins();
        let err = registry.register(Arc::new(SystemUptime)).unwrap_err();
        assert!(matches!(err, RegistryError::AlreadyRegistered(_)));
    }

    #[test]
    fn unknown_identifier_is_none() {
        let registry = CheckRegistry::with_builtins();
        assert!(registry.lookup(&CheckId::new("no.such-check")).is_none());
    }
}
