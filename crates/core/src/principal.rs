//! The invoking principal and its capability checks.

use std::collections::BTreeSet;

/// The entity on whose behalf a command is parsed and executed.
///
/// Requirement predicates on nodes receive the principal and typically ask it
/// for a capability (permission) by name.
pub trait Principal: Send + Sync + 'static {
    /// Display name, used in logs.
    fn name(&self) -> &str {
        "anonymous"
    }

    /// Whether the principal holds the named capability.
    fn has_capability(&self, capability: &str) -> bool;
}

/// A principal backed by a set of capability names.
///
/// Capabilities are hierarchical on `.` boundaries: holding `"demo.command"`
/// grants `"demo.command.tp"`. The capability `"*"` grants everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimplePrincipal {
    name: String,
    capabilities: BTreeSet<String>,
}

impl SimplePrincipal {
    /// Create a principal with no capabilities.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            capabilities: BTreeSet::new(),
        }
    }

    /// Grant a capability (builder pattern).
    pub fn grant(mut self, capability: impl Into<String>) -> Self {
        self.capabilities.insert(capability.into());
        self
    }

    /// A principal holding every capability.
    pub fn operator(name: impl Into<String>) -> Self {
        Self::new(name).grant("*")
    }

    /// Granted capability names.
    pub fn capabilities(&self) -> impl Iterator<Item = &str> {
        self.capabilities.iter().map(String::as_str)
    }
}

impl Principal for SimplePrincipal {
    fn name(&self) -> &str {
        &self.name
    }

    fn has_capability(&self, capability: &str) -> bool {
        if self.capabilities.contains("*") || self.capabilities.contains(capability) {
            return true;
        }
        capability
            .match_indices('.')
            .any(|(i, _)| self.capabilities.contains(&capability[..i]))
    }
}
