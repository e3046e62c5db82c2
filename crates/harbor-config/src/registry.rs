// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Capability registry.
//!
//! The engine collaborator describes which inbound, outbound and endpoint
//! plugins it ships. Option parsing validates every component `type`
//! against this registry, so a config that names a plugin the engine cannot
//! build is rejected before any engine is constructed.

use std::collections::BTreeSet;
use std::fmt;

/// The three component families an engine config can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// Listeners accepting client traffic.
    Inbound,
    /// Upstream connectors.
    Outbound,
    /// Components acting as both (e.g. tunnels).
    Endpoint,
}

impl ComponentKind {
    /// Returns the lowercase label used in config documents and errors.
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentKind::Inbound => "inbound",
            ComponentKind::Outbound => "outbound",
            ComponentKind::Endpoint => "endpoint",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Set of plugin type names an engine supports, per component kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilityRegistry {
    inbounds: BTreeSet<String>,
    outbounds: BTreeSet<String>,
    endpoints: BTreeSet<String>,
}

impl CapabilityRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an inbound type.
    pub fn with_inbound(mut self, type_name: impl Into<String>) -> Self {
        self.inbounds.insert(type_name.into());
        self
    }

    /// Registers an outbound type.
    pub fn with_outbound(mut self, type_name: impl Into<String>) -> Self {
        self.outbounds.insert(type_name.into());
        self
    }

    /// Registers an endpoint type.
    pub fn with_endpoint(mut self, type_name: impl Into<String>) -> Self {
        self.endpoints.insert(type_name.into());
        self
    }

    /// Returns `true` if `type_name` is registered for `kind`.
    pub fn supports(&self, kind: ComponentKind, type_name: &str) -> bool {
        self.set(kind).contains(type_name)
    }

    /// Iterates the registered type names for `kind` in sorted order.
    pub fn types(&self, kind: ComponentKind) -> impl Iterator<Item = &str> {
        self.set(kind).iter().map(String::as_str)
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.inbounds.is_empty() && self.outbounds.is_empty() && self.endpoints.is_empty()
    }

    fn set(&self, kind: ComponentKind) -> &BTreeSet<String> {
        match kind {
            ComponentKind::Inbound => &self.inbounds,
            ComponentKind::Outbound => &self.outbounds,
            ComponentKind::Endpoint => &self.endpoints,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_supports() {
        let registry = CapabilityRegistry::new()
            .with_inbound("direct")
            .with_outbound("direct")
            .with_outbound("block");

        assert!(registry.supports(ComponentKind::Inbound, "direct"));
        assert!(registry.supports(ComponentKind::Outbound, "block"));
        assert!(!registry.supports(ComponentKind::Inbound, "block"));
        assert!(!registry.supports(ComponentKind::Endpoint, "direct"));
    }

    #[test]
    fn test_registry_types_sorted() {
        let registry = CapabilityRegistry::new()
            .with_outbound("direct")
            .with_outbound("block");
        let types: Vec<&str> = registry.types(ComponentKind::Outbound).collect();
        assert_eq!(types, vec!["block", "direct"]);
    }

    #[test]
    fn test_empty_registry() {
        assert!(CapabilityRegistry::new().is_empty());
        assert!(!CapabilityRegistry::new().with_endpoint("wg").is_empty());
    }
}
