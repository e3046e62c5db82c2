// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Engine option schema.
//!
//! The engine owns its config format; harbor models only the parts the
//! supervisor has to reason about and keeps everything else as opaque JSON
//! so it round-trips untouched to the engine.
//!
//! # Schema Structure
//!
//! ```text
//! EngineOptions
//! ├── log: LogOptions
//! ├── inbounds: Vec<ComponentOptions>
//! ├── outbounds: Vec<ComponentOptions>
//! ├── endpoints: Vec<ComponentOptions>
//! ├── route: Option<RouteOptions>
//! └── (any other key, preserved as-is)
//! ```

use std::collections::HashSet;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ConfigError, ConfigResult};
use crate::registry::{CapabilityRegistry, ComponentKind};

/// Log levels accepted in `log.level`.
pub const LOG_LEVELS: &[&str] = &[
    "trace", "debug", "info", "warn", "warning", "error", "fatal", "panic",
];

/// Level forced when the supervisor runs the engine in diagnostic mode.
pub const TRACE_LEVEL: &str = "trace";

// =============================================================================
// Top-Level Options
// =============================================================================

/// Root of an engine config document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineOptions {
    /// Engine log rendering.
    #[serde(default)]
    pub log: LogOptions,

    /// Inbound listeners.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inbounds: Vec<ComponentOptions>,

    /// Outbound connectors.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outbounds: Vec<ComponentOptions>,

    /// Endpoints.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub endpoints: Vec<ComponentOptions>,

    /// Routing section.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<RouteOptions>,

    /// Sections harbor does not interpret (dns, experimental, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EngineOptions {
    /// Validates the document against the engine's capability registry.
    ///
    /// Checks, in order:
    /// - `log.level` is a known level
    /// - every component type is registered for its kind
    /// - tags are unique across inbounds, outbounds and endpoints
    /// - `route.final` names an outbound or endpoint
    pub fn validate(&self, registry: &CapabilityRegistry) -> ConfigResult<()> {
        self.log.validate()?;

        let sections = [
            (ComponentKind::Inbound, &self.inbounds),
            (ComponentKind::Outbound, &self.outbounds),
            (ComponentKind::Endpoint, &self.endpoints),
        ];

        let mut tags = HashSet::new();
        for (kind, components) in sections {
            for component in components {
                if !registry.supports(kind, &component.type_name) {
                    return Err(ConfigError::unsupported_type(
                        kind.as_str(),
                        &component.type_name,
                    ));
                }
                if let Some(tag) = component.tag() {
                    if !tags.insert(tag) {
                        return Err(ConfigError::duplicate_tag(tag));
                    }
                }
            }
        }

        if let Some(final_tag) = self.route.as_ref().and_then(|r| r.final_outbound.as_deref()) {
            let known = self
                .outbounds
                .iter()
                .chain(self.endpoints.iter())
                .any(|c| c.tag() == Some(final_tag));
            if !known {
                return Err(ConfigError::unknown_tag("route.final", final_tag));
            }
        }

        Ok(())
    }

    /// Applies the supervisor's fixed overrides.
    ///
    /// Colour is always disabled because the hosting process reads raw output.
    /// `force_trace` raises the engine log level to the most verbose one.
    pub fn normalize(&mut self, force_trace: bool) {
        self.log.disable_color = true;
        if force_trace {
            self.log.level = Some(TRACE_LEVEL.to_string());
        }
    }

    /// Looks up an outbound or endpoint by tag.
    pub fn find_outbound(&self, tag: &str) -> Option<&ComponentOptions> {
        self.outbounds
            .iter()
            .chain(self.endpoints.iter())
            .find(|c| c.tag() == Some(tag))
    }
}

// =============================================================================
// Log Options
// =============================================================================

/// The engine's log section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogOptions {
    /// Disable engine logging entirely.
    #[serde(default)]
    pub disabled: bool,

    /// Minimum level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    /// Output file; stdout when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    /// Prefix records with a timestamp.
    #[serde(default)]
    pub timestamp: bool,

    /// Render without ANSI colours.
    #[serde(default)]
    pub disable_color: bool,
}

impl LogOptions {
    fn validate(&self) -> ConfigResult<()> {
        match self.level.as_deref() {
            Some(level) if !LOG_LEVELS.contains(&level) => Err(ConfigError::validation(
                "log.level",
                format!("unknown level '{level}'"),
            )),
            _ => Ok(()),
        }
    }
}

// =============================================================================
// Components
// =============================================================================

/// One inbound, outbound or endpoint entry.
///
/// Only `type` and `tag` are interpreted here; the remaining keys belong to
/// the plugin and are decoded by it through [`ComponentOptions::settings_as`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentOptions {
    /// Plugin type name.
    #[serde(rename = "type")]
    pub type_name: String,

    /// Optional tag used for references.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,

    /// Plugin specific settings.
    #[serde(flatten)]
    pub settings: Map<String, Value>,
}

impl ComponentOptions {
    /// Creates a component of the given type with no settings.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            ..Default::default()
        }
    }

    /// Sets the tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Adds a setting.
    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.settings.insert(key.into(), value.into());
        self
    }

    /// Returns the tag, treating an empty string as absent.
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref().filter(|t| !t.is_empty())
    }

    /// Returns a label for logs: the tag if present, the type otherwise.
    pub fn label(&self) -> &str {
        self.tag().unwrap_or(&self.type_name)
    }

    /// Decodes the plugin settings into a typed structure.
    pub fn settings_as<T: DeserializeOwned>(&self) -> ConfigResult<T> {
        serde_json::from_value(Value::Object(self.settings.clone())).map_err(|e| {
            ConfigError::validation(
                format!("{}[{}]", self.type_name, self.label()),
                e.to_string(),
            )
        })
    }
}

/// The routing section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteOptions {
    /// Tag of the outbound used when no rule matches.
    #[serde(rename = "final", default, skip_serializing_if = "Option::is_none")]
    pub final_outbound: Option<String>,

    /// Rules and anything else the engine understands.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
