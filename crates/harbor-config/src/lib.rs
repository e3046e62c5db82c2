// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # harbor-config
//!
//! Engine configuration handling for harbor.
//!
//! The proxy engine owns its config format. This crate models the subset the
//! supervisor needs (log rendering, component types and tags, the final
//! route) and validates documents against the engine's plugin registry.
//!
//! ## Quick Start
//!
//! ```
//! use harbor_config::{CapabilityRegistry, ConfigLoader};
//!
//! let registry = CapabilityRegistry::new()
//!     .with_inbound("direct")
//!     .with_outbound("direct");
//! let loader = ConfigLoader::new(registry);
//!
//! let mut options = loader
//!     .load_from_str(r#"{"outbounds": [{"type": "direct", "tag": "out"}]}"#)
//!     .unwrap();
//! options.normalize(false);
//! assert!(options.log.disable_color);
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod error;
pub mod loader;
pub mod registry;
pub mod schema;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, MEMORY_ORIGIN};
pub use registry::{CapabilityRegistry, ComponentKind};
pub use schema::{
    ComponentOptions, EngineOptions, LogOptions, RouteOptions, LOG_LEVELS, TRACE_LEVEL,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
