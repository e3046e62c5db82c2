// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Engine config loading.
//!
//! # Loading Pipeline
//!
//! 1. Check the file exists
//! 2. Read it fully into memory
//! 3. Parse JSON into [`EngineOptions`]
//! 4. Validate against the engine's [`CapabilityRegistry`]
//!
//! Normalization is not applied here; the supervisor owns it.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{ConfigError, ConfigResult};
use crate::registry::CapabilityRegistry;
use crate::schema::EngineOptions;

/// Origin label used for documents that did not come from a file.
pub const MEMORY_ORIGIN: &str = "<memory>";

// =============================================================================
// ConfigLoader
// =============================================================================

/// Loads and validates engine configs against a capability registry.
///
/// # Examples
///
/// ```no_run
/// use harbor_config::{CapabilityRegistry, ConfigLoader};
///
/// let registry = CapabilityRegistry::new().with_outbound("direct");
/// let loader = ConfigLoader::new(registry);
/// let options = loader.load("config.json").unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    registry: CapabilityRegistry,
}

impl ConfigLoader {
    /// Creates a loader validating against `registry`.
    pub fn new(registry: CapabilityRegistry) -> Self {
        Self { registry }
    }

    /// Returns the registry used for validation.
    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    /// Loads options from a file.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::FileNotFound`] if the path does not exist
    /// - [`ConfigError::Io`] if the file cannot be read
    /// - [`ConfigError::Parse`] if the document is not valid JSON for the schema
    /// - any validation error from [`EngineOptions::validate`]
    pub fn load(&self, path: impl AsRef<Path>) -> ConfigResult<EngineOptions> {
        let path = path.as_ref();
        info!(config = %path.display(), "Loading engine config");

        let content = self.read_file(path)?;
        let options = self.parse(&content, &path.display().to_string())?;

        debug!(
            config = %path.display(),
            inbounds = options.inbounds.len(),
            outbounds = options.outbounds.len(),
            endpoints = options.endpoints.len(),
            "Engine config loaded"
        );
        Ok(options)
    }

    /// Loads options from an in-memory document.
    pub fn load_from_str(&self, content: &str) -> ConfigResult<EngineOptions> {
        self.parse(content, MEMORY_ORIGIN)
    }

    fn read_file(&self, path: &Path) -> ConfigResult<Vec<u8>> {
        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }
        fs::read(path).map_err(|e| ConfigError::io(path, e))
    }

    fn parse(&self, content: impl AsRef<[u8]>, origin: &str) -> ConfigResult<EngineOptions> {
        let options: EngineOptions = serde_json::from_slice(content.as_ref())
            .map_err(|e| ConfigError::parse(origin, &e))?;
        options.validate(&self.registry)?;
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn loader() -> ConfigLoader {
        ConfigLoader::new(
            CapabilityRegistry::new()
                .with_inbound("direct")
                .with_outbound("direct"),
        )
    }

    #[test]
    fn test_load_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{"log": {{"level": "info"}}, "outbounds": [{{"type": "direct", "tag": "out"}}]}}"#
        )
        .unwrap();

        let options = loader().load(file.path()).unwrap();
        assert_eq!(options.outbounds.len(), 1);
        assert_eq!(options.log.level.as_deref(), Some("info"));
        assert!(!options.log.disable_color);
    }

    #[test]
    fn test_file_not_found() {
        let err = loader().load("/nonexistent/harbor/config.json").unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }

    #[test]
    fn test_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();

        let err = loader().load(file.path()).unwrap_err();
        assert_eq!(err.error_type(), "parse");
    }

    #[test]
    fn test_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = loader().load(dir.path()).unwrap_err();
        assert!(err.is_io_error());
    }

    #[test]
    fn test_load_from_str_validates() {
        assert!(loader().load_from_str("{}").is_ok());

        let err = loader()
            .load_from_str(r#"{"outbounds": [{"type": "shadowsocks"}]}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedType { .. }));
    }

    #[test]
    fn test_parse_origin_is_memory() {
        match loader().load_from_str("[]").unwrap_err() {
            ConfigError::Parse { origin, .. } => assert_eq!(origin, MEMORY_ORIGIN),
            other => panic!("Expected Parse error, got {other:?}"),
        }
    }
}
