// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration error types for harbor-config.
//!
//! Every failure of reading, parsing or validating an engine config surfaces
//! as a [`ConfigError`]. The supervisor collapses all of them into a single
//! boundary code, so the variants exist for logging and diagnostics.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file does not exist.
    #[error("Config file not found: {path}")]
    FileNotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// The config file exists but could not be read.
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        /// Path to the file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The config document is not valid JSON for the option schema.
    #[error("Failed to parse config '{origin}' at {line}:{column}: {message}")]
    Parse {
        /// Where the document came from (file path or `<memory>`).
        origin: String,
        /// Error message.
        message: String,
        /// 1-based line number.
        line: usize,
        /// 1-based column number.
        column: usize,
    },

    /// A component names a type the engine does not provide.
    #[error("Unsupported {kind} type '{type_name}'")]
    UnsupportedType {
        /// Component kind (`inbound`, `outbound`, `endpoint`).
        kind: &'static str,
        /// The unknown type name.
        type_name: String,
    },

    /// Two components share the same tag.
    #[error("Duplicate tag '{tag}'")]
    DuplicateTag {
        /// The duplicated tag.
        tag: String,
    },

    /// A reference names a tag that is not defined.
    #[error("Unknown tag '{tag}' referenced by {field}")]
    UnknownTag {
        /// The field holding the reference.
        field: String,
        /// The missing tag.
        tag: String,
    },

    /// Generic validation failure.
    #[error("Validation failed for '{field}': {message}")]
    Validation {
        /// The field that failed validation.
        field: String,
        /// Error message.
        message: String,
    },
}

impl ConfigError {
    /// Creates a file-not-found error.
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Creates an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a parse error from a `serde_json` error, keeping its position.
    pub fn parse(origin: impl Into<String>, err: &serde_json::Error) -> Self {
        Self::Parse {
            origin: origin.into(),
            message: err.to_string(),
            line: err.line(),
            column: err.column(),
        }
    }

    /// Creates an unsupported type error.
    pub fn unsupported_type(kind: &'static str, type_name: impl Into<String>) -> Self {
        Self::UnsupportedType {
            kind,
            type_name: type_name.into(),
        }
    }

    /// Creates a duplicate tag error.
    pub fn duplicate_tag(tag: impl Into<String>) -> Self {
        Self::DuplicateTag { tag: tag.into() }
    }

    /// Creates an unknown tag error.
    pub fn unknown_tag(field: impl Into<String>, tag: impl Into<String>) -> Self {
        Self::UnknownTag {
            field: field.into(),
            tag: tag.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Returns `true` if this error is related to file I/O.
    pub fn is_io_error(&self) -> bool {
        matches!(self, ConfigError::Io { .. } | ConfigError::FileNotFound { .. })
    }

    /// Returns the error type as a string for logging.
    pub fn error_type(&self) -> &'static str {
        match self {
            ConfigError::FileNotFound { .. } => "file_not_found",
            ConfigError::Io { .. } => "io",
            ConfigError::Parse { .. } => "parse",
            ConfigError::UnsupportedType { .. } => "unsupported_type",
            ConfigError::DuplicateTag { .. } => "duplicate_tag",
            ConfigError::UnknownTag { .. } => "unknown_tag",
            ConfigError::Validation { .. } => "validation",
        }
    }
}

/// A Result type with ConfigError.
pub type ConfigResult<T> = Result<T, ConfigError>;
