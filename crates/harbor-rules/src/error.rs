// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Rule compilation errors.

use std::path::PathBuf;

use harbor_core::ErrorCode;
use thiserror::Error;

/// Errors raised by a [`RuleCodec`](crate::codec::RuleCodec).
#[derive(Debug, Error)]
pub enum CodecError {
    /// Writing the encoded bytes failed.
    #[error("I/O error while encoding: {0}")]
    Io(#[from] std::io::Error),

    /// The document uses something the codec cannot represent.
    #[error("Cannot encode {what}: {message}")]
    Unsupported {
        /// What could not be encoded.
        what: &'static str,
        /// Error message.
        message: String,
    },
}

impl CodecError {
    /// Creates an unsupported error.
    pub fn unsupported(what: &'static str, message: impl Into<String>) -> Self {
        Self::Unsupported {
            what,
            message: message.into(),
        }
    }
}

/// Errors raised while compiling a rule document.
#[derive(Debug, Error)]
pub enum RuleError {
    /// The rule document could not be opened.
    #[error("Failed to open rule document '{path}': {source}")]
    Open {
        /// Input path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The rule document could not be read.
    #[error("Failed to read rule document '{path}': {source}")]
    Read {
        /// Input path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The rule document is not valid JSON for the rule schema.
    #[error("Failed to parse rule document at {line}:{column}: {message}")]
    Parse {
        /// Error message.
        message: String,
        /// 1-based line number.
        line: usize,
        /// 1-based column number.
        column: usize,
    },

    /// The rule document parsed but is semantically invalid.
    #[error("Invalid rule at {location}: {message}")]
    Invalid {
        /// Path to the rule, e.g. `rules[2].rules[0]`.
        location: String,
        /// Error message.
        message: String,
    },

    /// The output file could not be created.
    #[error("Failed to create output '{path}': {source}")]
    Create {
        /// Output path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The codec failed.
    #[error("Failed to encode rule set: {0}")]
    Encode(#[from] CodecError),

    /// The output file could not be written.
    #[error("Failed to write output '{path}': {source}")]
    Write {
        /// Output path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl RuleError {
    /// Creates a parse error from a `serde_json` error.
    pub fn parse(err: &serde_json::Error) -> Self {
        Self::Parse {
            message: err.to_string(),
            line: err.line(),
            column: err.column(),
        }
    }

    /// Creates an invalid rule error.
    pub fn invalid(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            location: location.into(),
            message: message.into(),
        }
    }

    /// Returns the boundary code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            RuleError::Open { .. } => ErrorCode::FileOpenError,
            RuleError::Read { .. } => ErrorCode::FileReadError,
            RuleError::Parse { .. } | RuleError::Invalid { .. } => ErrorCode::RuleReadError,
            RuleError::Create { .. } => ErrorCode::FileCreateError,
            RuleError::Encode(_) | RuleError::Write { .. } => ErrorCode::FileWriteError,
        }
    }
}

impl From<RuleError> for ErrorCode {
    fn from(err: RuleError) -> Self {
        err.code()
    }
}

/// A Result type with RuleError.
pub type RuleResult<T> = Result<T, RuleError>;
