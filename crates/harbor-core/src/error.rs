// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error hierarchy and boundary codes.
//!
//! Internal failures carry full context as `thiserror` enums. Only the
//! coarse [`ErrorCode`] crosses the CLI and FFI boundaries.
//!
//! # Error Hierarchy
//!
//! ```text
//! ErrorCode (boundary, closed set)
//! ├── SupervisorError  - Start / Stop / Refresh outcomes
//! │   ├── ConfigError  - config read / parse / validation
//! │   └── EngineError  - engine create / start / close
//! └── (harbor-rules) RuleError
//! ```

use std::fmt;
use std::path::PathBuf;

use harbor_config::ConfigError;
use thiserror::Error;

// =============================================================================
// ErrorCode
// =============================================================================

/// Status code returned across the process and FFI boundary.
///
/// The numeric values are the process exit status and the FFI return value.
/// On Unix the exit status is truncated to 8 bits, so `-1` is observed as `255`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ErrorCode {
    /// Success.
    Nil = 0,
    /// Config read, parse or engine construction failed.
    StartCreateError = -1,
    /// The engine was built but failed to start.
    StartError = -2,
    /// An engine is already running.
    StartAlready = -3,
    /// The engine failed to close.
    StopError = -4,
    /// The output file could not be created.
    FileCreateError = -5,
    /// The input file could not be opened.
    FileOpenError = -6,
    /// The input file could not be read.
    FileReadError = -7,
    /// The output could not be encoded or written.
    FileWriteError = -8,
    /// The rule document is malformed.
    RuleReadError = -9,
}

impl ErrorCode {
    /// Every code, in numeric order from `Nil` downwards.
    pub const ALL: [ErrorCode; 10] = [
        ErrorCode::Nil,
        ErrorCode::StartCreateError,
        ErrorCode::StartError,
        ErrorCode::StartAlready,
        ErrorCode::StopError,
        ErrorCode::FileCreateError,
        ErrorCode::FileOpenError,
        ErrorCode::FileReadError,
        ErrorCode::FileWriteError,
        ErrorCode::RuleReadError,
    ];

    /// Returns the integer value used as exit status and FFI return value.
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Maps an integer back to its code.
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.code() == code)
    }

    /// Returns the fixed human-readable category. Empty for `Nil`.
    pub const fn category(self) -> &'static str {
        match self {
            ErrorCode::Nil => "",
            ErrorCode::StartCreateError => "start create failed",
            ErrorCode::StartError => "start failed",
            ErrorCode::StartAlready => "already started",
            ErrorCode::StopError => "stop failed",
            ErrorCode::FileCreateError => "file create failed",
            ErrorCode::FileOpenError => "file open failed",
            ErrorCode::FileReadError => "file read failed",
            ErrorCode::FileWriteError => "file write failed",
            ErrorCode::RuleReadError => "rule read failed",
        }
    }

    /// Returns `true` for the success sentinel.
    pub const fn is_nil(self) -> bool {
        matches!(self, ErrorCode::Nil)
    }

    /// Collapses an operation outcome into its boundary code.
    pub fn from_result<T, E: Into<ErrorCode>>(result: Result<T, E>) -> Self {
        match result {
            Ok(_) => ErrorCode::Nil,
            Err(e) => e.into(),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_nil() {
            f.write_str("ok")
        } else {
            f.write_str(self.category())
        }
    }
}

// =============================================================================
// EngineError
// =============================================================================

/// Errors reported by an engine implementation.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The options cannot be turned into an engine.
    #[error("Invalid engine options for {component}: {message}")]
    InvalidOptions {
        /// Offending component label.
        component: String,
        /// Error message.
        message: String,
    },

    /// A listener could not be bound.
    #[error("Failed to bind {address}: {source}")]
    Bind {
        /// Address that was requested.
        address: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Start failed for a reason other than binding.
    #[error("Engine start failed: {0}")]
    Start(String),

    /// Close failed.
    #[error("Engine close failed: {0}")]
    Close(String),
}

impl EngineError {
    /// Creates an invalid options error.
    pub fn invalid_options(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidOptions {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Creates a bind error.
    pub fn bind(address: impl Into<String>, source: std::io::Error) -> Self {
        Self::Bind {
            address: address.into(),
            source,
        }
    }

    /// Creates a start error.
    pub fn start(message: impl Into<String>) -> Self {
        Self::Start(message.into())
    }

    /// Creates a close error.
    pub fn close(message: impl Into<String>) -> Self {
        Self::Close(message.into())
    }
}

// =============================================================================
// SupervisorError
// =============================================================================

/// Outcome of a failed lifecycle operation.
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// The config could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// The working directory could not be created or entered.
    #[error("Failed to prepare working directory '{path}': {source}")]
    WorkDir {
        /// The requested directory.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The engine rejected its options.
    #[error("Failed to create engine: {0}")]
    EngineCreate(#[source] EngineError),

    /// The engine was created but could not start.
    #[error("Failed to start engine: {0}")]
    EngineStart(#[source] EngineError),

    /// An engine is already running.
    #[error("Engine already running")]
    AlreadyRunning,

    /// A reload was requested before anything was ever started.
    #[error("No previous start request to reload")]
    NothingToReload,

    /// The engine failed to close.
    #[error("Failed to close engine: {0}")]
    EngineClose(#[source] EngineError),
}

impl SupervisorError {
    /// Creates a working directory error.
    pub fn work_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::WorkDir {
            path: path.into(),
            source,
        }
    }

    /// Returns the boundary code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            SupervisorError::Config(_)
            | SupervisorError::WorkDir { .. }
            | SupervisorError::EngineCreate(_)
            | SupervisorError::NothingToReload => ErrorCode::StartCreateError,
            SupervisorError::EngineStart(_) => ErrorCode::StartError,
            SupervisorError::AlreadyRunning => ErrorCode::StartAlready,
            SupervisorError::EngineClose(_) => ErrorCode::StopError,
        }
    }
}

impl From<SupervisorError> for ErrorCode {
    fn from(err: SupervisorError) -> Self {
        err.code()
    }
}

/// A Result type with SupervisorError.
pub type SupervisorResult<T> = Result<T, SupervisorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_values() {
        let values: Vec<i32> = ErrorCode::ALL.iter().map(|c| c.code()).collect();
        assert_eq!(values, (0..10).map(|i: i32| -i).collect::<Vec<_>>());
    }

    #[test]
    fn test_from_code() {
        assert_eq!(ErrorCode::from_code(0), Some(ErrorCode::Nil));
        assert_eq!(ErrorCode::from_code(-3), Some(ErrorCode::StartAlready));
        assert_eq!(ErrorCode::from_code(-9), Some(ErrorCode::RuleReadError));
        assert_eq!(ErrorCode::from_code(1), None);
        assert_eq!(ErrorCode::from_code(-10), None);
    }

    #[test]
    fn test_category() {
        assert_eq!(ErrorCode::Nil.category(), "");
        assert!(ErrorCode::ALL
            .iter()
            .filter(|c| !c.is_nil())
            .all(|c| !c.category().is_empty()));
        assert_eq!(ErrorCode::StartAlready.to_string(), "already started");
        assert_eq!(ErrorCode::Nil.to_string(), "ok");
    }

    #[test]
    fn test_supervisor_error_codes() {
        assert_eq!(
            SupervisorError::from(ConfigError::file_not_found("x.json")).code(),
            ErrorCode::StartCreateError
        );
        assert_eq!(
            SupervisorError::work_dir("/x", std::io::Error::other("denied")).code(),
            ErrorCode::StartCreateError
        );
        assert_eq!(
            SupervisorError::EngineCreate(EngineError::invalid_options("in", "bad")).code(),
            ErrorCode::StartCreateError
        );
        assert_eq!(
            SupervisorError::EngineStart(EngineError::start("port busy")).code(),
            ErrorCode::StartError
        );
        assert_eq!(SupervisorError::AlreadyRunning.code(), ErrorCode::StartAlready);
        assert_eq!(
            SupervisorError::EngineClose(EngineError::close("stuck")).code(),
            ErrorCode::StopError
        );
    }

    #[test]
    fn test_from_result() {
        let ok: Result<(), SupervisorError> = Ok(());
        assert_eq!(ErrorCode::from_result(ok), ErrorCode::Nil);

        let err: Result<(), SupervisorError> = Err(SupervisorError::AlreadyRunning);
        assert_eq!(ErrorCode::from_result(err), ErrorCode::StartAlready);
    }
}
