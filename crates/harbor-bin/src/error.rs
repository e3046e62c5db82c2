// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error types for the harbor binary.

use harbor_config::ConfigError;
use harbor_core::{ErrorCode, SupervisorError};
use harbor_rules::RuleError;
use thiserror::Error;

/// Result type alias for harbor-bin operations.
pub type BinResult<T> = Result<T, BinError>;

/// Errors that can end a CLI command.
#[derive(Debug, Error)]
pub enum BinError {
    /// A foreground run ended with a failure code.
    #[error("{0}")]
    Lifecycle(ErrorCode),

    /// Supervisor failure outside a foreground run.
    #[error(transparent)]
    Supervisor(#[from] SupervisorError),

    /// Config loading or validation failed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Rule compilation failed.
    #[error(transparent)]
    Rules(#[from] RuleError),

    /// Runtime or signal setup failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BinError {
    /// Returns the boundary code; the process exits with its value.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Lifecycle(code) => *code,
            Self::Supervisor(e) => e.code(),
            Self::Rules(e) => e.code(),
            Self::Config(_) | Self::Io(_) => ErrorCode::StartCreateError,
        }
    }
}

/// Prints the fixed failure line for `command` and returns the exit code.
pub fn report_error(command: &str, error: &BinError) -> i32 {
    let code = error.code();
    eprintln!("{command} failed: {}", code.category());
    code.code()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(
            BinError::Lifecycle(ErrorCode::StopError).code(),
            ErrorCode::StopError
        );
        assert_eq!(
            BinError::Config(ConfigError::file_not_found("/missing.json")).code(),
            ErrorCode::StartCreateError
        );
        assert_eq!(
            BinError::Supervisor(SupervisorError::AlreadyRunning).code(),
            ErrorCode::StartAlready
        );
        let io = std::io::Error::new(std::io::ErrorKind::Other, "signal");
        assert_eq!(BinError::from(io).code(), ErrorCode::StartCreateError);
    }
}
