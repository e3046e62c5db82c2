// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Working directory preparation.
//!
//! The current directory is process-wide state. Relative paths in the config
//! (and the config path itself) resolve against it once this has run.

use std::fs::DirBuilder;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{SupervisorError, SupervisorResult};

/// Permission bits applied to directories created for the engine.
#[cfg(unix)]
pub const WORK_DIR_MODE: u32 = 0o777;

/// Creates `path` recursively if it does not exist, then makes it the
/// current directory.
///
/// Both steps are fatal on failure.
pub fn enter_work_dir(path: &Path) -> SupervisorResult<()> {
    if !path.exists() {
        debug!(work_dir = %path.display(), "Creating working directory");
        builder()
            .create(path)
            .map_err(|e| SupervisorError::work_dir(path, e))?;
    }

    debug!(work_dir = %path.display(), "Entering working directory");
    std::env::set_current_dir(path).map_err(|e| SupervisorError::work_dir(path, e))
}

/// Anchors a relative `path` at the current directory.
///
/// The path need not exist and symlinks are left alone.
pub fn absolute(path: &Path) -> io::Result<PathBuf> {
    if path.as_os_str().is_empty() {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "empty path"));
    }
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

fn builder() -> DirBuilder {
    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(WORK_DIR_MODE);
    }
    builder
}
