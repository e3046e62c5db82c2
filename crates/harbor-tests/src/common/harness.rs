// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Harness
//!
//! A temporary directory that owns the files a test hands to the
//! supervisor. Every path it returns is absolute, so tests stay correct after
//! the supervisor changes the current directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use harbor_core::{StartRequest, Supervisor, SupervisorConfig};

use crate::common::mocks::MockEngineFactory;

/// Temporary workspace removed on drop.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Creates an empty workspace.
    pub fn new() -> Self {
        let dir = tempfile::Builder::new()
            .prefix("harbor-test-")
            .tempdir()
            .expect("Failed to create temp directory");
        Self { dir }
    }

    /// Root of the workspace.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Absolute path for `name` inside the workspace.
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Writes `content` to `name` and returns its path.
    pub fn write(&self, name: &str, content: impl AsRef<[u8]>) -> PathBuf {
        let path = self.path(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&path, content).expect("Failed to write fixture");
        path
    }

    /// Start request for a config written to `name`.
    pub fn request(&self, name: &str, content: &str) -> StartRequest {
        StartRequest::new(self.write(name, content))
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

/// A supervisor over a fresh mock factory.
pub fn mock_supervisor() -> (Arc<Supervisor>, MockEngineFactory) {
    mock_supervisor_with(SupervisorConfig::default())
}

/// A supervisor over a fresh mock factory with explicit settings.
pub fn mock_supervisor_with(config: SupervisorConfig) -> (Arc<Supervisor>, MockEngineFactory) {
    let factory = MockEngineFactory::new();
    let supervisor = Supervisor::with_config(Arc::new(factory.clone()), config);
    (Arc::new(supervisor), factory)
}
