// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Harbor Integration Tests
//!
//! Shared utilities for the cross-crate tests under `tests/`.
//!
//! - [`common::mocks`]: a scriptable engine factory that records every
//!   engine it builds
//! - [`common::fixtures`]: config and rule documents
//! - [`common::harness`]: a temporary workspace for config files and
//!   working directories
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p harbor-tests
//! cargo test -p harbor-tests --test integration_supervisor
//! ```
//!
//! Working-directory tests change the process's current directory, so every
//! path handed to the supervisor in these suites is absolute.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod common;

/// Re-export commonly used items for convenience.
pub mod prelude {
    pub use crate::common::fixtures::*;
    pub use crate::common::harness::*;
    pub use crate::common::mocks::*;
    pub use crate::common::init_test_logging;
}
