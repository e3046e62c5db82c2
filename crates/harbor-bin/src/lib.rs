// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # harbor-bin
//!
//! The `harbor` command-line front-end.
//!
//! ```bash
//! # Run an engine until SIGINT/SIGTERM; SIGHUP reloads the config
//! harbor start /etc/harbor/config.json /var/lib/harbor edge-1
//!
//! # Compile a rule document
//! harbor json2srs geosite.json geosite.srs
//!
//! # Check a config before deploying it
//! harbor validate /etc/harbor/config.json --format json
//! ```
//!
//! The process exit status is the numeric boundary code of the outcome.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;

pub use cli::{Cli, Commands};
pub use error::{report_error, BinError, BinResult};
pub use logging::init_logging;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
