// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Logging initialization for the CLI.
//!
//! Records go to stderr so command output on stdout stays machine-readable.
//! `RUST_LOG` takes precedence over `--log-level`.

use std::io::{stderr, IsTerminal};

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::LogFormat;

/// Level used when neither `RUST_LOG` nor `--log-level` parse.
pub const FALLBACK_LEVEL: &str = "info";

/// Installs the global subscriber.
///
/// Returns `false` if a subscriber was already installed.
pub fn init_logging(level: &str, format: LogFormat) -> bool {
    let filter = build_filter(level);
    let registry = tracing_subscriber::registry().with(filter);
    let ansi = stderr().is_terminal();

    let result = match format {
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(stderr).with_target(true).with_ansi(ansi))
            .try_init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(stderr)
                    .with_target(true)
                    .with_current_span(true),
            )
            .try_init(),
        LogFormat::Compact => registry
            .with(
                fmt::layer()
                    .compact()
                    .with_writer(stderr)
                    .with_target(false)
                    .with_ansi(ansi),
            )
            .try_init(),
    };
    result.is_ok()
}

fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new(FALLBACK_LEVEL))
}
