// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Harbor - proxy engine supervisor
//!
//! Main binary entry point.

use clap::Parser;
use harbor_bin::{commands, init_logging, report_error, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.log_format);

    if let Err(e) = commands::execute(&cli).await {
        tracing::debug!(error = %e, "Command failed");
        std::process::exit(report_error(cli.command.name(), &e));
    }
}
