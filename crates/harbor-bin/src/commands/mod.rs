// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI command implementations.

mod json2srs;
mod start;
mod validate;
mod version;

pub use json2srs::json2srs;
pub use start::start;
pub use validate::validate;
pub use version::version;

use crate::cli::{Cli, Commands};
use crate::error::BinResult;

/// Executes the command selected on the command line.
pub async fn execute(cli: &Cli) -> BinResult<()> {
    match &cli.command {
        Commands::Start(args) => start::start(cli, args).await,
        Commands::Json2Srs(args) => json2srs::json2srs(args),
        Commands::Validate(args) => validate::validate(args),
        Commands::Version => version::version(),
    }
}
