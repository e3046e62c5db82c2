// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `version` command.

use crate::error::BinResult;

/// Prints component versions.
pub fn version() -> BinResult<()> {
    println!("harbor {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Components:");
    println!("  harbor-core:   {}", harbor_core::VERSION);
    println!("  harbor-config: {}", harbor_config::VERSION);
    println!("  engine:        {}", harbor_relay::ENGINE_NAME);
    println!();
    println!("Target: {}-{}", std::env::consts::ARCH, std::env::consts::OS);
    println!("License: PolyForm Noncommercial License 1.0.0");
    Ok(())
}
