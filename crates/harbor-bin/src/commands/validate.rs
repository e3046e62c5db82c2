// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `validate` command.

use harbor_config::{ConfigLoader, EngineOptions};
use harbor_core::EngineFactory;
use harbor_relay::RelayEngineFactory;

use crate::cli::{OutputFormat, ValidateArgs};
use crate::error::BinResult;

/// Loads and validates a config against the relay engine's plugins.
pub fn validate(args: &ValidateArgs) -> BinResult<()> {
    let factory = RelayEngineFactory::new();
    let loader = ConfigLoader::new(factory.registry().clone());
    let options = loader.load(&args.config)?;

    match args.format {
        OutputFormat::Text => print_text(args, &options),
        OutputFormat::Json => print_json(args, &options),
    }
    Ok(())
}

fn final_outbound(options: &EngineOptions) -> Option<&str> {
    options
        .route
        .as_ref()
        .and_then(|route| route.final_outbound.as_deref())
}

fn print_text(args: &ValidateArgs, options: &EngineOptions) {
    println!("Configuration is valid: {}", args.config.display());
    println!();
    println!("Summary:");
    println!("  Inbounds:  {}", options.inbounds.len());
    println!("  Outbounds: {}", options.outbounds.len());
    println!("  Endpoints: {}", options.endpoints.len());
    println!("  Final:     {}", final_outbound(options).unwrap_or("(first outbound)"));
    println!(
        "  Log level: {}",
        options.log.level.as_deref().unwrap_or("(engine default)")
    );
}

fn print_json(args: &ValidateArgs, options: &EngineOptions) {
    let output = serde_json::json!({
        "valid": true,
        "config_path": args.config.display().to_string(),
        "summary": {
            "inbounds": options.inbounds.len(),
            "outbounds": options.outbounds.len(),
            "endpoints": options.endpoints.len(),
            "final": final_outbound(options),
            "log_level": options.log.level,
        },
    });
    println!("{output:#}");
}
