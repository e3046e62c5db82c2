// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `json2srs` command.

use harbor_rules::{compile_rule_set, BinaryRuleCodec};

use crate::cli::Json2SrsArgs;
use crate::error::BinResult;

/// Compiles a JSON rule document with the built-in codec.
pub fn json2srs(args: &Json2SrsArgs) -> BinResult<()> {
    let compiled = compile_rule_set(&args.json, &args.output, &BinaryRuleCodec)?;
    println!(
        "Compiled {} rule(s) (version {}) into {} ({} bytes)",
        compiled.rules,
        compiled.version,
        args.output.display(),
        compiled.bytes
    );
    Ok(())
}
