// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # harbor-rules
//!
//! Compiles JSON rule documents into binary rule sets.
//!
//! ```no_run
//! use harbor_rules::{compile_rule_set, BinaryRuleCodec};
//!
//! let compiled = compile_rule_set("geosite.json", "geosite.srs", &BinaryRuleCodec).unwrap();
//! println!("{} rules, {} bytes", compiled.rules, compiled.bytes);
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod codec;
pub mod compile;
pub mod error;
pub mod model;

pub use codec::{BinaryRuleCodec, RuleCodec};
pub use compile::{compile_rule_set, CompiledRuleSet};
pub use error::{CodecError, RuleError, RuleResult};
pub use model::{DefaultRule, HeadlessRule, Listable, LogicalMode, LogicalRule, RuleDocument};
