// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Binary rule-set encoding.
//!
//! The layout belongs to the codec. The compiler only asks for bytes.
//!
//! # Built-in Layout
//!
//! ```text
//! "SRS" | version: u8 | rule count: uvarint | rule*
//!
//! rule    = 0x00 item* 0xFF invert: u8        (default)
//!         | 0x01 mode: u8 count: uvarint rule* invert: u8   (logical)
//! item    = kind: u8 count: uvarint value*
//! value   = len: uvarint utf8 bytes           (string items)
//!         | u16 big-endian                    (port items)
//! ```

use std::io::Write;

use crate::error::CodecError;
use crate::model::{DefaultRule, HeadlessRule, Listable, LogicalMode, LogicalRule, RuleDocument};

/// Magic bytes at the start of every compiled rule set.
pub const MAGIC: [u8; 3] = *b"SRS";

const RULE_DEFAULT: u8 = 0;
const RULE_LOGICAL: u8 = 1;
const ITEM_FINAL: u8 = 0xFF;
const ITEM_PORT: u8 = 0x20;
const ITEM_SOURCE_PORT: u8 = 0x21;

/// Maximum nesting of logical rules.
pub const MAX_DEPTH: usize = 32;

/// Encodes a rule document into its compiled binary form.
pub trait RuleCodec: Send + Sync {
    /// Returns the codec name for logging.
    fn name(&self) -> &str;

    /// Writes the compiled form of `document` to `out`.
    fn encode(&self, document: &RuleDocument, out: &mut dyn Write) -> Result<(), CodecError>;
}

/// The built-in codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryRuleCodec;

impl RuleCodec for BinaryRuleCodec {
    fn name(&self) -> &str {
        "binary"
    }

    fn encode(&self, document: &RuleDocument, out: &mut dyn Write) -> Result<(), CodecError> {
        out.write_all(&MAGIC)?;
        out.write_all(&[document.version])?;
        write_uvarint(out, document.rules.len() as u64)?;
        for rule in &document.rules {
            write_rule(out, rule, 0)?;
        }
        Ok(())
    }
}

fn write_rule(out: &mut dyn Write, rule: &HeadlessRule, depth: usize) -> Result<(), CodecError> {
    if depth > MAX_DEPTH {
        return Err(CodecError::unsupported(
            "logical rule",
            format!("nesting deeper than {MAX_DEPTH}"),
        ));
    }
    match rule {
        HeadlessRule::Default(rule) => write_default(out, rule),
        HeadlessRule::Logical(rule) => write_logical(out, rule, depth),
    }
}

fn write_default(out: &mut dyn Write, rule: &DefaultRule) -> Result<(), CodecError> {
    out.write_all(&[RULE_DEFAULT])?;

    for (kind, (_, values)) in rule.string_items().enumerate() {
        if !values.is_empty() {
            out.write_all(&[kind as u8])?;
            write_strings(out, values)?;
        }
    }
    for (kind, ports) in [(ITEM_PORT, &rule.port), (ITEM_SOURCE_PORT, &rule.source_port)] {
        if !ports.is_empty() {
            out.write_all(&[kind])?;
            write_uvarint(out, ports.0.len() as u64)?;
            for port in ports.iter() {
                out.write_all(&port.to_be_bytes())?;
            }
        }
    }

    out.write_all(&[ITEM_FINAL, rule.invert as u8])?;
    Ok(())
}

fn write_logical(out: &mut dyn Write, rule: &LogicalRule, depth: usize) -> Result<(), CodecError> {
    let mode = match rule.mode {
        LogicalMode::And => 0,
        LogicalMode::Or => 1,
    };
    out.write_all(&[RULE_LOGICAL, mode])?;
    write_uvarint(out, rule.rules.len() as u64)?;
    for child in &rule.rules {
        write_rule(out, child, depth + 1)?;
    }
    out.write_all(&[rule.invert as u8])?;
    Ok(())
}

fn write_strings(out: &mut dyn Write, values: &Listable<String>) -> Result<(), CodecError> {
    write_uvarint(out, values.0.len() as u64)?;
    for value in values.iter() {
        write_uvarint(out, value.len() as u64)?;
        out.write_all(value.as_bytes())?;
    }
    Ok(())
}

/// Writes `value` as an unsigned LEB128 varint.
pub fn write_uvarint(out: &mut dyn Write, mut value: u64) -> std::io::Result<()> {
    let mut buf = [0u8; 10];
    let mut len = 0;
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            buf[len] = byte;
            len += 1;
            break;
        }
        buf[len] = byte | 0x80;
        len += 1;
    }
    out.write_all(&buf[..len])
}
