// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Rule document model.
//!
//! ```json
//! {
//!   "version": 2,
//!   "rules": [
//!     { "domain_suffix": [".example.com"], "port": 443 },
//!     { "type": "logical", "mode": "or",
//!       "rules": [{ "ip_cidr": "10.0.0.0/8" }, { "network": "udp" }] }
//!   ]
//! }
//! ```
//!
//! Matching semantics belong to the engine; this module only parses and
//! checks structure.

use std::net::IpAddr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{RuleError, RuleResult};

/// Lowest supported document version.
pub const MIN_VERSION: u8 = 1;

/// Highest supported document version.
pub const MAX_VERSION: u8 = 3;

// =============================================================================
// Listable
// =============================================================================

/// A field that accepts either one value or a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Listable<T>(pub Vec<T>);

impl<T> Default for Listable<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T> Listable<T> {
    /// Returns `true` if no values are present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates the values.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.0.iter()
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Listable<T> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum OneOrMany<T> {
            One(T),
            Many(Vec<T>),
        }

        Ok(match OneOrMany::deserialize(deserializer)? {
            OneOrMany::One(value) => Listable(vec![value]),
            OneOrMany::Many(values) => Listable(values),
        })
    }
}

// =============================================================================
// Document
// =============================================================================

/// A source rule set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleDocument {
    /// Format version.
    pub version: u8,
    /// Rules, matched in order.
    #[serde(default)]
    pub rules: Vec<HeadlessRule>,
}

impl RuleDocument {
    /// Parses and validates a document.
    pub fn from_slice(content: &[u8]) -> RuleResult<Self> {
        let document: RuleDocument =
            serde_json::from_slice(content).map_err(|e| RuleError::parse(&e))?;
        document.validate()?;
        Ok(document)
    }

    /// Checks the version and every rule.
    pub fn validate(&self) -> RuleResult<()> {
        if !(MIN_VERSION..=MAX_VERSION).contains(&self.version) {
            return Err(RuleError::invalid(
                "version",
                format!(
                    "unsupported version {}, expected {MIN_VERSION}..={MAX_VERSION}",
                    self.version
                ),
            ));
        }
        for (i, rule) in self.rules.iter().enumerate() {
            rule.validate(&format!("rules[{i}]"))?;
        }
        Ok(())
    }
}

// =============================================================================
// Rules
// =============================================================================

/// A rule without an outbound action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRule", into = "RawRule")]
pub enum HeadlessRule {
    /// Conditions on connection metadata.
    Default(DefaultRule),
    /// Boolean combination of rules.
    Logical(LogicalRule),
}

impl HeadlessRule {
    fn validate(&self, location: &str) -> RuleResult<()> {
        match self {
            HeadlessRule::Default(rule) => rule.validate(location),
            HeadlessRule::Logical(rule) => rule.validate(location),
        }
    }
}

/// Untyped form used to dispatch on the optional `type` key.
#[derive(Serialize, Deserialize)]
struct RawRule {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    #[serde(flatten)]
    body: Map<String, Value>,
}

impl TryFrom<RawRule> for HeadlessRule {
    type Error = String;

    fn try_from(raw: RawRule) -> Result<Self, Self::Error> {
        let body = Value::Object(raw.body);
        match raw.kind.as_deref() {
            None | Some("") | Some("default") => serde_json::from_value(body)
                .map(HeadlessRule::Default)
                .map_err(|e| e.to_string()),
            Some("logical") => serde_json::from_value(body)
                .map(HeadlessRule::Logical)
                .map_err(|e| e.to_string()),
            Some(other) => Err(format!("unknown rule type '{other}'")),
        }
    }
}

impl From<HeadlessRule> for RawRule {
    fn from(rule: HeadlessRule) -> Self {
        let (kind, body) = match rule {
            HeadlessRule::Default(rule) => (None, serde_json::to_value(rule)),
            HeadlessRule::Logical(rule) => (Some("logical".to_string()), serde_json::to_value(rule)),
        };
        let body = match body {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        RawRule { kind, body }
    }
}

/// Conditions on connection metadata. Values within a field are OR-ed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DefaultRule {
    /// Exact domains.
    #[serde(skip_serializing_if = "Listable::is_empty")]
    pub domain: Listable<String>,
    /// Domain suffixes.
    #[serde(skip_serializing_if = "Listable::is_empty")]
    pub domain_suffix: Listable<String>,
    /// Domain keywords.
    #[serde(skip_serializing_if = "Listable::is_empty")]
    pub domain_keyword: Listable<String>,
    /// Domain regular expressions.
    #[serde(skip_serializing_if = "Listable::is_empty")]
    pub domain_regex: Listable<String>,
    /// Destination CIDRs.
    #[serde(skip_serializing_if = "Listable::is_empty")]
    pub ip_cidr: Listable<String>,
    /// Source CIDRs.
    #[serde(skip_serializing_if = "Listable::is_empty")]
    pub source_ip_cidr: Listable<String>,
    /// Destination ports.
    #[serde(skip_serializing_if = "Listable::is_empty")]
    pub port: Listable<u16>,
    /// Destination port ranges (`start:end`, either side optional).
    #[serde(skip_serializing_if = "Listable::is_empty")]
    pub port_range: Listable<String>,
    /// Source ports.
    #[serde(skip_serializing_if = "Listable::is_empty")]
    pub source_port: Listable<u16>,
    /// Source port ranges.
    #[serde(skip_serializing_if = "Listable::is_empty")]
    pub source_port_range: Listable<String>,
    /// `tcp` or `udp`.
    #[serde(skip_serializing_if = "Listable::is_empty")]
    pub network: Listable<String>,
    /// Process names.
    #[serde(skip_serializing_if = "Listable::is_empty")]
    pub process_name: Listable<String>,
    /// Process paths.
    #[serde(skip_serializing_if = "Listable::is_empty")]
    pub process_path: Listable<String>,
    /// Android package names.
    #[serde(skip_serializing_if = "Listable::is_empty")]
    pub package_name: Listable<String>,
    /// Wi-Fi SSIDs.
    #[serde(skip_serializing_if = "Listable::is_empty")]
    pub wifi_ssid: Listable<String>,
    /// Wi-Fi BSSIDs.
    #[serde(skip_serializing_if = "Listable::is_empty")]
    pub wifi_bssid: Listable<String>,
    /// Negate the match.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub invert: bool,
}

impl DefaultRule {
    /// Returns `true` if the rule has at least one condition.
    pub fn has_conditions(&self) -> bool {
        self.string_items().any(|(_, values)| !values.is_empty())
            || !self.port.is_empty()
            || !self.source_port.is_empty()
    }

    /// String-valued fields paired with their names, in encoding order.
    pub fn string_items(&self) -> impl Iterator<Item = (&'static str, &Listable<String>)> {
        [
            ("domain", &self.domain),
            ("domain_suffix", &self.domain_suffix),
            ("domain_keyword", &self.domain_keyword),
            ("domain_regex", &self.domain_regex),
            ("ip_cidr", &self.ip_cidr),
            ("source_ip_cidr", &self.source_ip_cidr),
            ("port_range", &self.port_range),
            ("source_port_range", &self.source_port_range),
            ("network", &self.network),
            ("process_name", &self.process_name),
            ("process_path", &self.process_path),
            ("package_name", &self.package_name),
            ("wifi_ssid", &self.wifi_ssid),
            ("wifi_bssid", &self.wifi_bssid),
        ]
        .into_iter()
    }

    fn validate(&self, location: &str) -> RuleResult<()> {
        if !self.has_conditions() {
            return Err(RuleError::invalid(location, "rule has no conditions"));
        }
        for cidr in self.ip_cidr.iter().chain(self.source_ip_cidr.iter()) {
            check_cidr(cidr).map_err(|m| RuleError::invalid(location, m))?;
        }
        for range in self.port_range.iter().chain(self.source_port_range.iter()) {
            check_port_range(range).map_err(|m| RuleError::invalid(location, m))?;
        }
        for network in self.network.iter() {
            if network != "tcp" && network != "udp" {
                return Err(RuleError::invalid(
                    location,
                    format!("unknown network '{network}'"),
                ));
            }
        }
        Ok(())
    }
}

/// How a logical rule combines its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalMode {
    /// All children match.
    And,
    /// Any child matches.
    Or,
}

/// Boolean combination of rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogicalRule {
    /// Combination mode.
    pub mode: LogicalMode,
    /// Child rules.
    pub rules: Vec<HeadlessRule>,
    /// Negate the match.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub invert: bool,
}

impl LogicalRule {
    fn validate(&self, location: &str) -> RuleResult<()> {
        if self.rules.is_empty() {
            return Err(RuleError::invalid(location, "logical rule has no children"));
        }
        for (i, rule) in self.rules.iter().enumerate() {
            rule.validate(&format!("{location}.rules[{i}]"))?;
        }
        Ok(())
    }
}

fn check_cidr(value: &str) -> Result<(), String> {
    let (addr, prefix) = match value.split_once('/') {
        Some((addr, prefix)) => (addr, Some(prefix)),
        None => (value, None),
    };
    let addr: IpAddr = addr
        .parse()
        .map_err(|_| format!("invalid address in '{value}'"))?;
    let max = if addr.is_ipv4() { 32 } else { 128 };
    if let Some(prefix) = prefix {
        match prefix.parse::<u8>() {
            Ok(bits) if bits <= max => {}
            _ => return Err(format!("invalid prefix in '{value}'")),
        }
    }
    Ok(())
}

fn check_port_range(value: &str) -> Result<(), String> {
    let Some((start, end)) = value.split_once(':') else {
        return Err(format!("port range '{value}' must be 'start:end'"));
    };
    let parse = |s: &str| -> Result<Option<u16>, String> {
        if s.is_empty() {
            Ok(None)
        } else {
            s.parse()
                .map(Some)
                .map_err(|_| format!("invalid port in '{value}'"))
        }
    };
    match (parse(start)?, parse(end)?) {
        (None, None) => Err(format!("port range '{value}' is empty")),
        (Some(a), Some(b)) if a > b => Err(format!("port range '{value}' is reversed")),
        _ => Ok(()),
    }
}
