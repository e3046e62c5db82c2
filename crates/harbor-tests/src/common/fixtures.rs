// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Config and rule documents used across suites.

/// Config documents accepted by [`crate::common::MockEngineFactory`].
pub struct ConfigFixtures;

impl ConfigFixtures {
    /// Smallest valid config.
    pub fn minimal() -> &'static str {
        "{}"
    }

    /// One inbound, one outbound, explicit final route and a colour log.
    pub fn mock_engine() -> &'static str {
        r#"{
            "log": {"level": "info", "disable_color": false},
            "inbounds": [{"type": "mock", "tag": "mock-in", "listen_port": 1080}],
            "outbounds": [{"type": "mock", "tag": "mock-out"}],
            "route": {"final": "mock-out"},
            "dns": {"servers": []}
        }"#
    }

    /// Syntactically broken JSON.
    pub fn malformed() -> &'static str {
        r#"{"inbounds": ["#
    }

    /// Valid JSON using a plugin no engine registers.
    pub fn unknown_outbound() -> &'static str {
        r#"{"outbounds": [{"type": "hysteria9", "tag": "x"}]}"#
    }

    /// Relay config blocking everything on an ephemeral port.
    pub fn relay_block() -> &'static str {
        r#"{
            "inbounds": [{"type": "direct", "tag": "in", "listen_port": 0}],
            "outbounds": [{"type": "block", "tag": "deny"}],
            "route": {"final": "deny"}
        }"#
    }

    /// Relay config listening on `port` and forwarding to `target`.
    pub fn relay_forward(port: u16, target: std::net::SocketAddr) -> String {
        serde_json::json!({
            "inbounds": [{"type": "direct", "tag": "in", "listen_port": port}],
            "outbounds": [{
                "type": "direct",
                "tag": "out",
                "override_address": target.ip().to_string(),
                "override_port": target.port(),
            }],
            "route": {"final": "out"}
        })
        .to_string()
    }
}

/// Rule documents.
pub struct RuleFixtures;

impl RuleFixtures {
    /// Default and logical rules across several fields.
    pub fn valid() -> &'static str {
        r#"{
            "version": 2,
            "rules": [
                {"domain": "example.com", "domain_suffix": [".example.org", ".example.net"]},
                {"ip_cidr": ["10.0.0.0/8", "fd00::/8"], "port": [80, 443], "invert": true},
                {
                    "type": "logical",
                    "mode": "and",
                    "rules": [{"network": "tcp"}, {"port_range": "1000:2000"}]
                }
            ]
        }"#
    }

    /// Not JSON.
    pub fn malformed() -> &'static str {
        "version: 1"
    }

    /// Unsupported document version.
    pub fn future_version() -> &'static str {
        r#"{"version": 99, "rules": [{"domain": "example.com"}]}"#
    }
}
