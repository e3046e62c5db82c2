// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Config Integration Tests
//!
//! Loading engine configs against the relay engine's capability registry.

use harbor_config::{ConfigError, ConfigLoader};
use harbor_core::EngineFactory;
use harbor_relay::RelayEngineFactory;
use harbor_tests::prelude::*;

fn relay_loader() -> ConfigLoader {
    ConfigLoader::new(RelayEngineFactory::new().registry().clone())
}

#[test]
fn test_relay_config_loads() {
    let ws = Workspace::new();
    let path = ws.write("config.json", ConfigFixtures::relay_block());

    let options = relay_loader().load(&path).unwrap();
    assert_eq!(options.inbounds.len(), 1);
    assert_eq!(options.find_outbound("deny").map(|o| o.type_name.as_str()), Some("block"));
}

#[test]
fn test_mock_plugins_are_unknown_to_relay() {
    let err = relay_loader()
        .load_from_str(ConfigFixtures::mock_engine())
        .unwrap_err();
    assert!(matches!(err, ConfigError::UnsupportedType { kind: "inbound", .. }));
}

#[test]
fn test_duplicate_tags_across_sections() {
    let err = relay_loader()
        .load_from_str(
            r#"{
                "inbounds": [{"type": "direct", "tag": "main"}],
                "outbounds": [{"type": "direct", "tag": "main"}]
            }"#,
        )
        .unwrap_err();
    assert!(matches!(err, ConfigError::DuplicateTag { ref tag } if tag == "main"));
}

#[test]
fn test_unknown_final_outbound() {
    let err = relay_loader()
        .load_from_str(r#"{"outbounds": [{"type": "direct", "tag": "a"}], "route": {"final": "b"}}"#)
        .unwrap_err();
    assert!(matches!(err, ConfigError::UnknownTag { .. }));
}

#[test]
fn test_parse_error_reports_position() {
    let ws = Workspace::new();
    let path = ws.write("config.json", "{\n  \"log\": {\"level\": 3}\n}");

    match relay_loader().load(&path).unwrap_err() {
        ConfigError::Parse { origin, line, .. } => {
            assert_eq!(origin, path.display().to_string());
            assert_eq!(line, 2);
        }
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn test_missing_file() {
    let ws = Workspace::new();
    let err = relay_loader().load(ws.path("absent.json")).unwrap_err();
    assert!(matches!(err, ConfigError::FileNotFound { .. }));
}
