// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Plugin settings and route planning.
//!
//! Turns validated [`EngineOptions`] into one [`ListenerPlan`] per inbound.
//! Every inbound follows the final route: `route.final` if set, otherwise
//! the first outbound, otherwise an implicit `direct`.

use harbor_config::{ComponentOptions, EngineOptions};
use harbor_core::EngineError;
use serde::Deserialize;

/// Inbound type accepting plain TCP.
pub const DIRECT_TYPE: &str = "direct";

/// Outbound type refusing every connection.
pub const BLOCK_TYPE: &str = "block";

fn default_listen() -> String {
    "127.0.0.1".to_string()
}

/// Settings of a `direct` inbound.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DirectInbound {
    /// Listen address.
    #[serde(default = "default_listen")]
    pub listen: String,
    /// Listen port; `0` picks an ephemeral port.
    pub listen_port: u16,
    /// Destination host.
    #[serde(default)]
    pub override_address: Option<String>,
    /// Destination port.
    #[serde(default)]
    pub override_port: Option<u16>,
}

/// Settings of a `direct` outbound.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DirectOutbound {
    /// Replaces the destination host.
    #[serde(default)]
    pub override_address: Option<String>,
    /// Replaces the destination port.
    #[serde(default)]
    pub override_port: Option<u16>,
}

/// What happens to an accepted connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteAction {
    /// Relay to `host:port`.
    Forward(String),
    /// Close immediately.
    Block,
}

/// A listener to bind and the action applied to its connections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerPlan {
    /// Inbound label for logs.
    pub label: String,
    /// `host:port` to bind.
    pub listen: String,
    /// Connection action.
    pub action: RouteAction,
}

/// Builds listener plans from validated options.
pub fn plan(options: &EngineOptions) -> Result<Vec<ListenerPlan>, EngineError> {
    let outbound = final_outbound(options)?;

    options
        .inbounds
        .iter()
        .map(|inbound| plan_inbound(inbound, outbound))
        .collect()
}

fn final_outbound(options: &EngineOptions) -> Result<Option<&ComponentOptions>, EngineError> {
    let final_tag = options
        .route
        .as_ref()
        .and_then(|r| r.final_outbound.as_deref());

    match final_tag {
        Some(tag) => options
            .find_outbound(tag)
            .map(Some)
            .ok_or_else(|| EngineError::invalid_options("route.final", format!("no outbound '{tag}'"))),
        None => Ok(options.outbounds.first()),
    }
}

fn plan_inbound(
    inbound: &ComponentOptions,
    outbound: Option<&ComponentOptions>,
) -> Result<ListenerPlan, EngineError> {
    let label = inbound.label().to_string();
    let settings: DirectInbound = decode(inbound)?;
    let listen = format!("{}:{}", settings.listen, settings.listen_port);

    let overrides = match outbound {
        Some(o) if o.type_name == BLOCK_TYPE => {
            return Ok(ListenerPlan {
                label,
                listen,
                action: RouteAction::Block,
            });
        }
        Some(o) => decode::<DirectOutbound>(o)?,
        None => DirectOutbound::default(),
    };

    let host = overrides.override_address.or(settings.override_address);
    let port = overrides.override_port.or(settings.override_port);
    let (Some(host), Some(port)) = (host, port) else {
        return Err(EngineError::invalid_options(
            label,
            "no destination: set override_address and override_port",
        ));
    };

    Ok(ListenerPlan {
        label,
        listen,
        action: RouteAction::Forward(format!("{host}:{port}")),
    })
}

fn decode<T: serde::de::DeserializeOwned>(component: &ComponentOptions) -> Result<T, EngineError> {
    component
        .settings_as()
        .map_err(|e| EngineError::invalid_options(component.label(), e.to_string()))
}
