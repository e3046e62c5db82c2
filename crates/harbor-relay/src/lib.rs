// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # harbor-relay
//!
//! A small TCP relay engine implementing the harbor engine contract.
//!
//! It registers a `direct` inbound plus `direct` and `block` outbounds. Each
//! inbound listens on `listen:listen_port` and hands every connection to the
//! final outbound, which either relays it to the override destination or
//! closes it.
//!
//! ```json
//! {
//!   "inbounds": [
//!     { "type": "direct", "tag": "in", "listen_port": 1080,
//!       "override_address": "10.0.0.1", "override_port": 80 }
//!   ],
//!   "outbounds": [{ "type": "direct", "tag": "out" }],
//!   "route": { "final": "out" }
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod engine;
pub mod options;

pub use engine::{RelayEngine, RelayEngineFactory, ENGINE_NAME};
pub use options::{ListenerPlan, RouteAction};
