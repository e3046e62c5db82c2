// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # harbor-core
//!
//! Lifecycle supervision for an embedded proxy engine.
//!
//! - **Error**: boundary [`ErrorCode`]s and the internal error hierarchy
//! - **Engine**: the [`Engine`] / [`EngineFactory`] contract
//! - **Supervisor**: the single-instance state machine and its two
//!   deployment adapters
//! - **Signal**: process signals mapped to lifecycle commands
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use harbor_core::{StartRequest, Supervisor};
//!
//! let supervisor = Supervisor::new(Arc::new(MyEngineFactory::default()));
//! supervisor.start(StartRequest::new("config.json")).await?;
//! assert!(supervisor.is_running());
//! supervisor.stop().await?;
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod engine;
pub mod error;
pub mod signal;
pub mod supervisor;
pub mod workdir;

// =============================================================================
// Re-exports
// =============================================================================

pub use engine::{Engine, EngineFactory};
pub use error::{EngineError, ErrorCode, SupervisorError, SupervisorResult};
pub use signal::{LifecycleCommand, ProcessSignal, SignalListener};
pub use supervisor::{
    InstanceInfo, LifecycleState, SignalPump, StartRequest, Supervisor, SupervisorConfig,
    ENGINE_DEBUG_ENV,
};
pub use workdir::enter_work_dir;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
