// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Engine abstraction.
//!
//! The proxy engine is an external collaborator. The supervisor only needs a
//! factory that knows which plugins exist and can build an engine from
//! validated options, and an engine that can be started and closed.
//!
//! # Lifecycle
//!
//! 1. [`EngineFactory::create`] with normalized options and a cancellation scope
//! 2. [`Engine::start`] to begin serving
//! 3. The scope is cancelled
//! 4. [`Engine::close`] to release every resource

use async_trait::async_trait;
use harbor_config::{CapabilityRegistry, EngineOptions};
use tokio_util::sync::CancellationToken;

use crate::error::EngineError;

// =============================================================================
// Engine Trait
// =============================================================================

/// A built engine instance.
///
/// Owned exclusively by the supervisor. Start and close may take non-trivial
/// time; the engine is responsible for bounding its own latency.
#[async_trait]
pub trait Engine: Send {
    /// Begins serving.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot acquire its resources
    /// (e.g. a listener address is already in use).
    async fn start(&mut self) -> Result<(), EngineError>;

    /// Releases all resources.
    ///
    /// Must be safe to call after a failed [`Engine::start`] and after the
    /// cancellation scope has fired.
    async fn close(&mut self) -> Result<(), EngineError>;
}

// =============================================================================
// EngineFactory Trait
// =============================================================================

/// Builds engines and describes the plugins they support.
pub trait EngineFactory: Send + Sync {
    /// Returns the engine name for logging.
    fn name(&self) -> &str;

    /// Returns the plugin registry used to validate configs.
    fn registry(&self) -> &CapabilityRegistry;

    /// Builds an engine from validated, normalized options.
    ///
    /// `cancel` is the instance's cancellation scope. It is cancelled before
    /// [`Engine::close`] is called.
    fn create(
        &self,
        options: EngineOptions,
        cancel: CancellationToken,
    ) -> Result<Box<dyn Engine>, EngineError>;
}
