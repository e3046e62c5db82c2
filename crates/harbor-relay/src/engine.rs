// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! The relay engine and its factory.

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use harbor_config::{CapabilityRegistry, EngineOptions};
use harbor_core::{Engine, EngineError, EngineFactory};
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use crate::options::{self, ListenerPlan, RouteAction, BLOCK_TYPE, DIRECT_TYPE};

/// Engine name reported to the supervisor.
pub const ENGINE_NAME: &str = "relay";

/// Pause after a failed `accept`, so descriptor exhaustion does not spin.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

// =============================================================================
// RelayEngineFactory
// =============================================================================

/// Factory for [`RelayEngine`].
#[derive(Debug, Clone)]
pub struct RelayEngineFactory {
    registry: CapabilityRegistry,
}

impl RelayEngineFactory {
    /// Creates the factory with the built-in plugins registered.
    pub fn new() -> Self {
        Self {
            registry: CapabilityRegistry::new()
                .with_inbound(DIRECT_TYPE)
                .with_outbound(DIRECT_TYPE)
                .with_outbound(BLOCK_TYPE),
        }
    }
}

impl Default for RelayEngineFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineFactory for RelayEngineFactory {
    fn name(&self) -> &str {
        ENGINE_NAME
    }

    fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    fn create(
        &self,
        options: EngineOptions,
        cancel: CancellationToken,
    ) -> Result<Box<dyn Engine>, EngineError> {
        Ok(Box::new(RelayEngine::new(&options, cancel)?))
    }
}

// =============================================================================
// RelayEngine
// =============================================================================

/// Relays TCP connections from each inbound to the final outbound.
pub struct RelayEngine {
    plans: Vec<ListenerPlan>,
    cancel: CancellationToken,
    tracker: TaskTracker,
    local_addrs: Vec<SocketAddr>,
    quiet: bool,
}

impl RelayEngine {
    /// Builds an engine without binding anything.
    pub fn new(options: &EngineOptions, cancel: CancellationToken) -> Result<Self, EngineError> {
        let plans = options::plan(options)?;
        Ok(Self {
            plans,
            cancel,
            tracker: TaskTracker::new(),
            local_addrs: Vec::new(),
            quiet: options.log.disabled,
        })
    }

    /// Addresses bound by [`Engine::start`], in inbound order.
    pub fn local_addrs(&self) -> &[SocketAddr] {
        &self.local_addrs
    }

    fn spawn_accept_loop(&self, listener: TcpListener, plan: ListenerPlan) {
        let cancel = self.cancel.clone();
        let tracker = self.tracker.clone();
        let quiet = self.quiet;

        self.tracker.spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    accepted = listener.accept() => match accepted {
                        Ok((stream, peer)) => {
                            if !quiet {
                                debug!(inbound = %plan.label, %peer, "Accepted connection");
                            }
                            tracker.spawn(serve(stream, plan.action.clone(), cancel.clone()));
                        }
                        Err(e) => {
                            warn!(inbound = %plan.label, error = %e, "Accept failed");
                            if !back_off(&cancel).await {
                                break;
                            }
                        }
                    },
                }
            }
        });
    }
}

/// Waits out [`ACCEPT_BACKOFF`]. Returns `false` if cancelled first.
async fn back_off(cancel: &CancellationToken) -> bool {
    tokio::select! {
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(ACCEPT_BACKOFF) => true,
    }
}

#[async_trait]
impl Engine for RelayEngine {
    async fn start(&mut self) -> Result<(), EngineError> {
        for plan in self.plans.clone() {
            let listener = TcpListener::bind(&plan.listen)
                .await
                .map_err(|e| EngineError::bind(&plan.listen, e))?;
            let addr = listener
                .local_addr()
                .map_err(|e| EngineError::bind(&plan.listen, e))?;

            if !self.quiet {
                info!(inbound = %plan.label, listen = %addr, "Inbound started");
            }
            self.local_addrs.push(addr);
            self.spawn_accept_loop(listener, plan);
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<(), EngineError> {
        self.cancel.cancel();
        self.tracker.close();
        self.tracker.wait().await;
        self.local_addrs.clear();
        Ok(())
    }
}

async fn serve(mut inbound: TcpStream, action: RouteAction, cancel: CancellationToken) {
    let target = match action {
        RouteAction::Block => {
            let _ = inbound.shutdown().await;
            return;
        }
        RouteAction::Forward(target) => target,
    };

    let mut outbound = match TcpStream::connect(&target).await {
        Ok(stream) => stream,
        Err(e) => {
            debug!(%target, error = %e, "Outbound connect failed");
            return;
        }
    };

    tokio::select! {
        _ = cancel.cancelled() => {}
        result = tokio::io::copy_bidirectional(&mut inbound, &mut outbound) => {
            if let Err(e) = result {
                if !is_disconnect(&e) {
                    debug!(%target, error = %e, "Relay failed");
                }
            }
        }
    }
}

fn is_disconnect(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::ConnectionReset | io::ErrorKind::BrokenPipe | io::ErrorKind::UnexpectedEof
    )
}
