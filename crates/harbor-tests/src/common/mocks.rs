// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Mock Engine
//!
//! A scriptable [`EngineFactory`] whose engines record every lifecycle call.
//!
//! - Failure injection for create, start and close
//! - An optional start delay to widen race windows
//! - A live-instance gauge with a high-water mark
//! - The options each engine was built from, after normalization

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use harbor_config::{CapabilityRegistry, EngineOptions};
use harbor_core::{Engine, EngineError, EngineFactory};

/// Component type registered for every kind.
pub const MOCK_TYPE: &str = "mock";

/// A lifecycle call observed by the mock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockEvent {
    /// Engine `id` was built.
    Created(u64),
    /// Engine `id` started.
    Started(u64),
    /// Engine `id` closed; `cancelled` reports whether its scope had fired.
    Closed {
        /// Engine id.
        id: u64,
        /// Scope state at close time.
        cancelled: bool,
    },
}

#[derive(Debug, Default)]
struct MockState {
    next_id: AtomicU64,
    live: AtomicUsize,
    max_live: AtomicUsize,
    fail_create: AtomicBool,
    fail_start: AtomicBool,
    fail_close: AtomicBool,
    start_delay: Mutex<Duration>,
    events: Mutex<Vec<MockEvent>>,
    options: Mutex<Vec<EngineOptions>>,
}

impl MockState {
    fn record(&self, event: MockEvent) {
        self.events.lock().push(event);
    }
}

// =============================================================================
// MockEngineFactory
// =============================================================================

/// Factory handing out [`MockEngine`]s that share one recorder.
///
/// Clones share state, so a test can keep one handle while the supervisor
/// owns another.
#[derive(Debug, Clone)]
pub struct MockEngineFactory {
    registry: CapabilityRegistry,
    state: Arc<MockState>,
}

impl MockEngineFactory {
    /// Creates a factory that accepts `mock` components of every kind.
    pub fn new() -> Self {
        Self {
            registry: CapabilityRegistry::new()
                .with_inbound(MOCK_TYPE)
                .with_outbound(MOCK_TYPE)
                .with_endpoint(MOCK_TYPE),
            state: Arc::new(MockState::default()),
        }
    }

    /// Makes every subsequent `create` fail.
    pub fn fail_create(&self, fail: bool) {
        self.state.fail_create.store(fail, Ordering::SeqCst);
    }

    /// Makes every subsequent `start` fail.
    pub fn fail_start(&self, fail: bool) {
        self.state.fail_start.store(fail, Ordering::SeqCst);
    }

    /// Makes every subsequent `close` fail.
    pub fn fail_close(&self, fail: bool) {
        self.state.fail_close.store(fail, Ordering::SeqCst);
    }

    /// Sleeps inside every `start`.
    pub fn set_start_delay(&self, delay: Duration) {
        *self.state.start_delay.lock() = delay;
    }

    /// Number of engines built so far.
    pub fn created(&self) -> u64 {
        self.state.next_id.load(Ordering::SeqCst)
    }

    /// Engines built and not yet closed.
    pub fn live(&self) -> usize {
        self.state.live.load(Ordering::SeqCst)
    }

    /// Highest value [`MockEngineFactory::live`] ever reached.
    pub fn max_live(&self) -> usize {
        self.state.max_live.load(Ordering::SeqCst)
    }

    /// Every lifecycle call in order.
    pub fn events(&self) -> Vec<MockEvent> {
        self.state.events.lock().clone()
    }

    /// Options passed to each `create`, in order.
    pub fn options(&self) -> Vec<EngineOptions> {
        self.state.options.lock().clone()
    }

    /// Options of the most recent `create`.
    pub fn last_options(&self) -> Option<EngineOptions> {
        self.state.options.lock().last().cloned()
    }
}

impl Default for MockEngineFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineFactory for MockEngineFactory {
    fn name(&self) -> &str {
        "mock"
    }

    fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    fn create(
        &self,
        options: EngineOptions,
        cancel: CancellationToken,
    ) -> Result<Box<dyn Engine>, EngineError> {
        self.state.options.lock().push(options);
        if self.state.fail_create.load(Ordering::SeqCst) {
            return Err(EngineError::invalid_options("mock", "injected create failure"));
        }

        let id = self.state.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let live = self.state.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.max_live.fetch_max(live, Ordering::SeqCst);
        self.state.record(MockEvent::Created(id));

        Ok(Box::new(MockEngine {
            id,
            cancel,
            closed: false,
            state: Arc::clone(&self.state),
        }))
    }
}

// =============================================================================
// MockEngine
// =============================================================================

/// Engine built by [`MockEngineFactory`].
#[derive(Debug)]
pub struct MockEngine {
    id: u64,
    cancel: CancellationToken,
    closed: bool,
    state: Arc<MockState>,
}

#[async_trait]
impl Engine for MockEngine {
    async fn start(&mut self) -> Result<(), EngineError> {
        let delay = *self.state.start_delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if self.state.fail_start.load(Ordering::SeqCst) {
            return Err(EngineError::start("injected start failure"));
        }
        self.state.record(MockEvent::Started(self.id));
        Ok(())
    }

    async fn close(&mut self) -> Result<(), EngineError> {
        if !self.closed {
            self.closed = true;
            self.state.live.fetch_sub(1, Ordering::SeqCst);
            self.state.record(MockEvent::Closed {
                id: self.id,
                cancelled: self.cancel.is_cancelled(),
            });
        }
        if self.state.fail_close.load(Ordering::SeqCst) {
            return Err(EngineError::close("injected close failure"));
        }
        Ok(())
    }
}
