// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Blocking adapter over the supervisor.
//!
//! The gateway owns a multi-thread runtime and drives every supervisor call
//! to completion with `block_on`, so it must not be used from inside another
//! tokio runtime. All methods take `&self`; the supervisor serializes
//! lifecycle operations, which makes the gateway safe to share between host
//! threads.

use std::io;
use std::path::Path;
use std::sync::Arc;

use harbor_core::{
    EngineFactory, ErrorCode, SignalListener, SignalPump, StartRequest, Supervisor,
    SupervisorConfig,
};
use harbor_rules::{compile_rule_set, BinaryRuleCodec, RuleCodec};
use once_cell::sync::OnceCell;
use tokio::runtime::{Builder, Runtime};
use tracing::warn;

/// Synchronous control surface for one supervisor.
pub struct Gateway {
    runtime: Runtime,
    supervisor: Arc<Supervisor>,
    codec: Box<dyn RuleCodec>,
    signals: OnceCell<SignalPump>,
}

impl Gateway {
    /// Creates a gateway with its own runtime.
    pub fn new(factory: Arc<dyn EngineFactory>, config: SupervisorConfig) -> io::Result<Self> {
        let runtime = Builder::new_multi_thread()
            .enable_all()
            .thread_name("harbor-ffi")
            .build()?;

        Ok(Self {
            runtime,
            supervisor: Arc::new(Supervisor::with_config(factory, config)),
            codec: Box::new(BinaryRuleCodec),
            signals: OnceCell::new(),
        })
    }

    /// Replaces the rule codec.
    pub fn with_codec(mut self, codec: Box<dyn RuleCodec>) -> Self {
        self.codec = codec;
        self
    }

    /// Returns the supervisor.
    pub fn supervisor(&self) -> &Arc<Supervisor> {
        &self.supervisor
    }

    /// Subscribes to process signals once for the gateway's lifetime.
    ///
    /// SIGHUP reloads from the last request; terminating signals stop the
    /// engine without exiting the host.
    pub fn enable_signals(&self) -> io::Result<()> {
        self.signals
            .get_or_try_init(|| {
                let _guard = self.runtime.enter();
                let listener = SignalListener::from_os()?;
                Ok(self.supervisor.spawn_signal_pump(listener))
            })
            .map(drop)
    }

    /// Returns `true` once [`Gateway::enable_signals`] has succeeded.
    pub fn signals_enabled(&self) -> bool {
        self.signals.get().is_some()
    }

    /// Starts an engine.
    pub fn start(&self, request: StartRequest) -> ErrorCode {
        ErrorCode::from_result(self.runtime.block_on(self.supervisor.start(request)))
    }

    /// Stops the engine.
    pub fn stop(&self) -> ErrorCode {
        ErrorCode::from_result(self.runtime.block_on(self.supervisor.stop()))
    }

    /// Recreates the engine from a new config, keeping the working directory
    /// and tag of the last request. Does nothing while idle.
    pub fn refresh(&self, config_path: &Path) -> ErrorCode {
        ErrorCode::from_result(
            self.runtime
                .block_on(self.supervisor.refresh_config(config_path)),
        )
    }

    /// Returns `true` iff an engine is running.
    pub fn is_running(&self) -> bool {
        self.supervisor.is_running()
    }

    /// Compiles a rule document.
    pub fn compile_rule_set(&self, json_path: &Path, output_path: &Path) -> ErrorCode {
        ErrorCode::from_result(compile_rule_set(json_path, output_path, self.codec.as_ref()))
    }

    /// Stops the engine and the signal pump, then drops the runtime.
    pub fn shutdown(self) -> ErrorCode {
        let code = self.stop();
        let Gateway {
            runtime, signals, ..
        } = self;
        if let Some(pump) = signals.into_inner() {
            runtime.block_on(pump.shutdown());
        }
        if !code.is_nil() {
            warn!(code = code.code(), "Gateway shut down with a failed stop");
        }
        code
    }
}
