// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Engine lifecycle supervisor.
//!
//! The [`Supervisor`] owns the single engine slot. Every lifecycle operation
//! takes the slot lock for its whole duration, so Start, Stop, Refresh and
//! reloads are linearizable and two live engines never coexist.
//!
//! # State Machine
//!
//! ```text
//!            start ok                      stop
//!   Idle ──► Starting ──► Running ──► Stopping ──► Idle
//!    ▲          │            │
//!    └── fail ──┘            │ refresh / reload
//!    ▲                       ▼
//!    └────── fail ──── Reloading ──► Running
//! ```
//!
//! `Idle` and `Running` are the only states observable between calls.
//!
//! # Deployment Modes
//!
//! - Foreground ([`Supervisor::run_foreground`]): owns the process, reloads
//!   in place on SIGHUP and returns on a terminating signal.
//! - Embedded ([`Supervisor::spawn_signal_pump`]): discrete calls from a host
//!   plus a background task applying signals.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use harbor_config::ConfigLoader;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::engine::{Engine, EngineFactory};
use crate::error::{ErrorCode, SupervisorError, SupervisorResult};
use crate::signal::{LifecycleCommand, SignalListener};
use crate::workdir::{self, enter_work_dir};

/// Environment variable enabling trace-level engine logging.
pub const ENGINE_DEBUG_ENV: &str = "HARBOR_ENGINE_DEBUG";

// =============================================================================
// LifecycleState
// =============================================================================

/// Supervisor state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LifecycleState {
    /// No engine.
    #[default]
    Idle,
    /// First start in progress.
    Starting,
    /// An engine is serving.
    Running,
    /// The engine is being replaced.
    Reloading,
    /// The engine is being closed.
    Stopping,
}

impl LifecycleState {
    /// Returns the lowercase state name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Idle => "idle",
            LifecycleState::Starting => "starting",
            LifecycleState::Running => "running",
            LifecycleState::Reloading => "reloading",
            LifecycleState::Stopping => "stopping",
        }
    }

    /// Returns `true` for the states observable between calls.
    pub const fn is_stable(&self) -> bool {
        matches!(self, LifecycleState::Idle | LifecycleState::Running)
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Requests and Settings
// =============================================================================

/// Parameters of a start or refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartRequest {
    /// Path of the engine config. Relative paths resolve against the
    /// working directory, or the current one if there is none.
    pub config_path: PathBuf,
    /// Directory to create and enter first.
    pub work_dir: Option<PathBuf>,
    /// Caller-supplied label, used only in logs.
    pub tag: Option<String>,
}

impl StartRequest {
    /// Creates a request for `config_path`.
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            work_dir: None,
            tag: None,
        }
    }

    /// Sets the working directory. An empty path means none.
    pub fn with_work_dir(mut self, work_dir: impl Into<PathBuf>) -> Self {
        let work_dir = work_dir.into();
        self.work_dir = (!work_dir.as_os_str().is_empty()).then_some(work_dir);
        self
    }

    /// Sets the diagnostic tag. An empty tag means none.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        self.tag = (!tag.is_empty()).then_some(tag);
        self
    }

    fn tag_label(&self) -> &str {
        self.tag.as_deref().unwrap_or("-")
    }

    /// Makes both paths absolute, so replaying the request after the
    /// working directory was entered finds the same files.
    fn resolve(mut self) -> SupervisorResult<Self> {
        if let Some(dir) = self.work_dir.take() {
            let dir = workdir::absolute(&dir).map_err(|e| SupervisorError::work_dir(&dir, e))?;
            self.config_path = dir.join(&self.config_path);
            self.work_dir = Some(dir);
        } else if let Ok(path) = workdir::absolute(&self.config_path) {
            self.config_path = path;
        }
        Ok(self)
    }
}

/// Supervisor settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupervisorConfig {
    /// Force the engine's log level to trace.
    pub force_trace_logging: bool,
}

impl SupervisorConfig {
    /// Reads settings from the environment.
    pub fn from_env() -> Self {
        let force_trace_logging = std::env::var(ENGINE_DEBUG_ENV)
            .map(|v| parse_flag(&v))
            .unwrap_or(false);
        Self {
            force_trace_logging,
        }
    }

    /// Sets trace logging.
    pub fn with_force_trace_logging(mut self, enabled: bool) -> Self {
        self.force_trace_logging = enabled;
        self
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// =============================================================================
// Instance
// =============================================================================

/// Diagnostic snapshot of the running instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceInfo {
    /// Monotonic counter, incremented per successful start.
    pub generation: u64,
    /// Config the instance was built from.
    pub config_path: PathBuf,
    /// Working directory it was started in.
    pub work_dir: Option<PathBuf>,
    /// Caller tag.
    pub tag: Option<String>,
    /// When the engine finished starting.
    pub started_at: DateTime<Utc>,
}

struct Instance {
    engine: Box<dyn Engine>,
    cancel: CancellationToken,
    info: InstanceInfo,
}

impl Instance {
    /// Cancels the scope, then closes the engine.
    async fn shutdown(mut self) -> SupervisorResult<()> {
        self.cancel.cancel();
        self.engine
            .close()
            .await
            .map_err(SupervisorError::EngineClose)
    }
}

#[derive(Default)]
struct Slot {
    instance: Option<Instance>,
    last_request: Option<StartRequest>,
    generation: u64,
}

// =============================================================================
// Supervisor
// =============================================================================

/// Owns at most one running engine.
pub struct Supervisor {
    factory: Arc<dyn EngineFactory>,
    loader: ConfigLoader,
    config: SupervisorConfig,
    slot: Mutex<Slot>,
    state: watch::Sender<LifecycleState>,
}

impl Supervisor {
    /// Creates a supervisor with default settings.
    pub fn new(factory: Arc<dyn EngineFactory>) -> Self {
        Self::with_config(factory, SupervisorConfig::default())
    }

    /// Creates a supervisor with explicit settings.
    pub fn with_config(factory: Arc<dyn EngineFactory>, config: SupervisorConfig) -> Self {
        let loader = ConfigLoader::new(factory.registry().clone());
        let (state, _) = watch::channel(LifecycleState::Idle);
        Self {
            factory,
            loader,
            config,
            slot: Mutex::new(Slot::default()),
            state,
        }
    }

    /// Returns the settings.
    pub fn config(&self) -> &SupervisorConfig {
        &self.config
    }

    // =========================================================================
    // Lifecycle Operations
    // =========================================================================

    /// Creates and starts an engine.
    ///
    /// # Errors
    ///
    /// - [`SupervisorError::AlreadyRunning`] if an engine is running; it is
    ///   left untouched
    /// - a creation error (working directory, config, engine options)
    /// - [`SupervisorError::EngineStart`] if the engine could not start
    pub async fn start(&self, request: StartRequest) -> SupervisorResult<InstanceInfo> {
        let mut slot = self.slot.lock().await;
        if slot.instance.is_some() {
            warn!(config = %request.config_path.display(), "Start rejected: engine already running");
            return Err(SupervisorError::AlreadyRunning);
        }

        let request = request.resolve()?;
        self.set_state(LifecycleState::Starting);
        slot.last_request = Some(request.clone());
        let result = self.launch(&mut slot, &request).await;
        self.settle(&slot);
        result
    }

    /// Closes the running engine.
    ///
    /// Stopping an idle supervisor is a no-op. The slot is cleared even if
    /// the engine fails to close.
    pub async fn stop(&self) -> SupervisorResult<()> {
        let mut slot = self.slot.lock().await;
        let Some(instance) = slot.instance.take() else {
            debug!("Stop requested while idle");
            return Ok(());
        };

        self.set_state(LifecycleState::Stopping);
        let generation = instance.info.generation;
        let result = instance.shutdown().await;
        self.set_state(LifecycleState::Idle);

        match &result {
            Ok(()) => info!(generation, "Engine stopped"),
            Err(e) => error!(generation, error = %e, "Engine close failed"),
        }
        result
    }

    /// Replaces the running engine with one built from `request`.
    ///
    /// The old engine is fully closed before the new one is created. On
    /// failure the supervisor is left idle. Refreshing an idle supervisor
    /// does nothing and returns `None`.
    pub async fn refresh(&self, request: StartRequest) -> SupervisorResult<Option<InstanceInfo>> {
        let mut slot = self.slot.lock().await;
        if slot.instance.is_none() {
            debug!(config = %request.config_path.display(), "Refresh requested while idle");
            return Ok(None);
        }
        self.refresh_locked(&mut slot, request).await.map(Some)
    }

    /// Refreshes with a new config path, keeping the working directory and
    /// tag of the last request. A relative path resolves against that
    /// working directory.
    pub async fn refresh_config(
        &self,
        config_path: impl AsRef<Path>,
    ) -> SupervisorResult<Option<InstanceInfo>> {
        let mut slot = self.slot.lock().await;
        if slot.instance.is_none() {
            debug!(config = %config_path.as_ref().display(), "Refresh requested while idle");
            return Ok(None);
        }
        let mut request = slot
            .last_request
            .clone()
            .unwrap_or_else(|| StartRequest::new(config_path.as_ref()));
        request.config_path = config_path.as_ref().to_path_buf();
        self.refresh_locked(&mut slot, request).await.map(Some)
    }

    /// Refreshes from the last start request.
    ///
    /// Unlike [`Supervisor::refresh`], this also starts an idle supervisor:
    /// the last request is kept after a failed refresh, so a later reload
    /// can recover once the config is fixed.
    pub async fn reload(&self) -> SupervisorResult<InstanceInfo> {
        let mut slot = self.slot.lock().await;
        let Some(request) = slot.last_request.clone() else {
            warn!("Reload requested before any start");
            return Err(SupervisorError::NothingToReload);
        };
        self.refresh_locked(&mut slot, request).await
    }

    async fn refresh_locked(
        &self,
        slot: &mut Slot,
        request: StartRequest,
    ) -> SupervisorResult<InstanceInfo> {
        let request = request.resolve()?;
        slot.last_request = Some(request.clone());

        match slot.instance.take() {
            Some(previous) => {
                self.set_state(LifecycleState::Reloading);
                let generation = previous.info.generation;
                info!(generation, config = %request.config_path.display(), "Reloading engine");
                if let Err(e) = previous.shutdown().await {
                    warn!(generation, error = %e, "Previous engine failed to close, continuing reload");
                }
            }
            None => self.set_state(LifecycleState::Starting),
        }

        let result = self.launch(slot, &request).await;
        self.settle(slot);
        result
    }

    async fn launch(
        &self,
        slot: &mut Slot,
        request: &StartRequest,
    ) -> SupervisorResult<InstanceInfo> {
        let result = self.build(request).await;
        match result {
            Ok((engine, cancel)) => {
                slot.generation += 1;
                let info = InstanceInfo {
                    generation: slot.generation,
                    config_path: request.config_path.clone(),
                    work_dir: request.work_dir.clone(),
                    tag: request.tag.clone(),
                    started_at: Utc::now(),
                };
                info!(
                    engine = self.factory.name(),
                    generation = info.generation,
                    config = %request.config_path.display(),
                    tag = request.tag_label(),
                    "Engine started"
                );
                slot.instance = Some(Instance {
                    engine,
                    cancel,
                    info: info.clone(),
                });
                Ok(info)
            }
            Err(e) => {
                error!(
                    config = %request.config_path.display(),
                    work_dir = ?request.work_dir,
                    tag = request.tag_label(),
                    code = e.code().code(),
                    error = %e,
                    "Engine start failed"
                );
                Err(e)
            }
        }
    }

    async fn build(
        &self,
        request: &StartRequest,
    ) -> SupervisorResult<(Box<dyn Engine>, CancellationToken)> {
        if let Some(work_dir) = &request.work_dir {
            enter_work_dir(work_dir)?;
        }

        let mut options = self.loader.load(&request.config_path)?;
        options.normalize(self.config.force_trace_logging);

        let cancel = CancellationToken::new();
        let mut engine = match self.factory.create(options, cancel.clone()) {
            Ok(engine) => engine,
            Err(e) => {
                cancel.cancel();
                return Err(SupervisorError::EngineCreate(e));
            }
        };

        if let Err(e) = engine.start().await {
            cancel.cancel();
            if let Err(close_err) = engine.close().await {
                warn!(error = %close_err, "Failed to close engine after start failure");
            }
            return Err(SupervisorError::EngineStart(e));
        }

        Ok((engine, cancel))
    }

    fn set_state(&self, state: LifecycleState) {
        self.state.send_replace(state);
    }

    fn settle(&self, slot: &Slot) {
        let state = if slot.instance.is_some() {
            LifecycleState::Running
        } else {
            LifecycleState::Idle
        };
        self.set_state(state);
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Returns `true` iff an engine is running.
    ///
    /// Never waits for an in-flight transition.
    pub fn is_running(&self) -> bool {
        *self.state.borrow() == LifecycleState::Running
    }

    /// Returns the current state.
    pub fn state(&self) -> LifecycleState {
        *self.state.borrow()
    }

    /// Subscribes to state changes.
    pub fn subscribe_state(&self) -> watch::Receiver<LifecycleState> {
        self.state.subscribe()
    }

    /// Returns a snapshot of the running instance.
    ///
    /// Waits for any in-flight transition.
    pub async fn instance_info(&self) -> Option<InstanceInfo> {
        self.slot
            .lock()
            .await
            .instance
            .as_ref()
            .map(|i| i.info.clone())
    }

    // =========================================================================
    // Deployment Adapters
    // =========================================================================

    /// Runs the engine until a terminating command.
    ///
    /// Reload commands refresh in place. A failed start or reload ends the
    /// run with its code; a terminating command returns the stop result.
    /// The listener is shut down before returning.
    pub async fn run_foreground(
        &self,
        request: StartRequest,
        mut listener: SignalListener,
    ) -> ErrorCode {
        if let Err(e) = self.start(request).await {
            listener.shutdown().await;
            return e.code();
        }

        let code = loop {
            match listener.recv().await {
                Some(LifecycleCommand::Reload) => {
                    if let Err(e) = self.reload().await {
                        break e.code();
                    }
                }
                Some(LifecycleCommand::Terminate) | None => {
                    break ErrorCode::from_result(self.stop().await);
                }
            }
        };

        listener.shutdown().await;
        code
    }

    /// Applies signal commands in the background.
    ///
    /// Reload refreshes from the last request; Terminate stops the engine
    /// without ending the host process.
    pub fn spawn_signal_pump(self: &Arc<Self>, mut listener: SignalListener) -> SignalPump {
        let supervisor = Arc::clone(self);
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let task = tokio::spawn(async move {
            loop {
                let command = tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    command = listener.recv() => match command {
                        Some(command) => command,
                        None => break,
                    },
                };

                match command {
                    LifecycleCommand::Reload => {
                        let _ = supervisor.reload().await;
                    }
                    LifecycleCommand::Terminate => {
                        let _ = supervisor.stop().await;
                    }
                }
            }
            listener.shutdown().await;
        });

        SignalPump { cancel, task }
    }
}

impl fmt::Debug for Supervisor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Supervisor")
            .field("engine", &self.factory.name())
            .field("state", &self.state())
            .field("config", &self.config)
            .finish()
    }
}

// =============================================================================
// SignalPump
// =============================================================================

/// Handle to the background signal adapter.
pub struct SignalPump {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl SignalPump {
    /// Returns `true` once the pump has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stops the pump and its listener.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        let _ = self.task.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_request_builders() {
        let request = StartRequest::new("config.json")
            .with_work_dir("")
            .with_tag("");
        assert_eq!(request.work_dir, None);
        assert_eq!(request.tag, None);

        let request = StartRequest::new("config.json")
            .with_work_dir("/tmp/harbor")
            .with_tag("1234");
        assert_eq!(request.work_dir, Some(PathBuf::from("/tmp/harbor")));
        assert_eq!(request.tag.as_deref(), Some("1234"));
    }

    #[test]
    fn test_start_request_resolve() {
        let cwd = std::env::current_dir().unwrap();

        let request = StartRequest::new("config.json")
            .with_work_dir("wd")
            .resolve()
            .unwrap();
        assert_eq!(request.work_dir, Some(cwd.join("wd")));
        assert_eq!(request.config_path, cwd.join("wd").join("config.json"));

        let request = StartRequest::new("/etc/harbor.json")
            .with_work_dir("/srv/harbor")
            .resolve()
            .unwrap();
        assert_eq!(request.config_path, PathBuf::from("/etc/harbor.json"));

        let request = StartRequest::new("config.json").resolve().unwrap();
        assert_eq!(request.config_path, cwd.join("config.json"));
        assert_eq!(request.clone().resolve().unwrap(), request);
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("1"));
        assert!(parse_flag("TRUE"));
        assert!(parse_flag(" yes "));
        assert!(parse_flag("on"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag(""));
        assert!(!parse_flag("enabled"));
    }

    #[test]
    fn test_state_stability() {
        assert!(LifecycleState::Idle.is_stable());
        assert!(LifecycleState::Running.is_stable());
        assert!(!LifecycleState::Starting.is_stable());
        assert!(!LifecycleState::Reloading.is_stable());
        assert!(!LifecycleState::Stopping.is_stable());
        assert_eq!(LifecycleState::Reloading.to_string(), "reloading");
    }
}
