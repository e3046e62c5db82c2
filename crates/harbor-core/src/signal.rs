// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Process signal handling.
//!
//! A [`SignalListener`] owns a background task that turns process signals
//! into [`LifecycleCommand`]s. Every received signal yields exactly one
//! command, delivered in arrival order. The task is cancellable and its OS
//! subscriptions are dropped on [`SignalListener::shutdown`].
//!
//! ## Unix
//! SIGINT, SIGTERM and SIGQUIT terminate; SIGHUP reloads.
//!
//! ## Other platforms
//! Only Ctrl-C is observed; it terminates.

use std::fmt;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

// =============================================================================
// Signals and Commands
// =============================================================================

/// A process signal the supervisor reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessSignal {
    /// SIGINT / Ctrl-C.
    Interrupt,
    /// SIGTERM.
    Terminate,
    /// SIGHUP.
    Hangup,
    /// SIGQUIT.
    Quit,
}

impl ProcessSignal {
    /// Maps the signal to the lifecycle command it triggers.
    pub const fn command(self) -> LifecycleCommand {
        match self {
            ProcessSignal::Hangup => LifecycleCommand::Reload,
            ProcessSignal::Interrupt | ProcessSignal::Terminate | ProcessSignal::Quit => {
                LifecycleCommand::Terminate
            }
        }
    }

    /// Returns the conventional signal name.
    pub const fn name(self) -> &'static str {
        match self {
            ProcessSignal::Interrupt => "SIGINT",
            ProcessSignal::Terminate => "SIGTERM",
            ProcessSignal::Hangup => "SIGHUP",
            ProcessSignal::Quit => "SIGQUIT",
        }
    }
}

impl fmt::Display for ProcessSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A lifecycle transition requested from outside the caller's control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleCommand {
    /// Recreate the engine from the last start request.
    Reload,
    /// Stop the engine.
    Terminate,
}

// =============================================================================
// SignalListener
// =============================================================================

/// Background task translating process signals into lifecycle commands.
pub struct SignalListener {
    commands: mpsc::UnboundedReceiver<LifecycleCommand>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl SignalListener {
    /// Subscribes to the OS signals the supervisor handles.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if a signal handler cannot be registered.
    #[cfg(unix)]
    pub fn from_os() -> std::io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        let mut interrupt = signal(SignalKind::interrupt())?;
        let mut terminate = signal(SignalKind::terminate())?;
        let mut hangup = signal(SignalKind::hangup())?;
        let mut quit = signal(SignalKind::quit())?;

        Ok(Self::spawn(move |tx, cancel| async move {
            loop {
                let received = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    Some(()) = interrupt.recv() => ProcessSignal::Interrupt,
                    Some(()) = terminate.recv() => ProcessSignal::Terminate,
                    Some(()) = hangup.recv() => ProcessSignal::Hangup,
                    Some(()) = quit.recv() => ProcessSignal::Quit,
                    else => break,
                };
                if !forward(&tx, received) {
                    break;
                }
            }
        }))
    }

    /// Subscribes to Ctrl-C.
    ///
    /// Must be called from within a tokio runtime.
    #[cfg(not(unix))]
    pub fn from_os() -> std::io::Result<Self> {
        Ok(Self::spawn(move |tx, cancel| async move {
            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    result = tokio::signal::ctrl_c() => {
                        if result.is_err() || !forward(&tx, ProcessSignal::Interrupt) {
                            break;
                        }
                    }
                }
            }
        }))
    }

    /// Feeds signals from a channel instead of the OS.
    ///
    /// The listener ends when the sender is dropped.
    pub fn from_channel(mut signals: mpsc::UnboundedReceiver<ProcessSignal>) -> Self {
        Self::spawn(move |tx, cancel| async move {
            loop {
                let received = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    next = signals.recv() => match next {
                        Some(signal) => signal,
                        None => break,
                    },
                };
                if !forward(&tx, received) {
                    break;
                }
            }
        })
    }

    fn spawn<F, Fut>(body: F) -> Self
    where
        F: FnOnce(mpsc::UnboundedSender<LifecycleCommand>, CancellationToken) -> Fut,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        let (tx, commands) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let task = tokio::spawn(body(tx, cancel.clone()));
        Self {
            commands,
            cancel,
            task: Some(task),
        }
    }

    /// Waits for the next command.
    ///
    /// Returns `None` once the listener has stopped and every buffered
    /// command has been delivered.
    pub async fn recv(&mut self) -> Option<LifecycleCommand> {
        self.commands.recv().await
    }

    /// Returns a token that stops the listener when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Stops the background task and drops its subscriptions.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
        debug!("Signal listener stopped");
    }
}

impl Drop for SignalListener {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

fn forward(tx: &mpsc::UnboundedSender<LifecycleCommand>, signal: ProcessSignal) -> bool {
    let command = signal.command();
    info!(signal = %signal, command = ?command, "Received process signal");
    tx.send(command).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_mapping() {
        assert_eq!(ProcessSignal::Hangup.command(), LifecycleCommand::Reload);
        assert_eq!(ProcessSignal::Interrupt.command(), LifecycleCommand::Terminate);
        assert_eq!(ProcessSignal::Terminate.command(), LifecycleCommand::Terminate);
        assert_eq!(ProcessSignal::Quit.command(), LifecycleCommand::Terminate);
    }

    #[tokio::test]
    async fn test_channel_delivers_every_signal_in_order() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut listener = SignalListener::from_channel(rx);

        tx.send(ProcessSignal::Hangup).unwrap();
        tx.send(ProcessSignal::Hangup).unwrap();
        tx.send(ProcessSignal::Terminate).unwrap();
        drop(tx);

        assert_eq!(listener.recv().await, Some(LifecycleCommand::Reload));
        assert_eq!(listener.recv().await, Some(LifecycleCommand::Reload));
        assert_eq!(listener.recv().await, Some(LifecycleCommand::Terminate));
        assert_eq!(listener.recv().await, None);
    }

    #[tokio::test]
    async fn test_shutdown_stops_task() {
        let (tx, rx) = mpsc::unbounded_channel();
        let listener = SignalListener::from_channel(rx);
        let token = listener.cancellation_token();

        listener.shutdown().await;
        assert!(token.is_cancelled());
        assert!(tx.send(ProcessSignal::Hangup).is_err());
    }

    #[tokio::test]
    async fn test_cancel_ends_stream() {
        let (_tx, rx) = mpsc::unbounded_channel();
        let mut listener = SignalListener::from_channel(rx);

        listener.cancellation_token().cancel();
        assert_eq!(listener.recv().await, None);
    }
}
