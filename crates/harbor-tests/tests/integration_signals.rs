// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Signal Integration Tests
//!
//! Both deployment adapters driven by synthetic signals:
//!
//! - `test_foreground_*`: `Supervisor::run_foreground`
//! - `test_pump_*`: `Supervisor::spawn_signal_pump`

use std::sync::Arc;
use std::time::Duration;

use harbor_core::{ErrorCode, LifecycleState, ProcessSignal, SignalListener, StartRequest};
use harbor_tests::prelude::*;
use tokio::sync::mpsc;
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(5);

async fn eventually(mut check: impl FnMut() -> bool) {
    timeout(WAIT, async {
        while !check() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

fn channel_listener() -> (mpsc::UnboundedSender<ProcessSignal>, SignalListener) {
    let (tx, rx) = mpsc::unbounded_channel();
    (tx, SignalListener::from_channel(rx))
}

// =============================================================================
// Foreground
// =============================================================================

#[tokio::test]
async fn test_foreground_reload_then_terminate() {
    init_test_logging();
    let ws = Workspace::new();
    let (supervisor, factory) = mock_supervisor();
    let (tx, listener) = channel_listener();

    tx.send(ProcessSignal::Hangup).unwrap();
    tx.send(ProcessSignal::Terminate).unwrap();

    let code = supervisor
        .run_foreground(ws.request("config.json", "{}"), listener)
        .await;

    assert_eq!(code, ErrorCode::Nil);
    assert_eq!(factory.created(), 2);
    assert_eq!(factory.live(), 0);
    assert_eq!(supervisor.state(), LifecycleState::Idle);
}

#[tokio::test]
async fn test_foreground_signals_are_not_coalesced() {
    let ws = Workspace::new();
    let (supervisor, factory) = mock_supervisor();
    let (tx, listener) = channel_listener();

    for _ in 0..3 {
        tx.send(ProcessSignal::Hangup).unwrap();
    }
    tx.send(ProcessSignal::Interrupt).unwrap();

    let code = supervisor
        .run_foreground(ws.request("config.json", "{}"), listener)
        .await;

    assert_eq!(code, ErrorCode::Nil);
    assert_eq!(factory.created(), 4);
    assert_eq!(factory.max_live(), 1);
}

#[tokio::test]
async fn test_foreground_start_failure_returns_code() {
    let ws = Workspace::new();
    let (supervisor, factory) = mock_supervisor();
    let (_tx, listener) = channel_listener();

    let code = supervisor
        .run_foreground(StartRequest::new(ws.path("absent.json")), listener)
        .await;

    assert_eq!(code, ErrorCode::StartCreateError);
    assert_eq!(factory.created(), 0);
}

#[tokio::test]
async fn test_foreground_failed_reload_ends_run() {
    let ws = Workspace::new();
    let (supervisor, factory) = mock_supervisor();
    let (tx, listener) = channel_listener();
    let request = ws.request("config.json", ConfigFixtures::minimal());

    let runner = {
        let supervisor = Arc::clone(&supervisor);
        tokio::spawn(async move { supervisor.run_foreground(request, listener).await })
    };

    eventually(|| supervisor.is_running()).await;
    ws.write("config.json", ConfigFixtures::malformed());
    tx.send(ProcessSignal::Hangup).unwrap();

    let code = timeout(WAIT, runner).await.unwrap().unwrap();
    assert_eq!(code, ErrorCode::StartCreateError);
    assert_eq!(factory.live(), 0);
    assert!(!supervisor.is_running());
}

#[tokio::test]
async fn test_foreground_stops_when_channel_closes() {
    let ws = Workspace::new();
    let (supervisor, factory) = mock_supervisor();
    let (tx, listener) = channel_listener();
    drop(tx);

    let code = supervisor
        .run_foreground(ws.request("config.json", "{}"), listener)
        .await;

    assert_eq!(code, ErrorCode::Nil);
    assert_eq!(factory.live(), 0);
}

#[tokio::test]
async fn test_foreground_reports_stop_error() {
    let ws = Workspace::new();
    let (supervisor, factory) = mock_supervisor();
    let (tx, listener) = channel_listener();
    factory.fail_close(true);
    tx.send(ProcessSignal::Quit).unwrap();

    let code = supervisor
        .run_foreground(ws.request("config.json", "{}"), listener)
        .await;

    assert_eq!(code, ErrorCode::StopError);
    assert_eq!(supervisor.state(), LifecycleState::Idle);
}

// =============================================================================
// Signal Pump
// =============================================================================

#[tokio::test]
async fn test_pump_reload_and_terminate() {
    let ws = Workspace::new();
    let (supervisor, factory) = mock_supervisor();
    let (tx, listener) = channel_listener();
    let pump = supervisor.spawn_signal_pump(listener);

    supervisor
        .start(ws.request("config.json", "{}"))
        .await
        .unwrap();

    tx.send(ProcessSignal::Hangup).unwrap();
    eventually(|| factory.created() == 2 && supervisor.is_running()).await;
    assert_eq!(supervisor.instance_info().await.unwrap().generation, 2);

    tx.send(ProcessSignal::Terminate).unwrap();
    eventually(|| supervisor.state() == LifecycleState::Idle).await;
    assert_eq!(factory.live(), 0);
    assert!(!pump.is_finished());

    pump.shutdown().await;
}

#[tokio::test]
async fn test_pump_survives_reload_before_start() {
    let ws = Workspace::new();
    let (supervisor, factory) = mock_supervisor();
    let (tx, listener) = channel_listener();
    let pump = supervisor.spawn_signal_pump(listener);

    tx.send(ProcessSignal::Hangup).unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(factory.created(), 0);
    assert!(!pump.is_finished());

    supervisor
        .start(ws.request("config.json", "{}"))
        .await
        .unwrap();
    assert!(supervisor.is_running());

    pump.shutdown().await;
    assert!(supervisor.is_running());
    supervisor.stop().await.unwrap();
}

#[tokio::test]
async fn test_pump_ends_with_listener() {
    let (supervisor, _factory) = mock_supervisor();
    let (tx, listener) = channel_listener();
    let pump = supervisor.spawn_signal_pump(listener);

    drop(tx);
    eventually(|| pump.is_finished()).await;
    pump.shutdown().await;
}

// =============================================================================
// Mapping
// =============================================================================

#[test]
fn test_signal_mapping() {
    use harbor_core::LifecycleCommand;

    assert_eq!(ProcessSignal::Hangup.command(), LifecycleCommand::Reload);
    for signal in [
        ProcessSignal::Interrupt,
        ProcessSignal::Terminate,
        ProcessSignal::Quit,
    ] {
        assert_eq!(signal.command(), LifecycleCommand::Terminate, "{}", signal.name());
    }
}
