// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Working Directory Integration Tests
//!
//! The current directory is process-wide, so every scenario runs inside one
//! test function in its own test binary.

use std::fs;

use harbor_core::{ErrorCode, LifecycleState, StartRequest};
use harbor_tests::prelude::*;

#[tokio::test]
async fn test_work_dir_handling() {
    init_test_logging();
    let ws = Workspace::new();
    let (supervisor, factory) = mock_supervisor();

    // Missing nested directory is created, then entered.
    let work_dir = ws.path("state/engine/run");
    let config = ws.write("config.json", ConfigFixtures::minimal());
    let info = supervisor
        .start(StartRequest::new(&config).with_work_dir(&work_dir))
        .await
        .unwrap();

    assert!(work_dir.is_dir());
    assert_eq!(
        std::env::current_dir().unwrap(),
        work_dir.canonicalize().unwrap()
    );
    assert_eq!(info.work_dir.as_deref(), Some(work_dir.as_path()));
    supervisor.stop().await.unwrap();

    // A relative config path resolves inside the working directory.
    let engine_dir = ws.path("relative");
    fs::create_dir_all(&engine_dir).unwrap();
    fs::write(engine_dir.join("engine.json"), ConfigFixtures::mock_engine()).unwrap();
    supervisor
        .start(StartRequest::new("engine.json").with_work_dir(&engine_dir))
        .await
        .unwrap();
    assert_eq!(
        factory.last_options().unwrap().route.unwrap().final_outbound.as_deref(),
        Some("mock-out")
    );
    supervisor.stop().await.unwrap();

    // A relative working directory survives reloads without nesting.
    std::env::set_current_dir(ws.root()).unwrap();
    let wd_config = ws.write("wd/config.json", ConfigFixtures::minimal()).canonicalize().unwrap();
    let info = supervisor
        .start(StartRequest::new("config.json").with_work_dir("wd"))
        .await
        .unwrap();
    let wd = info.work_dir.clone().unwrap();
    assert!(wd.is_absolute());
    assert_eq!(wd.canonicalize().unwrap(), ws.path("wd").canonicalize().unwrap());
    assert_eq!(info.config_path.canonicalize().unwrap(), wd_config);

    for generation in [info.generation + 1, info.generation + 2] {
        let reloaded = supervisor.reload().await.unwrap();
        assert_eq!(reloaded.generation, generation);
        assert_eq!(reloaded.work_dir.as_deref(), Some(wd.as_path()));
        assert_eq!(reloaded.config_path, info.config_path);
    }
    assert!(!ws.path("wd/wd").exists());
    assert_eq!(std::env::current_dir().unwrap(), wd.canonicalize().unwrap());

    // A relative refresh path resolves against the same directory.
    ws.write("wd/next.json", ConfigFixtures::mock_engine());
    let refreshed = supervisor.refresh_config("next.json").await.unwrap().unwrap();
    assert_eq!(refreshed.config_path, wd.join("next.json"));
    supervisor.stop().await.unwrap();

    // A working directory that cannot be entered aborts the start.
    let not_a_dir = ws.write("plain-file", "not a directory");
    let created = factory.created();
    let err = supervisor
        .start(StartRequest::new(&config).with_work_dir(&not_a_dir))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::StartCreateError);
    assert_eq!(supervisor.state(), LifecycleState::Idle);
    assert_eq!(factory.created(), created);

    // Creation failure is fatal as well.
    let under_file = not_a_dir.join("child");
    let err = supervisor
        .start(StartRequest::new(&config).with_work_dir(&under_file))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::StartCreateError);
    assert!(!under_file.exists());
    assert_eq!(factory.created(), created);
}
