// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `start` command.

use std::sync::Arc;

use harbor_core::{SignalListener, StartRequest, Supervisor, SupervisorConfig};
use harbor_relay::RelayEngineFactory;
use tracing::info;

use crate::cli::{Cli, StartArgs};
use crate::error::{BinError, BinResult};

/// Runs the engine in the foreground until a terminating signal.
pub async fn start(cli: &Cli, args: &StartArgs) -> BinResult<()> {
    let mut config = SupervisorConfig::from_env();
    if cli.engine_debug {
        config = config.with_force_trace_logging(true);
    }

    let supervisor = Supervisor::with_config(Arc::new(RelayEngineFactory::new()), config);
    let listener = SignalListener::from_os()?;

    let mut request = StartRequest::new(&args.config).with_work_dir(&args.work_dir);
    if let Some(tag) = &args.tag {
        request = request.with_tag(tag);
    }

    let code = supervisor.run_foreground(request, listener).await;
    if code.is_nil() {
        info!("Engine stopped");
        Ok(())
    } else {
        Err(BinError::Lifecycle(code))
    }
}
