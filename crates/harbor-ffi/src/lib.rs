// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # harbor-ffi
//!
//! Lets a host application (GUI shell, mobile wrapper, service manager)
//! drive the harbor supervisor through a C ABI.
//!
//! - [`gateway`]: blocking adapter owning a runtime and a supervisor
//! - [`exports`]: `extern "C"` functions over a process-wide gateway
//!
//! Return values are [`harbor_core::ErrorCode`] integers.

#![warn(missing_docs)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod cstr;
pub mod exports;
pub mod gateway;
pub mod logging;

pub use gateway::Gateway;
