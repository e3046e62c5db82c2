// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! C ABI entry points.
//!
//! Every function copies its string arguments, runs inside `catch_unwind`,
//! and returns an [`ErrorCode`] value. A panic is reported as the
//! operation's generic failure code.
//!
//! The functions may be called from any host thread; lifecycle calls are
//! serialized internally.
//!
//! ```c
//! int harbor_start(const char *config, const char *work_dir, const char *tag);
//! int harbor_stop(void);
//! int harbor_refresh(const char *config);
//! int harbor_is_running(void);
//! int harbor_compile_rule_set(const char *json, const char *output);
//! const char *harbor_error_message(int code);
//! ```

use std::collections::HashMap;
use std::ffi::{c_char, c_int, CString};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use harbor_core::{ErrorCode, StartRequest, SupervisorConfig};
use harbor_relay::RelayEngineFactory;
use once_cell::sync::{Lazy, OnceCell};
use tracing::{error, warn};

use crate::cstr::{owned_path, owned_string};
use crate::gateway::Gateway;
use crate::logging::init_logging;

static GATEWAY: OnceCell<Gateway> = OnceCell::new();

static MESSAGES: Lazy<HashMap<c_int, CString>> = Lazy::new(|| {
    ErrorCode::ALL
        .iter()
        .map(|code| (code.code(), CString::new(code.category()).unwrap_or_default()))
        .collect()
});

static UNKNOWN_MESSAGE: Lazy<CString> =
    Lazy::new(|| CString::new("unknown error").unwrap_or_default());

/// Returns the process-wide gateway, creating it on first use.
fn gateway() -> Option<&'static Gateway> {
    GATEWAY
        .get_or_try_init(|| {
            init_logging();
            Gateway::new(Arc::new(RelayEngineFactory::new()), SupervisorConfig::from_env())
        })
        .map_err(|e| error!(error = %e, "Failed to initialize gateway runtime"))
        .ok()
}

fn guarded(operation: &'static str, fallback: ErrorCode, f: impl FnOnce() -> ErrorCode) -> c_int {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(code) => code.code(),
        Err(_) => {
            error!(operation, "Panic caught at FFI boundary");
            fallback.code()
        }
    }
}

/// Starts the engine.
///
/// `work_dir` and `tag` may be null or empty. A null config path returns
/// `StartCreateError`.
///
/// # Safety
///
/// Each pointer must be null or a valid NUL-terminated string for the
/// duration of the call.
#[no_mangle]
pub unsafe extern "C" fn harbor_start(
    config_path: *const c_char,
    work_dir: *const c_char,
    tag: *const c_char,
) -> c_int {
    guarded("start", ErrorCode::StartCreateError, || {
        // SAFETY: caller contract.
        let (config_path, work_dir, tag) =
            unsafe { (owned_path(config_path), owned_path(work_dir), owned_string(tag)) };

        let Some(config_path) = config_path else {
            return ErrorCode::StartCreateError;
        };
        let Some(gateway) = gateway() else {
            return ErrorCode::StartCreateError;
        };
        if let Err(e) = gateway.enable_signals() {
            warn!(error = %e, "Signal handling unavailable");
        }

        let mut request = StartRequest::new(config_path);
        request.work_dir = work_dir;
        request.tag = tag;
        gateway.start(request)
    })
}

/// Stops the engine. Returns `Nil` when nothing is running.
#[no_mangle]
pub extern "C" fn harbor_stop() -> c_int {
    guarded("stop", ErrorCode::StopError, || match gateway() {
        Some(gateway) => gateway.stop(),
        None => ErrorCode::StopError,
    })
}

/// Recreates the engine from `config_path`. Returns `0` without starting
/// anything while idle.
///
/// # Safety
///
/// `config_path` must be null or a valid NUL-terminated string for the
/// duration of the call.
#[no_mangle]
pub unsafe extern "C" fn harbor_refresh(config_path: *const c_char) -> c_int {
    guarded("refresh", ErrorCode::StartCreateError, || {
        // SAFETY: caller contract.
        let Some(config_path) = (unsafe { owned_path(config_path) }) else {
            return ErrorCode::StartCreateError;
        };
        match gateway() {
            Some(gateway) => gateway.refresh(&config_path),
            None => ErrorCode::StartCreateError,
        }
    })
}

/// Returns `1` if an engine is running, `0` otherwise.
#[no_mangle]
pub extern "C" fn harbor_is_running() -> c_int {
    catch_unwind(|| GATEWAY.get().is_some_and(Gateway::is_running))
        .map(c_int::from)
        .unwrap_or(0)
}

/// Compiles a JSON rule document into a binary rule set.
///
/// # Safety
///
/// Both pointers must be null or valid NUL-terminated strings for the
/// duration of the call.
#[no_mangle]
pub unsafe extern "C" fn harbor_compile_rule_set(
    json_path: *const c_char,
    output_path: *const c_char,
) -> c_int {
    guarded("compile_rule_set", ErrorCode::FileWriteError, || {
        // SAFETY: caller contract.
        let (json_path, output_path) = unsafe { (owned_path(json_path), owned_path(output_path)) };

        let Some(json_path) = json_path else {
            return ErrorCode::FileOpenError;
        };
        let Some(output_path) = output_path else {
            return ErrorCode::FileCreateError;
        };
        match gateway() {
            Some(gateway) => gateway.compile_rule_set(&json_path, &output_path),
            None => ErrorCode::FileWriteError,
        }
    })
}

/// Returns the fixed category string for `code`.
///
/// The pointer is static and must not be freed. `Nil` yields an empty string.
#[no_mangle]
pub extern "C" fn harbor_error_message(code: c_int) -> *const c_char {
    MESSAGES
        .get(&code)
        .unwrap_or(&*UNKNOWN_MESSAGE)
        .as_ptr()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CStr;
    use std::ptr;

    fn message(code: c_int) -> String {
        unsafe { CStr::from_ptr(harbor_error_message(code)) }
            .to_str()
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(message(0), "");
        assert_eq!(message(-1), "start create failed");
        assert_eq!(message(-9), "rule read failed");
        assert_eq!(message(42), "unknown error");
    }

    #[test]
    fn test_null_config_is_start_create_error() {
        let code = unsafe { harbor_start(ptr::null(), ptr::null(), ptr::null()) };
        assert_eq!(code, ErrorCode::StartCreateError.code());
        assert_eq!(harbor_is_running(), 0);
    }

    #[test]
    fn test_null_refresh_path() {
        assert_eq!(
            unsafe { harbor_refresh(ptr::null()) },
            ErrorCode::StartCreateError.code()
        );
    }

    #[test]
    fn test_compile_rule_set_codes() {
        let dir = tempfile::tempdir().unwrap();
        let json = dir.path().join("rules.json");
        std::fs::write(&json, r#"{"version": 1, "rules": [{"network": "tcp"}]}"#).unwrap();
        let out = dir.path().join("rules.srs");

        let json_c = CString::new(json.to_str().unwrap()).unwrap();
        let out_c = CString::new(out.to_str().unwrap()).unwrap();
        let missing = CString::new(dir.path().join("none.json").to_str().unwrap()).unwrap();

        unsafe {
            assert_eq!(harbor_compile_rule_set(json_c.as_ptr(), out_c.as_ptr()), 0);
            assert_eq!(
                harbor_compile_rule_set(missing.as_ptr(), out_c.as_ptr()),
                ErrorCode::FileOpenError.code()
            );
            assert_eq!(
                harbor_compile_rule_set(ptr::null(), out_c.as_ptr()),
                ErrorCode::FileOpenError.code()
            );
        }
        assert!(out.exists());
    }

    #[test]
    fn test_stop_when_idle() {
        assert_eq!(harbor_stop(), 0);
    }
}
