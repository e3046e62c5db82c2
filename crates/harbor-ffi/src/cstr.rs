// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! C string marshalling.
//!
//! Arguments are copied into owned values before any work starts; no
//! pointer into caller memory outlives the call.

use std::ffi::{c_char, CStr};
use std::path::PathBuf;

/// Copies a C string. Null and empty strings become `None`.
///
/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string that stays valid
/// for the duration of the call.
pub unsafe fn owned_bytes(ptr: *const c_char) -> Option<Vec<u8>> {
    if ptr.is_null() {
        return None;
    }
    // SAFETY: non-null and NUL-terminated per the caller contract.
    let bytes = unsafe { CStr::from_ptr(ptr) }.to_bytes();
    (!bytes.is_empty()).then(|| bytes.to_vec())
}

/// Copies a C string as a path.
///
/// # Safety
///
/// Same contract as [`owned_bytes`].
pub unsafe fn owned_path(ptr: *const c_char) -> Option<PathBuf> {
    // SAFETY: forwarded caller contract.
    let bytes = unsafe { owned_bytes(ptr) }?;
    Some(bytes_to_path(bytes))
}

/// Copies a C string as UTF-8 text, replacing invalid sequences.
///
/// # Safety
///
/// Same contract as [`owned_bytes`].
pub unsafe fn owned_string(ptr: *const c_char) -> Option<String> {
    // SAFETY: forwarded caller contract.
    let bytes = unsafe { owned_bytes(ptr) }?;
    Some(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(unix)]
fn bytes_to_path(bytes: Vec<u8>) -> PathBuf {
    use std::ffi::OsString;
    use std::os::unix::ffi::OsStringExt;
    PathBuf::from(OsString::from_vec(bytes))
}

#[cfg(not(unix))]
fn bytes_to_path(bytes: Vec<u8>) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(&bytes).into_owned())
}
