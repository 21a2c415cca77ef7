//! Acquisition of the genuine, unintercepted `dlsym`.
//!
//! A process that interposes library calls usually ships its own `dlsym`
//! so it can hand out shim addresses. Resolving real symbols through the
//! default `dlsym` would therefore re-enter the hook. Requesting the
//! version-qualified symbol from libc via `dlvsym` sidesteps the override:
//! interposers only shadow the default, unversioned entry point.

#![allow(unsafe_code)] // dlopen/dlvsym/dlerror require unsafe

use std::ffi::{c_char, c_void, CStr};
use std::sync::OnceLock;

use log::debug;

use crate::domain::ResolveError;

/// Signature of the libc symbol-lookup routine.
pub type DlsymFn = unsafe extern "C" fn(*mut c_void, *const c_char) -> *mut c_void;

const LIBC_SONAME: &CStr = c"libc.so.6";
const DLSYM_SYMBOL: &CStr = c"dlsym";

/// glibc symbol version carrying the real `dlsym` implementation.
#[cfg(target_arch = "x86_64")]
const DLSYM_VERSION: &CStr = c"GLIBC_2.2.5";
#[cfg(target_arch = "aarch64")]
const DLSYM_VERSION: &CStr = c"GLIBC_2.17";

static REAL_DLSYM: OnceLock<Result<DlsymFn, String>> = OnceLock::new();

/// The real `dlsym`, fetched once per process and cached.
///
/// Racing first callers all observe the same outcome; the underlying
/// `dlopen`/`dlvsym` pair runs at most once no matter how many domains or
/// symbols are resolved afterwards.
///
/// # Errors
/// `ResolveError::BootstrapUnavailable` if libc cannot be opened or the
/// versioned lookup comes back null. Without the primitive no further
/// resolution is possible, so callers treat this as unrecoverable.
pub fn real_dlsym() -> Result<DlsymFn, ResolveError> {
    real_dlsym_raw().map_err(|reason| ResolveError::BootstrapUnavailable { reason })
}

pub(crate) fn real_dlsym_raw() -> Result<DlsymFn, String> {
    REAL_DLSYM.get_or_init(|| unsafe { fetch_real_dlsym() }).clone()
}

unsafe fn fetch_real_dlsym() -> Result<DlsymFn, String> {
    let libc_handle = libc::dlopen(LIBC_SONAME.as_ptr(), libc::RTLD_LAZY);
    if libc_handle.is_null() {
        return Err(format!(
            "dlopen({}) failed: {}",
            LIBC_SONAME.to_string_lossy(),
            last_dl_error()
        ));
    }

    let raw = libc::dlvsym(libc_handle, DLSYM_SYMBOL.as_ptr(), DLSYM_VERSION.as_ptr());
    if raw.is_null() {
        return Err(format!(
            "dlvsym(dlsym, {}) failed: {}",
            DLSYM_VERSION.to_string_lossy(),
            last_dl_error()
        ));
    }

    debug!(
        "Acquired real dlsym at {:#x} (version {})",
        raw as usize,
        DLSYM_VERSION.to_string_lossy()
    );
    Ok(std::mem::transmute::<*mut c_void, DlsymFn>(raw))
}

/// Drain and format the loader's thread-local error string.
pub(crate) fn last_dl_error() -> String {
    let err = unsafe { libc::dlerror() };
    if err.is_null() {
        "unknown loader error".to_string()
    } else {
        unsafe { CStr::from_ptr(err) }.to_string_lossy().into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_real_dlsym_is_available() {
        let dlsym = real_dlsym().expect("real dlsym must be obtainable on glibc");
        // Fetched exactly once: a second call hands back the same pointer
        let again = real_dlsym().unwrap();
        assert_eq!(dlsym as usize, again as usize);
    }

    #[test]
    fn test_real_dlsym_resolves_like_the_default() {
        let dlsym = real_dlsym().unwrap();

        // No interposer is installed in the test process, so the versioned
        // primitive and the default entry point must agree
        unsafe {
            let handle = libc::dlopen(LIBC_SONAME.as_ptr(), libc::RTLD_LAZY);
            assert!(!handle.is_null());

            let via_real = dlsym(handle, c"getpid".as_ptr());
            let via_default = libc::dlsym(handle, c"getpid".as_ptr());
            assert!(!via_real.is_null());
            assert_eq!(via_real, via_default);
        }
    }
}
