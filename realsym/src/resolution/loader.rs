//! Platform loader seam.
//!
//! [`NativeLoader`] is the narrow interface between the resolution core and
//! the dynamic loader, so tests can substitute fakes and exercise the cache
//! and lookup logic without real native libraries (or a process-terminating
//! failure path). [`DlLoader`] is the production implementation.

#![allow(unsafe_code)] // dlopen/dladdr require unsafe

use std::ffi::{CStr, CString, OsStr};
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};
use std::ptr;

use super::bootstrap;
use crate::domain::{LibraryHandle, SymbolAddress};

/// Access to the platform dynamic loader.
///
/// Error payloads are plain strings: the registry layers domain and path
/// context on top when it builds a [`ResolveError`](crate::domain::ResolveError).
pub trait NativeLoader: Send + Sync {
    /// Open the library at `path`, returning its opaque handle.
    fn open(&self, path: &Path) -> Result<LibraryHandle, String>;

    /// Look up `symbol` inside `handle`.
    ///
    /// `Ok(None)` means the library does not export the symbol; `Err` means
    /// the lookup primitive itself is unavailable.
    fn lookup(&self, handle: LibraryHandle, symbol: &CStr) -> Result<Option<SymbolAddress>, String>;

    /// Reverse query: path of the module that owns `address`.
    fn module_of(&self, address: SymbolAddress) -> Option<PathBuf>;
}

/// The real loader: `dlopen` / real `dlsym` / `dladdr`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DlLoader;

impl NativeLoader for DlLoader {
    fn open(&self, path: &Path) -> Result<LibraryHandle, String> {
        let c_path = CString::new(path.as_os_str().as_bytes())
            .map_err(|_| format!("path contains a NUL byte: {}", path.display()))?;

        // Non-lazy, process-local binding: undefined symbols surface at open
        // time, and nothing leaks into the global lookup scope.
        let raw = unsafe { libc::dlopen(c_path.as_ptr(), libc::RTLD_NOW | libc::RTLD_LOCAL) };
        LibraryHandle::from_ptr(raw).ok_or_else(bootstrap::last_dl_error)
    }

    fn lookup(&self, handle: LibraryHandle, symbol: &CStr) -> Result<Option<SymbolAddress>, String> {
        let dlsym = bootstrap::real_dlsym_raw()?;
        let raw = unsafe { dlsym(handle.as_ptr(), symbol.as_ptr()) };
        Ok(SymbolAddress::from_ptr(raw))
    }

    fn module_of(&self, address: SymbolAddress) -> Option<PathBuf> {
        let mut info = libc::Dl_info {
            dli_fname: ptr::null(),
            dli_fbase: ptr::null_mut(),
            dli_sname: ptr::null(),
            dli_saddr: ptr::null_mut(),
        };

        let rc = unsafe { libc::dladdr(address.as_ptr(), &mut info) };
        if rc == 0 || info.dli_fname.is_null() {
            return None;
        }

        let fname = unsafe { CStr::from_ptr(info.dli_fname) };
        Some(PathBuf::from(OsStr::from_bytes(fname.to_bytes())))
    }
}
