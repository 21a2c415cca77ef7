//! One stable entry point per library domain.
//!
//! The interception shims call these once per hooked API function, cache
//! the returned address, and later call the genuine implementation through
//! it. Callers never see the handle cache or the bootstrap primitive.
//!
//! A failure here means the deployment is broken (wrong path, wrong library
//! build, stripped export table), so the policy is to stop the process
//! early and loudly rather than let a hooked call dispatch through a null
//! or wrong address. Code that wants a recoverable error talks to
//! [`SymbolRegistry::resolve`](crate::resolution::SymbolRegistry::resolve)
//! directly.

use log::error;

use crate::domain::{Domain, SymbolAddress};
use crate::resolution::global;

fn resolve_or_abort(domain: Domain, symbol: &str) -> SymbolAddress {
    match global().resolve(domain, symbol) {
        Ok(resolved) => resolved.address,
        Err(e) => {
            error!("{e}");
            eprintln!("realsym: fatal: {e}");
            std::process::abort();
        }
    }
}

/// Real address of `symbol` in the driver API library.
#[must_use]
pub fn cuda_symbol(symbol: &str) -> SymbolAddress {
    resolve_or_abort(Domain::Cuda, symbol)
}

/// Real address of `symbol` in the management API library.
#[must_use]
pub fn nvml_symbol(symbol: &str) -> SymbolAddress {
    resolve_or_abort(Domain::Nvml, symbol)
}

/// Real address of `symbol` in the runtime library.
#[must_use]
pub fn cudart_symbol(symbol: &str) -> SymbolAddress {
    resolve_or_abort(Domain::Cudart, symbol)
}

#[must_use]
pub fn cudnn_symbol(symbol: &str) -> SymbolAddress {
    resolve_or_abort(Domain::Cudnn, symbol)
}

#[must_use]
pub fn cublas_symbol(symbol: &str) -> SymbolAddress {
    resolve_or_abort(Domain::Cublas, symbol)
}

#[must_use]
pub fn cublaslt_symbol(symbol: &str) -> SymbolAddress {
    resolve_or_abort(Domain::CublasLt, symbol)
}

#[must_use]
pub fn cufft_symbol(symbol: &str) -> SymbolAddress {
    resolve_or_abort(Domain::Cufft, symbol)
}

#[must_use]
pub fn nvtx_symbol(symbol: &str) -> SymbolAddress {
    resolve_or_abort(Domain::Nvtx, symbol)
}

#[must_use]
pub fn nvrtc_symbol(symbol: &str) -> SymbolAddress {
    resolve_or_abort(Domain::Nvrtc, symbol)
}

#[must_use]
pub fn curand_symbol(symbol: &str) -> SymbolAddress {
    resolve_or_abort(Domain::Curand, symbol)
}

#[must_use]
pub fn cusparse_symbol(symbol: &str) -> SymbolAddress {
    resolve_or_abort(Domain::Cusparse, symbol)
}

#[must_use]
pub fn cusolver_symbol(symbol: &str) -> SymbolAddress {
    resolve_or_abort(Domain::Cusolver, symbol)
}

#[must_use]
pub fn nvjpeg_symbol(symbol: &str) -> SymbolAddress {
    resolve_or_abort(Domain::Nvjpeg, symbol)
}

#[must_use]
pub fn nvblas_symbol(symbol: &str) -> SymbolAddress {
    resolve_or_abort(Domain::Nvblas, symbol)
}
