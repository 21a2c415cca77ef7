//! Structured error types for realsym
//!
//! Using thiserror for automatic Display implementation and error chaining.

use super::types::{Domain, SymbolAddress};
use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong while resolving a real symbol.
///
/// All variants describe environment or deployment defects (wrong path,
/// wrong library build, missing versioned libc entry point); the accessor
/// facade escalates them to a process abort, while library callers get the
/// typed value.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Failed to open {domain} library at {}: {reason}", .path.display())]
    LibraryOpenFailed { domain: Domain, path: PathBuf, reason: String },

    #[error("Failed to acquire the real dlsym primitive: {reason}")]
    BootstrapUnavailable { reason: String },

    #[error("Symbol name contains an interior NUL byte: {symbol:?}")]
    InvalidSymbolName { symbol: String },

    #[error("Symbol {symbol} not found in {domain} library")]
    SymbolNotFound { domain: Domain, symbol: String },

    #[error("No module found owning address {address}")]
    ModuleLookupFailed { address: SymbolAddress },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_failed_display() {
        let err = ResolveError::LibraryOpenFailed {
            domain: Domain::Cudart,
            path: PathBuf::from("/opt/cuda/lib/libcudart.so"),
            reason: "No such file or directory".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("cudart"));
        assert!(msg.contains("/opt/cuda/lib/libcudart.so"));
        assert!(msg.contains("No such file"));
    }

    #[test]
    fn test_symbol_not_found_display() {
        let err = ResolveError::SymbolNotFound {
            domain: Domain::Cuda,
            symbol: "cuDoesNotExist".to_string(),
        };
        assert_eq!(err.to_string(), "Symbol cuDoesNotExist not found in cuda library");
    }
}
