//! Resolution core modules
//!
//! This module contains the machinery behind the domain accessor surface:
//! - Bootstrap acquisition of the genuine `dlsym`
//! - The platform loader seam (real and fake implementations)
//! - The per-domain handle cache and lookup service

pub mod bootstrap;
pub mod loader;
pub mod registry;

// Re-export common types
pub use bootstrap::{real_dlsym, DlsymFn};
pub use loader::{DlLoader, NativeLoader};
pub use registry::{global, SymbolRegistry};
