//! # realsym - Real-Symbol Resolution for GPU API Interception
//!
//! realsym is the symbol-resolution core of an API-interception stack for
//! GPU compute libraries. An interception shim substitutes its own entry
//! points for driver, runtime, and math-library calls; realsym hands that
//! shim the address of each genuine implementation so the real work still
//! happens where it always did.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Interception Shim (external)               │
//! │        cuInit → shim → real cuInit via resolved address     │
//! └───────────────────────────┬─────────────────────────────────┘
//!                             │ one call per intercepted symbol
//!                             ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    realsym (This Crate)                     │
//! │                                                             │
//! │  ┌──────────────┐    ┌──────────────┐    ┌──────────────┐   │
//! │  │  Accessors   │───▶│   Registry   │───▶│ Handle Cache │   │
//! │  │ (per domain) │    │ (lookup svc) │    │ (per domain) │   │
//! │  └──────────────┘    └──────┬───────┘    └──────┬───────┘   │
//! │                             │                   │ dlopen    │
//! │                             ▼                   ▼           │
//! │                      ┌──────────────┐    ┌──────────────┐   │
//! │                      │  Bootstrap   │    │ LibraryConfig│   │
//! │                      │ (real dlsym) │    │ (domain→path)│   │
//! │                      └──────────────┘    └──────────────┘   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Structure
//!
//! - [`domain`]: Core types ([`Domain`](domain::Domain),
//!   [`SymbolAddress`](domain::SymbolAddress)) and the
//!   [`ResolveError`](domain::ResolveError) taxonomy
//!
//! - [`config`]: The domain → library-path mapping, with
//!   `REALSYM_<DOMAIN>_PATH` environment overrides
//!
//! - [`resolution`]: The core pipeline
//!   - `bootstrap`: fetches the genuine `dlsym` through a version-qualified
//!     lookup, bypassing any process-wide override (and with it, the
//!     recursion that override would otherwise cause)
//!   - `loader`: the platform loader seam; production uses `dlopen` /
//!     `dladdr`, tests substitute fakes
//!   - `registry`: per-domain memoized handles and the lookup service
//!
//! - [`accessors`]: One function per domain, the only surface the shim
//!   layer sees; applies the abort-on-failure policy
//!
//! - [`preflight`]: Deployment validation (path exists, is ELF, exports
//!   dynamic symbols) before anything is opened
//!
//! - [`export`]: JSON deployment report for fleet tooling
//!
//! - [`cli`]: Argument parsing for the diagnostic binary
//!
//! ## Key Properties
//!
//! - Each domain's library is opened at most once per process, concurrent
//!   first use included; handles are never reopened or unloaded
//! - The bootstrap primitive is fetched exactly once per process
//! - Resolution of a (domain, symbol) pair is idempotent
//! - Every successful resolution logs symbol, address, and owning module
//! - Failures are deployment defects: the accessor surface aborts, the
//!   registry layer returns typed errors for tests and tooling
//!
//! ## Typical Usage
//!
//! ```no_run
//! // In an interception shim: resolve once, cache, call through
//! let addr = realsym::accessors::cudart_symbol("cudaLaunchKernel");
//! # let _ = addr;
//! ```
//!
//! ```bash
//! # Deployment diagnostics
//! realsym --check
//! REALSYM_CUDART_PATH=/opt/cuda/lib/libcudart.so realsym --domain cudart cudaMalloc
//! ```

pub mod accessors;
pub mod cli;
pub mod config;
pub mod domain;
pub mod export;
pub mod preflight;
pub mod resolution;
