//! Core domain types for symbol resolution
//!
//! Newtype wrappers keep raw loader values (handles, addresses) out of
//! function signatures and make the provenance of a resolution explicit.

use std::ffi::c_void;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// One intercepted native library grouping.
///
/// Each domain maps to exactly one shared library on disk (see
/// [`LibraryConfig`](crate::config::LibraryConfig)) and owns one lazily
/// created loader handle for the life of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    /// Driver API (libcuda)
    Cuda,
    /// Management API (libnvidia-ml)
    Nvml,
    /// Runtime API (libcudart)
    Cudart,
    /// Deep neural network primitives (libcudnn)
    Cudnn,
    /// Dense linear algebra (libcublas)
    Cublas,
    /// Lightweight GEMM API (libcublasLt)
    CublasLt,
    /// Fast Fourier transforms (libcufft)
    Cufft,
    /// Tools extension / range annotations (libnvToolsExt)
    Nvtx,
    /// Runtime kernel compilation (libnvrtc)
    Nvrtc,
    /// Random number generation (libcurand)
    Curand,
    /// Sparse linear algebra (libcusparse)
    Cusparse,
    /// Dense and sparse direct solvers (libcusolver)
    Cusolver,
    /// JPEG codec (libnvjpeg)
    Nvjpeg,
    /// BLAS drop-in over cuBLAS (libnvblas)
    Nvblas,
}

impl Domain {
    /// Every supported domain, in declaration order.
    pub const ALL: [Self; 14] = [
        Self::Cuda,
        Self::Nvml,
        Self::Cudart,
        Self::Cudnn,
        Self::Cublas,
        Self::CublasLt,
        Self::Cufft,
        Self::Nvtx,
        Self::Nvrtc,
        Self::Curand,
        Self::Cusparse,
        Self::Cusolver,
        Self::Nvjpeg,
        Self::Nvblas,
    ];

    /// Number of supported domains.
    pub const COUNT: usize = Self::ALL.len();

    /// Canonical lower-case identifier, as accepted by the CLI and used in
    /// configuration variable names.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Cuda => "cuda",
            Self::Nvml => "nvml",
            Self::Cudart => "cudart",
            Self::Cudnn => "cudnn",
            Self::Cublas => "cublas",
            Self::CublasLt => "cublaslt",
            Self::Cufft => "cufft",
            Self::Nvtx => "nvtx",
            Self::Nvrtc => "nvrtc",
            Self::Curand => "curand",
            Self::Cusparse => "cusparse",
            Self::Cusolver => "cusolver",
            Self::Nvjpeg => "nvjpeg",
            Self::Nvblas => "nvblas",
        }
    }

    /// Environment variable that overrides this domain's library path.
    #[must_use]
    pub fn path_env_var(self) -> String {
        format!("REALSYM_{}_PATH", self.name().to_uppercase())
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for Domain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        Self::ALL.iter().copied().find(|d| d.name() == lower).ok_or_else(|| {
            format!(
                "unknown domain '{s}' (expected one of: {})",
                Self::ALL.map(Self::name).join(", ")
            )
        })
    }
}

/// Non-null address of a resolved symbol.
///
/// Stored as an integer so it stays `Send`/`Sync`; the interception shim
/// casts it back to the concrete function pointer type it intercepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolAddress(usize);

impl SymbolAddress {
    /// Wrap a raw loader result, rejecting null.
    #[must_use]
    pub fn new(raw: usize) -> Option<Self> {
        (raw != 0).then_some(Self(raw))
    }

    /// Wrap a raw pointer, rejecting null.
    #[must_use]
    pub fn from_ptr(ptr: *mut c_void) -> Option<Self> {
        Self::new(ptr as usize)
    }

    /// The address as a raw pointer, for casting to a function pointer.
    #[must_use]
    pub fn as_ptr(self) -> *mut c_void {
        self.0 as *mut c_void
    }

    /// The address as an integer.
    #[must_use]
    pub fn as_usize(self) -> usize {
        self.0
    }
}

impl fmt::Display for SymbolAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Opaque reference to a loaded shared library, as returned by the
/// platform loader. Never closed; the library lives until process exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LibraryHandle(usize);

impl LibraryHandle {
    /// Wrap a raw loader handle, rejecting null.
    #[must_use]
    pub fn new(raw: usize) -> Option<Self> {
        (raw != 0).then_some(Self(raw))
    }

    /// Wrap a raw pointer handle, rejecting null.
    #[must_use]
    pub fn from_ptr(ptr: *mut c_void) -> Option<Self> {
        Self::new(ptr as usize)
    }

    /// The handle as the raw pointer the platform loader expects.
    #[must_use]
    pub fn as_ptr(self) -> *mut c_void {
        self.0 as *mut c_void
    }
}

/// Outcome of a successful lookup, with provenance.
#[derive(Debug, Clone)]
pub struct ResolvedSymbol {
    /// The symbol that was requested.
    pub symbol: String,
    /// Where it lives in the process image.
    pub address: SymbolAddress,
    /// Owning module path from the reverse address lookup; `None` when the
    /// diagnostic query failed (resolution itself still succeeded).
    pub module: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_roundtrip_through_name() {
        for domain in Domain::ALL {
            assert_eq!(domain.name().parse::<Domain>().unwrap(), domain);
        }
    }

    #[test]
    fn test_domain_parse_is_case_insensitive() {
        assert_eq!("CUDART".parse::<Domain>().unwrap(), Domain::Cudart);
        assert_eq!("CublasLt".parse::<Domain>().unwrap(), Domain::CublasLt);
    }

    #[test]
    fn test_domain_parse_unknown() {
        let err = "opencl".parse::<Domain>().unwrap_err();
        assert!(err.contains("unknown domain 'opencl'"));
        assert!(err.contains("cudart"));
    }

    #[test]
    fn test_path_env_var() {
        assert_eq!(Domain::Cuda.path_env_var(), "REALSYM_CUDA_PATH");
        assert_eq!(Domain::CublasLt.path_env_var(), "REALSYM_CUBLASLT_PATH");
    }

    #[test]
    fn test_symbol_address_rejects_null() {
        assert!(SymbolAddress::new(0).is_none());
        assert!(SymbolAddress::from_ptr(std::ptr::null_mut()).is_none());

        let addr = SymbolAddress::new(0x7f00_1234).unwrap();
        assert_eq!(addr.as_usize(), 0x7f00_1234);
        assert_eq!(addr.to_string(), "0x7f001234");
    }

    #[test]
    fn test_library_handle_rejects_null() {
        assert!(LibraryHandle::new(0).is_none());
        assert!(LibraryHandle::new(0x1000).is_some());
    }
}
