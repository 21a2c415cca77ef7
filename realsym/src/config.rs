//! Library path configuration.
//!
//! One absolute path per domain, pointing at the genuine native library.
//! The mapping is the only externally adjustable surface: relocating or
//! renaming a library means changing its entry here, nothing else. There is
//! deliberately no search-path fallback list, so a misconfigured deployment
//! fails hard on first use instead of silently resolving against the wrong
//! library.

use crate::domain::Domain;
use std::env;
use std::path::{Path, PathBuf};

/// Domain → absolute path of the genuine, unintercepted native library.
///
/// Immutable once a [`SymbolRegistry`](crate::resolution::SymbolRegistry)
/// is built from it; a path change after a domain's first use would be
/// inert anyway, because the handle is already memoized.
#[derive(Debug, Clone)]
pub struct LibraryConfig {
    paths: [PathBuf; Domain::COUNT],
}

impl LibraryConfig {
    /// Configuration with the stock install locations.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self { paths: Domain::ALL.map(|d| PathBuf::from(default_path(d))) }
    }

    /// Defaults plus `REALSYM_<DOMAIN>_PATH` environment overrides.
    ///
    /// Overrides are read once, when this is called; the process-wide
    /// registry calls it on first access, so the environment must be set
    /// before the first resolution.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::with_defaults();
        for domain in Domain::ALL {
            if let Ok(path) = env::var(domain.path_env_var()) {
                config.set_path(domain, path);
            }
        }
        config
    }

    /// Configured path for `domain`.
    #[must_use]
    pub fn path(&self, domain: Domain) -> &Path {
        &self.paths[domain.index()]
    }

    /// Point `domain` at a different library.
    pub fn set_path(&mut self, domain: Domain, path: impl Into<PathBuf>) {
        self.paths[domain.index()] = path.into();
    }
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn default_path(domain: Domain) -> &'static str {
    match domain {
        Domain::Cuda => "/usr/lib/x86_64-linux-gnu/libcuda.so",
        Domain::Nvml => "/usr/lib/x86_64-linux-gnu/libnvidia-ml.so",
        Domain::Cudart => "/usr/local/cuda/targets/x86_64-linux/lib/libcudart.so",
        Domain::Cudnn => "/usr/local/cudnn/lib64/libcudnn.so",
        Domain::Cublas => "/usr/local/cuda/targets/x86_64-linux/lib/libcublas.so",
        Domain::CublasLt => "/usr/local/cuda/targets/x86_64-linux/lib/libcublasLt.so",
        Domain::Cufft => "/usr/local/cuda/targets/x86_64-linux/lib/libcufft.so",
        Domain::Nvtx => "/usr/local/cuda/targets/x86_64-linux/lib/libnvToolsExt.so",
        Domain::Nvrtc => "/usr/local/cuda/targets/x86_64-linux/lib/libnvrtc.so",
        Domain::Curand => "/usr/local/cuda/targets/x86_64-linux/lib/libcurand.so",
        Domain::Cusparse => "/usr/local/cuda/targets/x86_64-linux/lib/libcusparse.so",
        Domain::Cusolver => "/usr/local/cuda/targets/x86_64-linux/lib/libcusolver.so",
        Domain::Nvjpeg => "/usr/local/cuda/targets/x86_64-linux/lib/libnvjpeg.so",
        Domain::Nvblas => "/usr/local/cuda/targets/x86_64-linux/lib/libnvblas.so",
    }
}
