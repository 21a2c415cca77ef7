//! Per-domain handle cache and the symbol lookup service.
//!
//! One [`OnceLock`] slot per domain gives the same at-most-once guarantee
//! the platform gives function-local statics: racing first users trigger a
//! single library open and all observe the identical handle. Handles are
//! never reopened or unloaded; a failed open is memoized just like a
//! successful one, so a misconfigured deployment keeps failing loudly.

use std::ffi::CString;
use std::sync::OnceLock;

use log::{info, warn};

use super::loader::{DlLoader, NativeLoader};
use crate::config::LibraryConfig;
use crate::domain::{Domain, LibraryHandle, ResolveError, ResolvedSymbol};

/// Lazy per-domain library handles plus the lookup service on top.
///
/// Generic over the loader so the cache and lookup logic can run against a
/// fake in tests; production code uses [`global()`] with [`DlLoader`].
pub struct SymbolRegistry<L = DlLoader> {
    config: LibraryConfig,
    loader: L,
    handles: [OnceLock<Result<LibraryHandle, String>>; Domain::COUNT],
}

impl<L: NativeLoader> SymbolRegistry<L> {
    /// Registry over `config`, with every domain still uninitialized.
    pub fn new(config: LibraryConfig, loader: L) -> Self {
        Self { config, loader, handles: std::array::from_fn(|_| OnceLock::new()) }
    }

    /// Handle for `domain`, opening its configured library on first use.
    ///
    /// Subsequent calls return the memoized handle without touching the
    /// loader. Opening a library may run its static initializers and load
    /// its own dependencies; that is the loader's business.
    ///
    /// # Errors
    /// `ResolveError::LibraryOpenFailed` when the configured path cannot be
    /// opened. The failure is memoized too; there is no retry.
    pub fn handle(&self, domain: Domain) -> Result<LibraryHandle, ResolveError> {
        self.handles[domain.index()]
            .get_or_init(|| self.loader.open(self.config.path(domain)))
            .clone()
            .map_err(|reason| ResolveError::LibraryOpenFailed {
                domain,
                path: self.config.path(domain).to_path_buf(),
                reason,
            })
    }

    /// Resolve `symbol` inside `domain`'s library.
    ///
    /// Every requested symbol is mandatory: a null lookup result is an
    /// error, not a sentinel. The reverse address→module query is purely
    /// diagnostic; when it fails, the resolution still succeeds with
    /// `module` unset and a warning on the log.
    ///
    /// Idempotent: the same (domain, symbol) pair yields the same address
    /// for the life of the handle.
    ///
    /// # Errors
    /// - `LibraryOpenFailed` on first use of a misconfigured domain
    /// - `BootstrapUnavailable` if the real lookup primitive is missing
    /// - `InvalidSymbolName` for names with interior NUL bytes
    /// - `SymbolNotFound` when the library does not export `symbol`
    pub fn resolve(&self, domain: Domain, symbol: &str) -> Result<ResolvedSymbol, ResolveError> {
        let handle = self.handle(domain)?;

        let c_symbol = CString::new(symbol)
            .map_err(|_| ResolveError::InvalidSymbolName { symbol: symbol.to_string() })?;

        let address = self
            .loader
            .lookup(handle, &c_symbol)
            .map_err(|reason| ResolveError::BootstrapUnavailable { reason })?
            .ok_or_else(|| ResolveError::SymbolNotFound {
                domain,
                symbol: symbol.to_string(),
            })?;

        let module = self.loader.module_of(address);
        match &module {
            Some(path) => {
                info!("Symbol: {symbol}, Address: {address}, Library: {}", path.display());
            }
            None => warn!("Symbol: {symbol}, Address: {address}, Library: <unattributed>"),
        }

        Ok(ResolvedSymbol { symbol: symbol.to_string(), address, module })
    }

    /// The configuration this registry was built from.
    #[must_use]
    pub fn config(&self) -> &LibraryConfig {
        &self.config
    }
}

static GLOBAL: OnceLock<SymbolRegistry<DlLoader>> = OnceLock::new();

/// The process-wide registry behind the domain accessor surface.
///
/// Built on first access from [`LibraryConfig::from_env()`] and the real
/// loader; lives until process exit with no teardown path.
pub fn global() -> &'static SymbolRegistry<DlLoader> {
    GLOBAL.get_or_init(|| SymbolRegistry::new(LibraryConfig::from_env(), DlLoader))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SymbolAddress;
    use std::collections::HashMap;
    use std::ffi::CStr;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Barrier};

    /// In-memory loader: one fake library per path, with an open counter.
    struct FakeLoader {
        opens: AtomicUsize,
        libraries: HashMap<PathBuf, HashMap<String, usize>>,
    }

    impl FakeLoader {
        fn new() -> Self {
            Self { opens: AtomicUsize::new(0), libraries: HashMap::new() }
        }

        fn with_library(mut self, path: &str, symbols: &[(&str, usize)]) -> Self {
            let table =
                symbols.iter().map(|(name, addr)| ((*name).to_string(), *addr)).collect();
            self.libraries.insert(PathBuf::from(path), table);
            self
        }

        fn open_count(&self) -> usize {
            self.opens.load(Ordering::SeqCst)
        }
    }

    impl NativeLoader for FakeLoader {
        fn open(&self, path: &Path) -> Result<LibraryHandle, String> {
            self.opens.fetch_add(1, Ordering::SeqCst);
            let index = self
                .libraries
                .keys()
                .position(|p| p == path)
                .ok_or_else(|| format!("cannot open {}", path.display()))?;
            Ok(LibraryHandle::new(0x1000 + index).unwrap())
        }

        fn lookup(
            &self,
            handle: LibraryHandle,
            symbol: &CStr,
        ) -> Result<Option<SymbolAddress>, String> {
            let index = handle.as_ptr() as usize - 0x1000;
            let table =
                self.libraries.values().nth(index).ok_or_else(|| "bad handle".to_string())?;
            Ok(table
                .get(symbol.to_str().unwrap())
                .and_then(|&addr| SymbolAddress::new(addr)))
        }

        fn module_of(&self, address: SymbolAddress) -> Option<PathBuf> {
            self.libraries
                .iter()
                .find(|(_, table)| table.values().any(|&a| a == address.as_usize()))
                .map(|(path, _)| path.clone())
        }
    }

    fn test_config(path: &str) -> LibraryConfig {
        let mut config = LibraryConfig::with_defaults();
        config.set_path(Domain::Cudart, path);
        config
    }

    #[test]
    fn test_handle_is_memoized() {
        let loader = FakeLoader::new()
            .with_library("/fake/libcudart.so", &[("cudaMalloc", 0xAAAA)]);
        let registry = SymbolRegistry::new(test_config("/fake/libcudart.so"), loader);

        let first = registry.handle(Domain::Cudart).unwrap();
        let second = registry.handle(Domain::Cudart).unwrap();

        assert_eq!(first, second);
        assert_eq!(registry.loader.open_count(), 1);
    }

    #[test]
    fn test_resolve_returns_address_and_provenance() {
        let loader = FakeLoader::new()
            .with_library("/fake/libcudart.so", &[("cudaLaunchKernel", 0xBEEF)]);
        let registry = SymbolRegistry::new(test_config("/fake/libcudart.so"), loader);

        let resolved = registry.resolve(Domain::Cudart, "cudaLaunchKernel").unwrap();
        assert_eq!(resolved.address.as_usize(), 0xBEEF);
        assert_eq!(resolved.module.as_deref(), Some(Path::new("/fake/libcudart.so")));

        // Idempotent
        let again = registry.resolve(Domain::Cudart, "cudaLaunchKernel").unwrap();
        assert_eq!(again.address, resolved.address);
        assert_eq!(registry.loader.open_count(), 1);
    }

    #[test]
    fn test_missing_symbol_is_an_error() {
        let loader =
            FakeLoader::new().with_library("/fake/libcudart.so", &[("cudaMalloc", 0xAAAA)]);
        let registry = SymbolRegistry::new(test_config("/fake/libcudart.so"), loader);

        let err = registry.resolve(Domain::Cudart, "cudaDoesNotExist").unwrap_err();
        assert!(matches!(
            err,
            ResolveError::SymbolNotFound { domain: Domain::Cudart, ref symbol }
                if symbol == "cudaDoesNotExist"
        ));
    }

    #[test]
    fn test_interior_nul_is_rejected() {
        let loader =
            FakeLoader::new().with_library("/fake/libcudart.so", &[("cudaMalloc", 0xAAAA)]);
        let registry = SymbolRegistry::new(test_config("/fake/libcudart.so"), loader);

        let err = registry.resolve(Domain::Cudart, "cuda\0Malloc").unwrap_err();
        assert!(matches!(err, ResolveError::InvalidSymbolName { .. }));
    }

    #[test]
    fn test_failed_open_is_memoized() {
        let loader = FakeLoader::new(); // knows no libraries at all
        let registry = SymbolRegistry::new(test_config("/fake/libcudart.so"), loader);

        assert!(registry.handle(Domain::Cudart).is_err());
        assert!(registry.handle(Domain::Cudart).is_err());
        // Only the first call reached the loader
        assert_eq!(registry.loader.open_count(), 1);
    }

    #[test]
    fn test_config_chooses_the_backing_library() {
        let loader = FakeLoader::new()
            .with_library("/fake/a/libcudart.so", &[("cudaMalloc", 0x1111)])
            .with_library("/fake/b/libcudart.so", &[("cudaMalloc", 0x2222)]);

        let via_a = SymbolRegistry::new(
            test_config("/fake/a/libcudart.so"),
            FakeLoader::new()
                .with_library("/fake/a/libcudart.so", &[("cudaMalloc", 0x1111)])
                .with_library("/fake/b/libcudart.so", &[("cudaMalloc", 0x2222)]),
        );
        assert_eq!(via_a.resolve(Domain::Cudart, "cudaMalloc").unwrap().address.as_usize(), 0x1111);

        let via_b = SymbolRegistry::new(test_config("/fake/b/libcudart.so"), loader);
        assert_eq!(via_b.resolve(Domain::Cudart, "cudaMalloc").unwrap().address.as_usize(), 0x2222);
    }

    #[test]
    fn test_concurrent_first_use_opens_once() {
        let loader = FakeLoader::new().with_library(
            "/fake/libnvidia-ml.so",
            &[("nvmlInit_v2", 0xCAFE), ("nvmlShutdown", 0xD00D)],
        );
        let mut config = LibraryConfig::with_defaults();
        config.set_path(Domain::Nvml, "/fake/libnvidia-ml.so");
        let registry = Arc::new(SymbolRegistry::new(config, loader));

        let threads = 8;
        let barrier = Arc::new(Barrier::new(threads));
        let handles: Vec<_> = (0..threads)
            .map(|i| {
                let registry = Arc::clone(&registry);
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || {
                    barrier.wait();
                    let symbol = if i % 2 == 0 { "nvmlInit_v2" } else { "nvmlShutdown" };
                    registry.resolve(Domain::Nvml, symbol).unwrap().address
                })
            })
            .collect();

        let addresses: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(registry.loader.open_count(), 1, "exactly one underlying open");
        for (i, addr) in addresses.iter().enumerate() {
            let expected = if i % 2 == 0 { 0xCAFE } else { 0xD00D };
            assert_eq!(addr.as_usize(), expected);
        }
    }
}
