//! Pre-flight checks for configured library paths.
//!
//! Validates a deployment before any library is opened or any symbol is
//! resolved. Provides clear, actionable error messages when a configured
//! path is wrong, so operators see "fix the path" instead of a fatal
//! resolution failure deep inside an intercepted API call.

use anyhow::{bail, Context, Result};
use object::{Object, ObjectKind};
use std::fs;
use std::path::Path;

use crate::config::LibraryConfig;
use crate::domain::Domain;

/// Run all pre-flight checks over every configured domain.
///
/// Stops at the first failing domain; `--check` in the CLI iterates
/// domains itself to report all failures at once.
///
/// # Errors
/// Returns the first failing check, annotated with the domain and path.
pub fn run_preflight_checks(config: &LibraryConfig, quiet: bool) -> Result<()> {
    for domain in Domain::ALL {
        check_domain(config, domain, quiet)?;
    }
    Ok(())
}

/// Validate a single domain's configured library.
///
/// # Errors
/// - The configured path does not exist or is not a file
/// - The file is not a valid ELF object
/// - The object exports no dynamic symbols (nothing could ever resolve)
pub fn check_domain(config: &LibraryConfig, domain: Domain, quiet: bool) -> Result<()> {
    let path = config.path(domain);
    check_library_exists(domain, path)?;
    check_exports_symbols(domain, path, quiet)?;
    Ok(())
}

/// Check that the configured path points at an existing file.
fn check_library_exists(domain: Domain, path: &Path) -> Result<()> {
    if !path.exists() {
        bail!(
            "{domain} library not found: {}\n\n\
             Set {} to the library's actual location.",
            path.display(),
            domain.path_env_var()
        );
    }
    if !path.is_file() {
        bail!(
            "Not a file: {}\n\n\
             The {domain} path must point at a shared library, not a directory.",
            path.display()
        );
    }
    Ok(())
}

/// Check that the file is an ELF object with a dynamic symbol table.
fn check_exports_symbols(domain: Domain, path: &Path, quiet: bool) -> Result<()> {
    let file_data =
        fs::read(path).with_context(|| format!("Failed to read library: {}", path.display()))?;

    let obj = match object::File::parse(&*file_data) {
        Ok(obj) => obj,
        Err(e) => bail!(
            "{domain} library at {} is not a valid object file: {e}\n\n\
             The configured path may point at a linker script or a stub.",
            path.display()
        ),
    };

    if !quiet && obj.kind() != ObjectKind::Dynamic {
        eprintln!(
            "warning: {domain} library at {} is not a shared object (kind: {:?})",
            path.display(),
            obj.kind()
        );
    }

    if obj.dynamic_symbols().next().is_none() {
        bail!(
            "{domain} library at {} exports no dynamic symbols.\n\n\
             Nothing could ever be resolved from it; the deployment is broken.",
            path.display()
        );
    }

    Ok(())
}
