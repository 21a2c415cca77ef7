//! # realsym - Main Entry Point
//!
//! Diagnostic companion to the interception shim. Three modes:
//! - **List** (`--list`): show domains and the paths they resolve against
//! - **Check** (`--check`): pre-flight validation of every configured path
//! - **Resolve** (`--domain <D> <SYMBOL>...`): resolve real symbols and
//!   print their provenance
//!
//! Unlike the accessor surface the shim uses, the binary never aborts on a
//! resolution failure; it reports typed errors and maps them to exit codes.

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use realsym::cli::Args;
use realsym::config::LibraryConfig;
use realsym::domain::Domain;
use realsym::export::{DomainReport, ReportStatus, ResolutionReport, SymbolReport};
use realsym::preflight::check_domain;
use realsym::resolution::{DlLoader, SymbolRegistry};

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_USAGE: i32 = 2;

fn main() {
    env_logger::init();
    std::process::exit(match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            exit_code_for(&e)
        }
    });
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    if err.to_string().to_lowercase().contains("missing required") {
        EXIT_USAGE
    } else {
        EXIT_ERROR
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    let config = LibraryConfig::from_env();

    if args.list {
        list_domains(&config);
        return Ok(());
    }

    if args.check {
        return check_libraries(&args, &config);
    }

    if let Some(domain) = args.domain {
        if !args.symbols.is_empty() {
            return resolve_symbols(&args, domain, config);
        }
    }

    bail!(
        "Missing required argument: --list, --check, or --domain with SYMBOLs\n\n\
         Usage:\n  \
         realsym --list\n  \
         realsym --check\n  \
         realsym --domain cudart cudaMalloc cudaFree\n\n\
         Run 'realsym --help' for more options"
    )
}

fn list_domains(config: &LibraryConfig) {
    for domain in Domain::ALL {
        println!("{domain:<10} {}", config.path(domain).display());
    }
}

/// Pre-flight every configured domain (or the one selected with --domain)
/// and report all failures, not just the first.
fn check_libraries(args: &Args, config: &LibraryConfig) -> Result<()> {
    let domains: Vec<Domain> = match args.domain {
        Some(domain) => vec![domain],
        None => Domain::ALL.to_vec(),
    };

    let mut sections = Vec::new();
    let mut failures = 0usize;

    for domain in domains {
        let path = config.path(domain).to_path_buf();
        match check_domain(config, domain, args.quiet) {
            Ok(()) => {
                if !args.quiet {
                    println!("ok      {domain:<10} {}", path.display());
                }
                sections.push(DomainReport {
                    domain: domain.name().to_string(),
                    path,
                    status: ReportStatus::Ok,
                    symbols: Vec::new(),
                    error: None,
                });
            }
            Err(e) => {
                failures += 1;
                println!("failed  {domain:<10} {}", path.display());
                if !args.quiet {
                    eprintln!("        {e:#}");
                }
                sections.push(DomainReport {
                    domain: domain.name().to_string(),
                    path,
                    status: ReportStatus::Failed,
                    symbols: Vec::new(),
                    error: Some(format!("{e:#}")),
                });
            }
        }
    }

    write_report_if_requested(args.export.as_ref(), sections)?;

    if failures > 0 {
        bail!("{failures} of the checked libraries failed validation");
    }
    Ok(())
}

/// Resolve each requested symbol through a private registry and print
/// `symbol  address  module` lines.
fn resolve_symbols(args: &Args, domain: Domain, config: LibraryConfig) -> Result<()> {
    let registry = SymbolRegistry::new(config, DlLoader);
    let path = registry.config().path(domain).to_path_buf();

    let mut symbols = Vec::new();
    let mut failures = 0usize;

    for name in &args.symbols {
        match registry.resolve(domain, name) {
            Ok(resolved) => {
                let module = resolved
                    .module
                    .as_ref()
                    .map_or_else(|| "<unattributed>".to_string(), |m| m.display().to_string());
                println!("{name:<40} {} {module}", resolved.address);
                symbols.push(SymbolReport::resolved(&resolved));
            }
            Err(e) => {
                failures += 1;
                println!("{name:<40} <unresolved>");
                if !args.quiet {
                    eprintln!("        {e}");
                }
                symbols.push(SymbolReport::failed(name.as_str(), e.to_string()));
            }
        }
    }

    let status = if failures == 0 { ReportStatus::Ok } else { ReportStatus::Failed };
    write_report_if_requested(
        args.export.as_ref(),
        vec![DomainReport {
            domain: domain.name().to_string(),
            path,
            status,
            symbols,
            error: None,
        }],
    )?;

    if failures > 0 {
        bail!("{failures} of {} symbols failed to resolve", args.symbols.len());
    }
    Ok(())
}

fn write_report_if_requested(
    export: Option<&PathBuf>,
    sections: Vec<DomainReport>,
) -> Result<()> {
    let Some(path) = export else {
        return Ok(());
    };

    let report = ResolutionReport::new(sections);
    let file = File::create(path)
        .with_context(|| format!("Failed to create report file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    report
        .export(&mut writer)
        .with_context(|| format!("Failed to write report: {}", path.display()))?;
    Ok(())
}
