//! CLI argument definitions

use clap::Parser;
use std::path::PathBuf;

use crate::domain::Domain;

#[derive(Parser)]
#[command(
    name = "realsym",
    about = "Resolve real symbols from the genuine GPU libraries",
    after_help = "\
EXAMPLES:
    realsym --list                           Show domains and configured paths
    realsym --check                          Validate every configured library
    realsym --check --domain cudart          Validate one domain
    realsym --domain cuda cuInit cuLaunchKernel
                                             Resolve symbols, print provenance
    realsym --check --export report.json     Validate and write a JSON report

Library paths come from built-in defaults, overridable per domain with
REALSYM_<DOMAIN>_PATH environment variables (e.g. REALSYM_CUDART_PATH)."
)]
pub struct Args {
    /// Symbols to resolve in the selected domain
    #[arg(value_name = "SYMBOL", requires = "domain")]
    pub symbols: Vec<String>,

    /// Library domain to operate on
    #[arg(short, long)]
    pub domain: Option<Domain>,

    /// Validate configured library paths without resolving anything
    #[arg(long)]
    pub check: bool,

    /// List supported domains and their configured paths
    #[arg(long)]
    pub list: bool,

    /// Write a JSON report of the outcome
    #[arg(long, value_name = "FILE")]
    pub export: Option<PathBuf>,

    /// Suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,
}
