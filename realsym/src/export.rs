//! Deployment report export
//!
//! Serializes pre-flight and resolution outcomes to JSON so fleet tooling
//! can audit a deployment without scraping log lines.

use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::PathBuf;
use thiserror::Error;

use crate::domain::ResolvedSymbol;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to write report: {0}")]
    WriteFailed(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Outcome of one domain's checks or resolutions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Ok,
    Failed,
    Skipped,
}

/// One symbol's resolution outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolReport {
    pub symbol: String,
    /// Hex-formatted address; absent when resolution failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Owning module from the reverse lookup.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SymbolReport {
    /// Report entry for a successful resolution.
    #[must_use]
    pub fn resolved(symbol: &ResolvedSymbol) -> Self {
        Self {
            symbol: symbol.symbol.clone(),
            address: Some(symbol.address.to_string()),
            module: symbol.module.clone(),
            error: None,
        }
    }

    /// Report entry for a failed resolution.
    #[must_use]
    pub fn failed(symbol: impl Into<String>, error: impl Into<String>) -> Self {
        Self { symbol: symbol.into(), address: None, module: None, error: Some(error.into()) }
    }
}

/// One domain's section of the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainReport {
    pub domain: String,
    pub path: PathBuf,
    pub status: ReportStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub symbols: Vec<SymbolReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Report container
#[derive(Debug, Serialize, Deserialize)]
pub struct ResolutionReport {
    /// Tool and version that produced the report.
    #[serde(rename = "generatedBy")]
    pub generated_by: String,
    pub domains: Vec<DomainReport>,
}

impl ResolutionReport {
    #[must_use]
    pub fn new(domains: Vec<DomainReport>) -> Self {
        Self {
            generated_by: format!("realsym {}", env!("CARGO_PKG_VERSION")),
            domains,
        }
    }

    /// Serialize the report as pretty-printed JSON.
    ///
    /// # Errors
    /// Returns an error if serialization or the underlying write fails.
    pub fn export<W: Write>(&self, writer: &mut W) -> Result<(), ExportError> {
        serde_json::to_writer_pretty(&mut *writer, self)?;
        writer.write_all(b"\n")?;
        Ok(())
    }

    /// True when every domain section came back [`ReportStatus::Ok`].
    #[must_use]
    pub fn all_ok(&self) -> bool {
        self.domains.iter().all(|d| d.status == ReportStatus::Ok)
    }
}
