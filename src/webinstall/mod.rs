//! Web install subsystem: fetch an archive, extract it, place its content by
//! shape, and remember the URL so re-runs are no-ops.

pub mod archive;
pub mod error;
pub mod fetch;
pub mod install;
pub mod ledger;
pub mod placement;

pub use archive::ArchiveType;
pub use error::InstallError;
pub use fetch::{Fetcher, HttpFetcher};
pub use install::{Installer, Outcome};
pub use ledger::Ledger;
pub use placement::Placement;

use anyhow::bail;
use serde_json::json;
use std::path::PathBuf;
use std::str::FromStr;

use crate::ui::prelude::*;

/// The two final install locations. Both are created idempotently before any
/// placement.
#[derive(Debug, Clone)]
pub struct InstallRoots {
    /// Directory-shaped and multi-item installs (opt-style layout).
    pub software: PathBuf,
    /// Single-executable installs.
    pub bin: PathBuf,
}

impl InstallRoots {
    pub fn ensure(&self) -> Result<(), InstallError> {
        for root in [&self.software, &self.bin] {
            std::fs::create_dir_all(root).map_err(|source| {
                InstallError::DirectoryCreateFailed {
                    path: root.clone(),
                    source,
                }
            })?;
        }
        Ok(())
    }
}

/// Which root a strict-mode record pinned as the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetRoot {
    Software,
    Bin,
}

/// The caller-declared part of a strict (4-field) install record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrictTarget {
    /// Expected top-level entry name inside the archive.
    pub name: String,
    pub root: TargetRoot,
}

/// One web install task, parsed from a manifest record and immutable from
/// then on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRequest {
    pub url: String,
    /// Raw archive type hint; classified right before fetching so a bad hint
    /// fails that request without touching the network.
    pub hint: String,
    pub strict: Option<StrictTarget>,
}

impl FromStr for InstallRequest {
    type Err = anyhow::Error;

    /// Parse a pipe-delimited install record: `URL | hint` or
    /// `URL | name | root | hint`.
    fn from_str(record: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = record.split('|').map(str::trim).collect();

        let (url, hint, strict) = match fields.as_slice() {
            [url, hint] => (*url, *hint, None),
            [url, name, root, hint] => {
                if name.is_empty() {
                    bail!("expected name must not be empty");
                }
                let root = match root.to_ascii_lowercase().as_str() {
                    "software" | "opt" => TargetRoot::Software,
                    "bin" => TargetRoot::Bin,
                    other => bail!("unknown target root {other:?} (expected software or bin)"),
                };
                (
                    *url,
                    *hint,
                    Some(StrictTarget {
                        name: name.to_string(),
                        root,
                    }),
                )
            }
            other => bail!(
                "expected 2 or 4 pipe-delimited fields, found {}",
                other.len()
            ),
        };

        if url.is_empty() {
            bail!("URL must not be empty");
        }
        if !url.contains("://") {
            bail!("{url:?} is not a valid URL");
        }
        if hint.is_empty() {
            bail!("archive type hint must not be empty");
        }

        Ok(InstallRequest {
            url: url.to_string(),
            hint: hint.to_string(),
            strict,
        })
    }
}

/// Counts for one `apply` run over the web install list.
#[derive(Debug, Default, Clone, Copy)]
pub struct ApplySummary {
    pub installed: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Run every request in order. A failed request is reported and counted but
/// never prevents the remaining requests from being attempted.
pub fn apply_all(
    requests: &[InstallRequest],
    roots: &InstallRoots,
    ledger: &Ledger,
    fetcher: &dyn Fetcher,
) -> ApplySummary {
    let installer = Installer::new(roots, ledger, fetcher);
    let mut summary = ApplySummary::default();

    for request in requests {
        match installer.install(request) {
            Ok(Outcome::Installed(_)) => summary.installed += 1,
            Ok(Outcome::Skipped) => summary.skipped += 1,
            Err(e) => {
                emit(
                    Level::Error,
                    "web.install.failed",
                    &format!("{} {}: {}", char::from(NerdFont::Cross), request.url, e),
                    Some(json!({ "url": request.url })),
                );
                summary.failed += 1;
            }
        }
    }

    summary
}
