//! The archive install orchestrator.
//!
//! One invocation handles one `(url, hint)` request end to end:
//! ledger check, fetch, extract, resolve placement, move into place, record.
//! The whole attempt works inside a single [`tempfile::TempDir`], so the
//! downloaded payload and the extraction directory are released on every
//! exit path, error or not.

use serde_json::json;
use std::path::PathBuf;

use crate::ui::prelude::*;

use super::archive::{self, ArchiveType};
use super::error::InstallError;
use super::fetch::Fetcher;
use super::ledger::Ledger;
use super::placement;
use super::{InstallRequest, InstallRoots};

/// Result of one install attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The artifact was placed at the given path and the ledger updated.
    Installed(PathBuf),
    /// The URL was already in the ledger; nothing was fetched or written.
    Skipped,
}

pub struct Installer<'a> {
    roots: &'a InstallRoots,
    ledger: &'a Ledger,
    fetcher: &'a dyn Fetcher,
}

impl<'a> Installer<'a> {
    pub fn new(roots: &'a InstallRoots, ledger: &'a Ledger, fetcher: &'a dyn Fetcher) -> Self {
        Self {
            roots,
            ledger,
            fetcher,
        }
    }

    /// Install one request. Replaying a URL that already completed
    /// short-circuits at the ledger check with zero network or filesystem
    /// mutation.
    pub fn install(&self, request: &InstallRequest) -> Result<Outcome, InstallError> {
        // A recorded URL is done, whatever the rest of the record says now.
        if self.ledger.contains(&request.url)? {
            emit(
                Level::Info,
                "web.install.skip",
                &format!(
                    "{} {} already installed, skipping",
                    char::from(NerdFont::Check),
                    request.url
                ),
                None,
            );
            return Ok(Outcome::Skipped);
        }

        // Classify before fetching so a bad hint never reaches the network.
        let kind = ArchiveType::from_hint(&request.hint)?;

        self.roots.ensure()?;

        // Private workspace for this attempt; dropped (and removed) on every
        // return below.
        let work = tempfile::tempdir().map_err(|source| InstallError::DirectoryCreateFailed {
            path: std::env::temp_dir(),
            source,
        })?;

        emit(
            Level::Info,
            "web.install.fetching",
            &format!(
                "{} Downloading {}",
                char::from(NerdFont::Download),
                request.url
            ),
            None,
        );
        let payload = self.fetcher.fetch(&request.url, work.path())?;

        emit(
            Level::Debug,
            "web.install.extracting",
            &format!(
                "{} Extracting {} ({})",
                char::from(NerdFont::Archive),
                payload.display(),
                kind
            ),
            None,
        );
        let extracted = archive::extract(&payload, kind, work.path())?;

        let entries = placement::top_entries(&extracted)?;
        let base = payload
            .file_name()
            .map(|n| archive::strip_archive_suffix(&n.to_string_lossy()).to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "package".to_string());

        let decision = match &request.strict {
            Some(target) => placement::resolve_strict(&entries, &target.name)?,
            None => placement::resolve(&entries, &base)?,
        };

        let installed = placement::place(
            &decision,
            &extracted,
            self.roots,
            request.strict.as_ref().map(|t| t.root),
        )?;

        // The artifact is in place; a failed ledger append must not undo it.
        if let Err(e) = self.ledger.record(&request.url) {
            emit(
                Level::Warn,
                "web.install.persist_failed",
                &format!(
                    "{} Installed {} but could not update the ledger: {}",
                    char::from(NerdFont::Warning),
                    request.url,
                    e
                ),
                None,
            );
        }

        emit(
            Level::Success,
            "web.install.done",
            &format!(
                "{} Installed {} -> {}",
                char::from(NerdFont::Check),
                request.url,
                installed.display()
            ),
            Some(json!({ "url": request.url, "path": installed.display().to_string() })),
        );

        Ok(Outcome::Installed(installed))
    }
}
