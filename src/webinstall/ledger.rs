//! The installed-set ledger.
//!
//! A plain-text file, one source URL per line, append-only. A URL's presence
//! means its install completed at some point; the file never shrinks and a
//! manually deleted artifact is not detected. Single process assumed, so no
//! locking.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::error::InstallError;

#[derive(Debug)]
pub struct Ledger {
    path: PathBuf,
}

impl Ledger {
    /// Open (and create if absent) the ledger at `path`, including its
    /// parent directory.
    pub fn open(path: PathBuf) -> Result<Self, InstallError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| InstallError::DirectoryCreateFailed {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| InstallError::PersistFailed {
                path: path.clone(),
                source,
            })?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Exact-line membership check. A missing backing file is an empty set.
    pub fn contains(&self, url: &str) -> Result<bool, InstallError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(source) => {
                return Err(InstallError::PersistFailed {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        Ok(contents.lines().any(|line| line.trim() == url))
    }

    /// Append a URL to the ledger.
    pub fn record(&self, url: &str) -> Result<(), InstallError> {
        let persist = |source: io::Error| InstallError::PersistFailed {
            path: self.path.clone(),
            source,
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(persist)?;
        writeln!(file, "{}", url).map_err(persist)?;
        Ok(())
    }
}
