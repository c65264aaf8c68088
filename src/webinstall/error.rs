use std::path::PathBuf;
use thiserror::Error;

/// Failure modes of a single web install attempt.
///
/// Every variant except [`InstallError::PersistFailed`] aborts the current
/// request only; the driving loop records it and moves on. `PersistFailed`
/// during finalization is downgraded to a warning because the artifact is
/// already in place and re-downloading it over a failed bookkeeping append
/// would be worse than a stale ledger.
#[derive(Debug, Error)]
pub enum InstallError {
    #[error("unsupported archive type hint {hint:?}")]
    UnsupportedType { hint: String },

    #[error("download of {url} failed: {reason}")]
    DownloadFailed { url: String, reason: String },

    #[error("extraction of {archive} failed: {reason}")]
    ExtractionFailed { archive: String, reason: String },

    #[error("archive extracted to zero top-level entries")]
    EmptyArchive,

    #[error("failed to place {name}: {reason}")]
    PlacementFailed { name: String, reason: String },

    #[error("failed to update install ledger at {path}: {source}")]
    PersistFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create directory {path}: {source}")]
    DirectoryCreateFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
