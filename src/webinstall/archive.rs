//! Archive type classification and extraction.
//!
//! Extraction is pure Rust (flate2/xz2/tar/zip); no subprocess spawning, so a
//! corrupt archive surfaces as a typed error instead of a tar exit status.

use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use xz2::read::XzDecoder;

use super::error::InstallError;

/// The closed set of payload formats rigup knows how to install.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveType {
    TarGz,
    TarXz,
    Zip,
    /// A directly runnable payload (AppImage or plain binary); no extraction.
    RawExecutable,
}

/// Filename suffixes per type, longest first so `.tar.gz` wins over `.gz`-ish
/// lookalikes when stripping.
const SUFFIXES: &[(ArchiveType, &str)] = &[
    (ArchiveType::TarGz, ".tar.gz"),
    (ArchiveType::TarGz, ".tgz"),
    (ArchiveType::TarXz, ".tar.xz"),
    (ArchiveType::TarXz, ".txz"),
    (ArchiveType::Zip, ".zip"),
    (ArchiveType::RawExecutable, ".appimage"),
];

impl ArchiveType {
    /// Map a manifest type hint to an archive type.
    ///
    /// Accepts the canonical spellings plus common aliases; anything else is
    /// a hard [`InstallError::UnsupportedType`], never a guess. A hint that
    /// looks like a filename is matched by suffix.
    pub fn from_hint(hint: &str) -> Result<Self, InstallError> {
        let normalized = hint.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "tar.gz" | "targz" | "tgz" => Ok(Self::TarGz),
            "tar.xz" | "tarxz" | "txz" => Ok(Self::TarXz),
            "zip" => Ok(Self::Zip),
            "appimage" | "raw" | "bin" => Ok(Self::RawExecutable),
            _ => Self::from_filename(&normalized).ok_or(InstallError::UnsupportedType {
                hint: hint.trim().to_string(),
            }),
        }
    }

    /// Classify by filename suffix alone.
    pub fn from_filename(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        SUFFIXES
            .iter()
            .find(|(_, suffix)| lower.ends_with(suffix) && lower.len() > suffix.len())
            .map(|(kind, _)| *kind)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::TarGz => "tar.gz",
            Self::TarXz => "tar.xz",
            Self::Zip => "zip",
            Self::RawExecutable => "raw executable",
        }
    }
}

impl std::fmt::Display for ArchiveType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Strip a known archive suffix from a filename, for deriving the name of a
/// multi-item container directory (`foo-1.2.tar.gz` -> `foo-1.2`).
pub fn strip_archive_suffix(name: &str) -> &str {
    let lower = name.to_ascii_lowercase();
    for (_, suffix) in SUFFIXES {
        if lower.ends_with(suffix) && lower.len() > suffix.len() {
            return &name[..name.len() - suffix.len()];
        }
    }
    name
}

/// Unpack `payload` into a freshly created directory under `work`.
///
/// The returned directory is exclusively owned by the current install attempt
/// (it lives inside the attempt's temp workspace) and holds the archive's
/// top-level entries. Raw executables skip extraction: the payload itself is
/// moved in as the sole entry so placement sees an ordinary one-file shape.
pub fn extract(
    payload: &Path,
    kind: ArchiveType,
    work: &Path,
) -> Result<PathBuf, InstallError> {
    let dest = work.join("extracted");
    fs::create_dir(&dest).map_err(|source| InstallError::DirectoryCreateFailed {
        path: dest.clone(),
        source,
    })?;

    let failed = |reason: String| InstallError::ExtractionFailed {
        archive: payload.display().to_string(),
        reason,
    };

    match kind {
        ArchiveType::TarGz => {
            let file = File::open(payload).map_err(|e| failed(e.to_string()))?;
            let mut archive = tar::Archive::new(GzDecoder::new(file));
            archive.unpack(&dest).map_err(|e| failed(e.to_string()))?;
        }
        ArchiveType::TarXz => {
            let file = File::open(payload).map_err(|e| failed(e.to_string()))?;
            let mut archive = tar::Archive::new(XzDecoder::new(file));
            archive.unpack(&dest).map_err(|e| failed(e.to_string()))?;
        }
        ArchiveType::Zip => {
            let file = File::open(payload).map_err(|e| failed(e.to_string()))?;
            let mut archive = zip::ZipArchive::new(file).map_err(|e| failed(e.to_string()))?;
            archive.extract(&dest).map_err(|e| failed(e.to_string()))?;
        }
        ArchiveType::RawExecutable => {
            let name = payload
                .file_name()
                .ok_or_else(|| failed("payload has no file name".to_string()))?;
            fs::rename(payload, dest.join(name)).map_err(|e| failed(e.to_string()))?;
        }
    }

    Ok(dest)
}
