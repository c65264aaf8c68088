//! Shared helpers for the web install integration tests: a filesystem
//! sandbox, fixture archive builders, and fetchers that never touch the
//! network.

use anyhow::Result;
use flate2::Compression;
use flate2::write::GzEncoder;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;
use xz2::write::XzEncoder;

use rigup::webinstall::{Fetcher, InstallError, InstallRoots, Ledger};

/// A self-contained install environment: both roots and a ledger inside one
/// temp directory.
pub struct Sandbox {
    pub tmp: TempDir,
    pub roots: InstallRoots,
    pub ledger: Ledger,
}

impl Sandbox {
    pub fn new() -> Result<Self> {
        let tmp = tempfile::tempdir()?;
        let roots = InstallRoots {
            software: tmp.path().join("opt"),
            bin: tmp.path().join("bin"),
        };
        let ledger = Ledger::open(tmp.path().join("state").join("installed.list"))?;
        Ok(Self { tmp, roots, ledger })
    }

    /// Directory for staging fixture trees and archives.
    pub fn fixtures(&self) -> PathBuf {
        let dir = self.tmp.path().join("fixtures");
        fs::create_dir_all(&dir).expect("creating fixtures dir");
        dir
    }
}

/// Materialize a staging tree from `(relative path, contents)` pairs. A pair
/// with empty contents and a trailing slash in the path creates a directory.
pub fn stage_tree(root: &Path, entries: &[(&str, &str)]) -> Result<()> {
    for (rel, contents) in entries {
        if let Some(dir) = rel.strip_suffix('/') {
            fs::create_dir_all(root.join(dir))?;
            continue;
        }
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)?;
    }
    Ok(())
}

fn append_dir_to_tar<W: std::io::Write>(
    builder: &mut tar::Builder<W>,
    src: &Path,
) -> Result<()> {
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let name = PathBuf::from(entry.file_name());
        if entry.path().is_dir() {
            builder.append_dir_all(&name, entry.path())?;
        } else {
            builder.append_path_with_name(entry.path(), &name)?;
        }
    }
    Ok(())
}

/// Build a `.tar.gz` archive from the top-level entries of `src`. An empty
/// `src` yields a valid archive with zero entries.
pub fn tar_gz_from_dir(archive: &Path, src: &Path) -> Result<()> {
    let encoder = GzEncoder::new(File::create(archive)?, Compression::default());
    let mut builder = tar::Builder::new(encoder);
    append_dir_to_tar(&mut builder, src)?;
    builder.into_inner()?.finish()?;
    Ok(())
}

/// Build a `.tar.xz` archive from the top-level entries of `src`.
pub fn tar_xz_from_dir(archive: &Path, src: &Path) -> Result<()> {
    let encoder = XzEncoder::new(File::create(archive)?, 6);
    let mut builder = tar::Builder::new(encoder);
    append_dir_to_tar(&mut builder, src)?;
    builder.into_inner()?.finish()?;
    Ok(())
}

/// Build a `.zip` archive from the contents of `src`.
pub fn zip_from_dir(archive: &Path, src: &Path) -> Result<()> {
    let mut writer = zip::ZipWriter::new(File::create(archive)?);
    add_dir_to_zip(&mut writer, src, Path::new(""))?;
    writer.finish()?;
    Ok(())
}

fn add_dir_to_zip(
    writer: &mut zip::ZipWriter<File>,
    dir: &Path,
    prefix: &Path,
) -> Result<()> {
    let options = zip::write::SimpleFileOptions::default();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let rel = prefix.join(entry.file_name());
        let rel_str = rel.to_string_lossy().into_owned();
        if entry.path().is_dir() {
            writer.add_directory(format!("{rel_str}/"), options)?;
            add_dir_to_zip(writer, &entry.path(), &rel)?;
        } else {
            writer.start_file(rel_str, options)?;
            let mut f = File::open(entry.path())?;
            std::io::copy(&mut f, writer)?;
        }
    }
    Ok(())
}

/// Serves local fixture files keyed by URL; counts every fetch call so tests
/// can assert that ledger hits and classifier failures never reach the
/// "network".
pub struct StubFetcher {
    payloads: BTreeMap<String, PathBuf>,
    calls: AtomicUsize,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self {
            payloads: BTreeMap::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn serve(mut self, url: &str, payload: &Path) -> Self {
        self.payloads.insert(url.to_string(), payload.to_path_buf());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Fetcher for StubFetcher {
    fn fetch(&self, url: &str, dest_dir: &Path) -> Result<PathBuf, InstallError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let failed = |reason: String| InstallError::DownloadFailed {
            url: url.to_string(),
            reason,
        };

        let payload = self
            .payloads
            .get(url)
            .ok_or_else(|| failed("connection refused".to_string()))?;
        let name = payload
            .file_name()
            .ok_or_else(|| failed("fixture has no file name".to_string()))?;
        let dest = dest_dir.join(name);
        fs::copy(payload, &dest).map_err(|e| failed(e.to_string()))?;
        Ok(dest)
    }
}

/// Recursive listing of `(relative path, is_dir, contents hash-ish)` used for
/// structural equality between runs.
pub fn snapshot(root: &Path) -> Vec<(String, bool, Vec<u8>)> {
    let mut out = Vec::new();
    snapshot_into(root, root, &mut out);
    out.sort();
    out
}

fn snapshot_into(root: &Path, dir: &Path, out: &mut Vec<(String, bool, Vec<u8>)>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        let rel = path
            .strip_prefix(root)
            .expect("entry under root")
            .to_string_lossy()
            .into_owned();
        if path.is_dir() {
            out.push((rel, true, Vec::new()));
            snapshot_into(root, &path, out);
        } else {
            let contents = fs::read(&path).unwrap_or_default();
            out.push((rel, false, contents));
        }
    }
}
