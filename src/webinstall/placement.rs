//! Shape-based placement of extracted content.
//!
//! The layout of the final install is derived from nothing but the count and
//! kind of the extracted tree's top-level entries. This keeps the manifest
//! free of per-archive layout knowledge at the cost of being permissive:
//! best-effort correct placement over strict validation.

use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::path::PathBuf;

use super::InstallRoots;
use super::TargetRoot;
use super::error::InstallError;

/// A file or directory directly inside the extraction root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopEntry {
    pub name: String,
    pub is_dir: bool,
}

/// Where extracted content belongs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// One loose file: goes into the binaries root, made executable.
    SingleFile(String),
    /// One directory: moved as-is into the software root under its own name.
    SingleDirectory(String),
    /// Several top-level entries: gathered into a new container directory
    /// with the given base name under the software root.
    MultiItem(String),
}

/// List the top-level entries of an extraction directory, sorted by name so
/// downstream decisions are deterministic.
pub fn top_entries(dir: &Path) -> Result<Vec<TopEntry>, InstallError> {
    let failed = |e: io::Error| InstallError::ExtractionFailed {
        archive: dir.display().to_string(),
        reason: format!("reading extracted entries: {e}"),
    };

    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).map_err(failed)? {
        let entry = entry.map_err(failed)?;
        let kind = entry.file_type().map_err(failed)?;
        entries.push(TopEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            is_dir: kind.is_dir(),
        });
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// Decide placement from the shape of the top-level entries.
///
/// `fallback_base` names the container directory in the multi-item case; it
/// is derived from the archive filename, not from the entries themselves.
pub fn resolve(entries: &[TopEntry], fallback_base: &str) -> Result<Placement, InstallError> {
    match entries {
        [] => Err(InstallError::EmptyArchive),
        [only] if only.is_dir => Ok(Placement::SingleDirectory(only.name.clone())),
        [only] => Ok(Placement::SingleFile(only.name.clone())),
        _ => Ok(Placement::MultiItem(fallback_base.to_string())),
    }
}

/// Strict-mode resolution for records that declared an expected top-level
/// name: an exactly matching entry wins; failing that, a sole top-level
/// directory under any name is accepted (archives are routinely renamed
/// upstream); anything else is a placement failure.
pub fn resolve_strict(entries: &[TopEntry], expected: &str) -> Result<Placement, InstallError> {
    if entries.is_empty() {
        return Err(InstallError::EmptyArchive);
    }

    if let Some(hit) = entries.iter().find(|e| e.name == expected) {
        return Ok(if hit.is_dir {
            Placement::SingleDirectory(hit.name.clone())
        } else {
            Placement::SingleFile(hit.name.clone())
        });
    }

    let dirs: Vec<&TopEntry> = entries.iter().filter(|e| e.is_dir).collect();
    if let [lone] = dirs.as_slice() {
        return Ok(Placement::SingleDirectory(lone.name.clone()));
    }

    Err(InstallError::PlacementFailed {
        name: expected.to_string(),
        reason: format!(
            "expected top-level entry not found among {} entries and no single directory to fall back on",
            entries.len()
        ),
    })
}

/// Carry out a placement decision: move content out of `extracted` into the
/// final roots and apply the executable bit where required.
///
/// Returns the path of the installed artifact. Single files always end
/// executable; directory installs keep whatever modes the archive carried.
pub fn place(
    decision: &Placement,
    extracted: &Path,
    roots: &InstallRoots,
    root_override: Option<TargetRoot>,
) -> Result<PathBuf, InstallError> {
    match decision {
        Placement::SingleFile(name) => {
            let dest_root = match root_override {
                Some(TargetRoot::Software) => &roots.software,
                _ => &roots.bin,
            };
            let dest = dest_root.join(name);
            move_entry(&extracted.join(name), &dest).map_err(|e| placement_failed(name, e))?;
            set_executable(&dest).map_err(|e| placement_failed(name, e))?;
            Ok(dest)
        }
        Placement::SingleDirectory(name) => {
            let dest_root = match root_override {
                Some(TargetRoot::Bin) => &roots.bin,
                _ => &roots.software,
            };
            let dest = dest_root.join(name);
            move_entry(&extracted.join(name), &dest).map_err(|e| placement_failed(name, e))?;
            Ok(dest)
        }
        Placement::MultiItem(base) => {
            let container = roots.software.join(base);
            fs::create_dir_all(&container).map_err(|e| placement_failed(base, e))?;
            for entry in top_entries(extracted)? {
                move_entry(&extracted.join(&entry.name), &container.join(&entry.name))
                    .map_err(|e| placement_failed(&entry.name, e))?;
            }
            Ok(container)
        }
    }
}

fn placement_failed(name: &str, source: io::Error) -> InstallError {
    InstallError::PlacementFailed {
        name: name.to_string(),
        reason: source.to_string(),
    }
}

/// Move a file or directory, falling back to copy-and-delete when the rename
/// crosses filesystems (temp workspaces and home roots often do).
fn move_entry(src: &Path, dest: &Path) -> io::Result<()> {
    match fs::rename(src, dest) {
        Ok(()) => Ok(()),
        Err(_) => {
            copy_recursive(src, dest)?;
            if src.is_dir() {
                fs::remove_dir_all(src)
            } else {
                fs::remove_file(src)
            }
        }
    }
}

fn copy_recursive(src: &Path, dest: &Path) -> io::Result<()> {
    if src.is_file() {
        fs::copy(src, dest)?;
        return Ok(());
    }
    for entry in walkdir::WalkDir::new(src) {
        let entry = entry.map_err(io::Error::other)?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(io::Error::other)?;
        let target = dest.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            // fs::copy carries permission bits along.
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

fn set_executable(path: &Path) -> io::Result<()> {
    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms)
}
