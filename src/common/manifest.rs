//! The provisioning manifest.
//!
//! A manifest names native packages and web-install records. Web installs use
//! a pipe-delimited record per entry:
//!
//! ```toml
//! packages = ["ripgrep", "jq"]
//!
//! install = [
//!     "https://example.com/tool-1.2.tar.gz | tar.gz",
//!     "https://example.com/app.AppImage | app | bin | appimage",
//! ]
//! ```
//!
//! The two-field form lets placement be inferred from the archive's shape;
//! the four-field form pins an expected top-level name and destination root.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::common::paths;
use crate::webinstall::{InstallRequest, InstallRoots};

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Manifest {
    /// Native package identifiers, installed via the host's package manager.
    #[serde(default)]
    pub packages: Vec<String>,

    /// Web install records, `URL | hint` or `URL | name | root | hint`.
    #[serde(default)]
    pub install: Vec<String>,

    #[serde(default)]
    pub roots: RootOverrides,
}

/// Optional overrides for the two install roots. Tilde-expanded.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct RootOverrides {
    pub software: Option<String>,
    pub bin: Option<String>,
}

impl Manifest {
    /// Load the manifest from `path`, or from the default location.
    /// A missing file at the default location is created with defaults;
    /// a missing explicit path is an error.
    pub fn load(path: Option<&Path>) -> Result<Manifest> {
        match path {
            Some(p) => {
                let s = fs::read_to_string(p)
                    .with_context(|| format!("reading manifest {}", p.display()))?;
                toml::from_str(&s).with_context(|| format!("parsing manifest {}", p.display()))
            }
            None => {
                let p = paths::default_manifest_path()?;
                if !p.exists() {
                    let default = Manifest::default();
                    let s = toml::to_string_pretty(&default)
                        .context("serializing default manifest")?;
                    fs::write(&p, s)
                        .with_context(|| format!("writing default manifest to {}", p.display()))?;
                    return Ok(default);
                }
                let s = fs::read_to_string(&p)
                    .with_context(|| format!("reading manifest {}", p.display()))?;
                toml::from_str(&s).with_context(|| format!("parsing manifest {}", p.display()))
            }
        }
    }

    /// Parse all install records. Fails on the first malformed record with
    /// its position in the manifest.
    pub fn requests(&self) -> Result<Vec<InstallRequest>> {
        let mut out = Vec::with_capacity(self.install.len());
        for (idx, record) in self.install.iter().enumerate() {
            let req: InstallRequest = record
                .parse()
                .with_context(|| format!("install record {} ({:?})", idx + 1, record))?;
            out.push(req);
        }
        Ok(out)
    }

    /// Resolve the install roots, applying manifest overrides over defaults.
    pub fn install_roots(&self) -> Result<InstallRoots> {
        let software = match &self.roots.software {
            Some(s) if !s.trim().is_empty() => expand(s),
            _ => paths::default_software_root()?,
        };
        let bin = match &self.roots.bin {
            Some(s) if !s.trim().is_empty() => expand(s),
            _ => paths::default_bin_root()?,
        };
        if software == bin {
            bail!("software root and bin root must differ ({})", bin.display());
        }
        Ok(InstallRoots { software, bin })
    }
}

fn expand(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw.trim()).into_owned())
}
