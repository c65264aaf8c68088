use anyhow::{Context, Result};
use std::path::PathBuf;

/// Centralized path management for rigup.
/// Single source of truth for install roots and persisted state.

/// Default root for directory-shaped installs (opt-style layout).
pub fn default_software_root() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Unable to determine home directory")?;
    Ok(home.join(".local").join("opt"))
}

/// Default root for single-executable installs.
pub fn default_bin_root() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Unable to determine home directory")?;
    Ok(home.join(".local").join("bin"))
}

/// Get the rigup state directory, creating it if needed.
pub fn state_dir() -> Result<PathBuf> {
    let dir = dirs::data_dir()
        .context("Unable to determine user data directory")?
        .join("rigup");
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("creating state directory at {}", dir.display()))?;
    Ok(dir)
}

/// Path of the installed-set ledger file.
pub fn ledger_path() -> Result<PathBuf> {
    Ok(state_dir()?.join("installed.list"))
}

/// Default manifest location, directory created on demand.
pub fn default_manifest_path() -> Result<PathBuf> {
    let dir = dirs::config_dir()
        .context("Unable to determine user config directory")?
        .join("rigup");
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("creating config directory at {}", dir.display()))?;
    Ok(dir.join("rigup.toml"))
}
