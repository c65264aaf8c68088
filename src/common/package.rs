//! Native package manager glue.
//!
//! rigup does not resolve dependencies or versions; it asks the host's native
//! package manager "is X installed" and "install X" and nothing more.

use anyhow::{Context, Result};
use duct::cmd;
use serde_json::json;

use crate::ui::prelude::*;

/// The host's native package manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeManager {
    Pacman,
    Apt,
    Dnf,
    Zypper,
}

impl NativeManager {
    /// Detect the native manager by binary availability, in a fixed order so
    /// hosts with several managers on PATH get a deterministic answer.
    pub fn detect() -> Option<Self> {
        const CANDIDATES: &[(&str, NativeManager)] = &[
            ("pacman", NativeManager::Pacman),
            ("apt-get", NativeManager::Apt),
            ("dnf", NativeManager::Dnf),
            ("zypper", NativeManager::Zypper),
        ];
        CANDIDATES
            .iter()
            .find(|(bin, _)| which::which(bin).is_ok())
            .map(|(_, manager)| *manager)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Pacman => "pacman",
            Self::Apt => "apt",
            Self::Dnf => "dnf",
            Self::Zypper => "zypper",
        }
    }

    /// Command and base arguments used to install packages.
    /// Installs into root-owned locations, so every manager goes through sudo.
    pub fn install_command(&self) -> (&'static str, &'static [&'static str]) {
        match self {
            Self::Pacman => ("sudo", &["pacman", "-S", "--noconfirm", "--needed"]),
            Self::Apt => ("sudo", &["apt-get", "install", "-y"]),
            Self::Dnf => ("sudo", &["dnf", "install", "-y"]),
            Self::Zypper => ("sudo", &["zypper", "install", "-y"]),
        }
    }

    /// Query command used for the presence check. Exit status is the answer.
    pub fn query_command(&self) -> (&'static str, &'static [&'static str]) {
        match self {
            Self::Pacman => ("pacman", &["-Q"]),
            Self::Apt => ("dpkg", &["-s"]),
            Self::Dnf => ("rpm", &["-q"]),
            Self::Zypper => ("rpm", &["-q"]),
        }
    }

    /// Check whether a single package is already installed.
    pub fn is_installed(&self, package: &str) -> bool {
        let (program, base_args) = self.query_command();
        let mut args: Vec<&str> = base_args.to_vec();
        args.push(package);

        cmd(program, &args)
            .stdout_null()
            .stderr_null()
            .run()
            .is_ok()
    }

    /// Install packages in one batch invocation.
    pub fn install(&self, packages: &[&str]) -> Result<()> {
        if packages.is_empty() {
            return Ok(());
        }
        let (program, base_args) = self.install_command();
        let mut args: Vec<&str> = base_args.to_vec();
        args.extend(packages);

        cmd(program, &args)
            .run()
            .with_context(|| format!("Failed to install packages with {}", self.display_name()))?;
        Ok(())
    }
}

impl std::fmt::Display for NativeManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Outcome of the native package pass.
#[derive(Debug, Default, Clone, Copy)]
pub struct PackageSummary {
    pub present: usize,
    pub installed: usize,
    pub failed: usize,
}

/// Ensure every listed package is installed. Already-present packages are
/// skipped; the rest are installed in one batch. A failed batch is reported
/// and counted, never fatal for the overall run.
pub fn ensure_packages(packages: &[String]) -> PackageSummary {
    let mut summary = PackageSummary::default();
    if packages.is_empty() {
        return summary;
    }

    let Some(manager) = NativeManager::detect() else {
        emit(
            Level::Warn,
            "package.no_manager",
            &format!(
                "{} No supported native package manager found; skipping {} package(s)",
                char::from(NerdFont::Warning),
                packages.len()
            ),
            None,
        );
        summary.failed = packages.len();
        return summary;
    };

    let mut missing: Vec<&str> = Vec::new();
    for package in packages {
        if manager.is_installed(package) {
            emit(
                Level::Debug,
                "package.present",
                &format!("{} {} already installed", char::from(NerdFont::Check), package),
                None,
            );
            summary.present += 1;
        } else {
            missing.push(package.as_str());
        }
    }

    if missing.is_empty() {
        return summary;
    }

    emit(
        Level::Info,
        "package.installing",
        &format!(
            "{} Installing {} package(s) with {}",
            char::from(NerdFont::Package),
            missing.len(),
            manager
        ),
        Some(json!({ "packages": missing, "manager": manager.display_name() })),
    );

    match manager.install(&missing) {
        Ok(()) => summary.installed = missing.len(),
        Err(e) => {
            emit(
                Level::Error,
                "package.install_failed",
                &format!("{} Package install failed: {:#}", char::from(NerdFont::Cross), e),
                None,
            );
            summary.failed = missing.len();
        }
    }

    summary
}
