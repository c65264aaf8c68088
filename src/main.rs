use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;

use rigup::common::manifest::Manifest;
use rigup::common::package;
use rigup::common::paths;
use rigup::ui::{self, prelude::*};
use rigup::webinstall::{self, HttpFetcher, Ledger};

/// Declarative provisioning for a single host.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Activate debug output
    #[arg(short, long, global = true)]
    debug: bool,

    /// Emit JSON event lines instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Install everything in the manifest that is not already present
    Apply {
        /// Path to the manifest (defaults to the user config location)
        #[arg(short, long)]
        manifest: Option<PathBuf>,
    },

    /// Report what the manifest would install, without changing anything
    Status {
        /// Path to the manifest (defaults to the user config location)
        #[arg(short, long)]
        manifest: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };
    ui::init(format, true);
    ui::set_debug_mode(cli.debug);

    let result = match cli.command {
        Commands::Apply { manifest } => run_apply(manifest.as_deref()),
        Commands::Status { manifest } => run_status(manifest.as_deref()),
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            emit(
                Level::Error,
                "rigup.error",
                &format!("{} {:#}", char::from(NerdFont::Cross), e),
                None,
            );
            std::process::exit(1);
        }
    }
}

fn run_apply(manifest_path: Option<&std::path::Path>) -> Result<i32> {
    let manifest = Manifest::load(manifest_path)?;
    let roots = manifest.install_roots()?;
    let requests = manifest.requests()?;

    let packages = package::ensure_packages(&manifest.packages);

    let ledger = Ledger::open(paths::ledger_path()?)?;
    let fetcher = HttpFetcher::new()?;
    let web = webinstall::apply_all(&requests, &roots, &ledger, &fetcher);

    let failed = packages.failed + web.failed;
    emit(
        Level::Info,
        "rigup.apply.summary",
        &format!(
            "{} Packages: {} present, {} installed, {} failed. Web installs: {} installed, {} skipped, {} failed.",
            char::from(NerdFont::Info),
            packages.present,
            packages.installed,
            packages.failed,
            web.installed,
            web.skipped,
            web.failed
        ),
        Some(json!({
            "packages": {
                "present": packages.present,
                "installed": packages.installed,
                "failed": packages.failed,
            },
            "web": {
                "installed": web.installed,
                "skipped": web.skipped,
                "failed": web.failed,
            },
        })),
    );

    Ok(if failed > 0 { 1 } else { 0 })
}

fn run_status(manifest_path: Option<&std::path::Path>) -> Result<i32> {
    let manifest = Manifest::load(manifest_path)?;
    let requests = manifest.requests()?;
    let ledger = Ledger::open(paths::ledger_path()?)?;

    if let Some(manager) = package::NativeManager::detect() {
        for pkg in &manifest.packages {
            let (icon, state) = if manager.is_installed(pkg) {
                (NerdFont::Check, "installed")
            } else {
                (NerdFont::Cross, "missing")
            };
            emit(
                Level::Info,
                "rigup.status.package",
                &format!("{} {} ({})", char::from(icon), pkg, state),
                Some(json!({ "package": pkg, "state": state })),
            );
        }
    } else if !manifest.packages.is_empty() {
        emit(
            Level::Warn,
            "rigup.status.no_manager",
            &format!(
                "{} No supported native package manager found",
                char::from(NerdFont::Warning)
            ),
            None,
        );
    }

    for request in &requests {
        let (icon, state) = if ledger.contains(&request.url)? {
            (NerdFont::Check, "installed")
        } else {
            (NerdFont::Globe, "pending")
        };
        emit(
            Level::Info,
            "rigup.status.web",
            &format!("{} {} ({})", char::from(icon), request.url, state),
            Some(json!({ "url": request.url, "state": state })),
        );
    }

    Ok(0)
}
