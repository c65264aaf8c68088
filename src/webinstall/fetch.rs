//! Downloading remote payloads.

use anyhow::{Context, Result};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::error::InstallError;

/// Downloads a URL into a caller-owned directory.
///
/// The seam exists so the orchestrator can be exercised without a network;
/// production use goes through [`HttpFetcher`].
pub trait Fetcher {
    /// Download `url` into `dest_dir` and return the payload path.
    ///
    /// `dest_dir` is the attempt's private temp workspace, so the payload
    /// path is collision-free and any partial file is removed with the
    /// workspace on every exit path.
    fn fetch(&self, url: &str, dest_dir: &Path) -> Result<PathBuf, InstallError>;
}

/// Blocking HTTP fetcher. Redirects are followed (reqwest default); any
/// transfer error or non-2xx terminal status maps to `DownloadFailed`.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(format!("rigup/{}", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str, dest_dir: &Path) -> Result<PathBuf, InstallError> {
        let failed = |reason: String| InstallError::DownloadFailed {
            url: url.to_string(),
            reason,
        };

        let mut response = self
            .client
            .get(url)
            .send()
            .map_err(|e| failed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(failed(format!("server returned {}", response.status())));
        }

        let dest = dest_dir.join(remote_file_name(url));
        let mut file = File::create(&dest).map_err(|e| failed(e.to_string()))?;
        response
            .copy_to(&mut file)
            .map_err(|e| failed(e.to_string()))?;

        Ok(dest)
    }
}

/// Derive a local file name from a URL: the final path segment with any query
/// or fragment removed. Falls back to `"download"` for URLs with no usable
/// segment, so the payload always has a name to strip suffixes from.
pub fn remote_file_name(url: &str) -> String {
    let without_fragment = url.split('#').next().unwrap_or(url);
    let without_query = without_fragment.split('?').next().unwrap_or(without_fragment);
    let after_scheme = without_query
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(without_query);

    // Skip the host; the last non-empty path segment is the name.
    let segment = after_scheme
        .split('/')
        .skip(1)
        .filter(|s| !s.is_empty())
        .last()
        .unwrap_or("");

    if segment.is_empty() {
        "download".to_string()
    } else {
        segment.to_string()
    }
}
