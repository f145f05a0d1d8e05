use crate::progress::make_download_bar;
use anyhow::{Context, Result};
use reqwest::blocking::Client;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::Duration;
use tracing::info;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Streams `url` into `dest`, returning the number of bytes written.
///
/// Snapshots run to hundreds of megabytes, so the client has no overall
/// timeout, only a connect timeout.
pub fn download_snapshot(url: &str, dest: &Path) -> Result<u64> {
    let client = Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(Duration::from_secs(30))
        .timeout(None::<Duration>)
        .build()
        .context("Failed to build HTTP client")?;

    info!(url, "Downloading snapshot");
    let response = client
        .get(url)
        .send()
        .with_context(|| format!("Failed to request {}", url))?
        .error_for_status()
        .with_context(|| format!("Server rejected request for {}", url))?;

    let pb = make_download_bar(response.content_length());

    let file = File::create(dest)
        .with_context(|| format!("Failed to create snapshot file: {}", dest.display()))?;
    let mut writer = BufWriter::new(file);
    let mut reader = pb.wrap_read(response);

    let bytes = io::copy(&mut reader, &mut writer)
        .with_context(|| format!("Failed to download {}", url))?;
    writer.flush()?;
    pb.finish_and_clear();

    info!(bytes, path = %dest.display(), "Snapshot downloaded");
    Ok(bytes)
}
