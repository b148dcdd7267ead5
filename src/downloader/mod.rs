use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use reqwest::Client;
use tokio::fs;

use crate::utils::*;

const INDEX_FILENAME: &str = "index.html";

/// What to do when one image fails to download.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ErrorPolicy {
    /// Stop at the first failure, leaving what was written so far.
    #[default]
    Abort,
    /// Log the failure, skip that image and keep going.
    Continue,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct DownloadReport {
    pub saved: usize,
    pub failed: usize,
}

pub fn image_filename(index: usize) -> String {
    format!("img{}", index)
}

/// Downloads `img_urls` in order into `dest_dir` as `img0`, `img1`, ... and
/// writes an `index.html` showing them.
pub async fn download_images(
    client: &Client,
    img_urls: &[String],
    dest_dir: &Path,
    policy: ErrorPolicy,
) -> Result<DownloadReport> {
    fs::create_dir_all(dest_dir)
        .await
        .with_context(|| format!("Failed to create directory {}", dest_dir.display()))?;

    let mut index_file = create_output_file(&dest_dir.join(INDEX_FILENAME))
        .context("Failed to create index page")?;
    index_file
        .write_all(b"<html><body>")
        .context("Failed to write index page")?;

    let mut report = DownloadReport::default();

    for (i, img_url) in img_urls.iter().enumerate() {
        let filename = image_filename(i);
        log::debug!("Downloading image {} from {}", i, img_url);

        match save_image(client, img_url, &dest_dir.join(&filename)).await {
            Ok(()) => {
                append_img_tag(&mut index_file, &filename)?;
                report.saved += 1;
            }
            Err(err) => match policy {
                ErrorPolicy::Abort => {
                    log::error!("Failed to download image {}: {:#}", i, err);
                    return Err(err.context(format!(
                        "Aborted after {} of {} images",
                        i,
                        img_urls.len()
                    )));
                }
                ErrorPolicy::Continue => {
                    log::warn!("Skipping image {} ({}): {:#}", i, img_url, err);
                    report.failed += 1;
                }
            },
        }
    }

    index_file
        .write_all(b"</body></html>")
        .and_then(|_| index_file.flush())
        .context("Failed to write index page")?;

    log::info!(
        "Saved {} images to {} ({} failed)",
        report.saved,
        dest_dir.display(),
        report.failed
    );

    Ok(report)
}

async fn save_image(client: &Client, img_url: &str, path: &Path) -> Result<()> {
    let data = make_http_request(client, img_url).await?;
    fs::write(path, data)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))
}

fn append_img_tag(index_file: &mut File, filename: &str) -> Result<()> {
    write!(index_file, "<img src={}>", filename).context("Failed to write index page")
}
