use std::fs::File;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;

pub fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .context("Failed to build HTTP client")
}

pub async fn make_http_request(client: &Client, url: &str) -> Result<Vec<u8>> {
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to send HTTP request to {}", url))?;

    if !response.status().is_success() {
        return Err(anyhow::anyhow!(
            "Invalid status code for {}: {}",
            url,
            response.status()
        ));
    }

    let data = response
        .bytes()
        .await
        .context("Failed to read response body")?
        .to_vec();
    Ok(data)
}

pub fn create_output_file(output_path: &Path) -> Result<File> {
    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create parent directory")?;
    }
    let output_file = File::create(output_path)
        .with_context(|| format!("Failed to create {}", output_path.display()))?;
    Ok(output_file)
}
