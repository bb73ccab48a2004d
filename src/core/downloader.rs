//! Downloader module - fetches thumbnails referenced by the sidecar JSON

use crate::error::Result;
use reqwest::Client;
use std::path::Path;
use tokio::fs;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Shared HTTP client for all loader tasks
pub fn build_client() -> Result<Client> {
    Ok(Client::builder().user_agent(USER_AGENT).build()?)
}

/// Download `url` into `target`. Nothing is written unless the whole body arrived.
pub async fn download_file(client: &Client, url: &str, target: &Path) -> Result<()> {
    let response = client.get(url).send().await?.error_for_status()?;
    let bytes = response.bytes().await?;
    fs::write(target, &bytes).await?;
    Ok(())
}

/// Download `url` unless `target` already exists. Failures are logged, not returned.
pub async fn download_if_missing(client: &Client, url: &str, target: &Path) {
    if url.is_empty() || target.exists() {
        return;
    }

    match download_file(client, url, target).await {
        Ok(()) => tracing::debug!(url, file = %target.display(), "downloaded"),
        Err(e) => tracing::warn!(url, file = %target.display(), error = %e, "download failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_existing_file_is_not_downloaded_again() {
        let dir = tempfile::TempDir::new().unwrap();
        let target = dir.path().join("thumbnail.jpg");
        std::fs::write(&target, b"cached").unwrap();

        let client = build_client().unwrap();
        // an unroutable URL would fail if a request were made
        download_if_missing(&client, "http://127.0.0.1:9/thumb.jpg", &target).await;

        assert_eq!(std::fs::read(&target).unwrap(), b"cached");
    }

    #[tokio::test]
    async fn test_failed_download_leaves_no_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let target = dir.path().join("mini-thumbnail.jpg");

        let client = build_client().unwrap();
        download_if_missing(&client, "http://127.0.0.1:9/thumb.jpg", &target).await;

        assert!(!target.exists());
    }
}
