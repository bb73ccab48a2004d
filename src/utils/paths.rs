//! Path utilities for yt-archive
//!
//! The archive layout is fixed by ArchiveBox:
//! `<root>/archive/<snapshot>/media/`. Generated pages live next to it.

use crate::error::Result;
use std::env;
use std::path::{Path, PathBuf};
use tokio::fs;

const APP_NAME: &str = "yt-archive";

/// Name of the per-snapshot metadata cache file
pub const METADATA_FILE_NAME: &str = "metadata";

const CHANNEL_URL_MARKER: &str = "/channel/";

/// Get config directory path
/// Respects XDG_CONFIG_HOME, defaults to ~/.config/yt-archive
pub fn get_config_dir() -> PathBuf {
    let base = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::config_dir().unwrap_or_else(|| {
                PathBuf::from(env::var("HOME").unwrap_or_default()).join(".config")
            })
        });

    base.join(APP_NAME)
}

/// Get config file path
pub fn get_config_path() -> PathBuf {
    get_config_dir().join("config.json")
}

/// Input and output locations below the archive root
#[derive(Debug, Clone)]
pub struct ArchivePaths {
    root: PathBuf,
}

impl ArchivePaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding one subdirectory per snapshot
    pub fn archive_dir(&self) -> PathBuf {
        self.root.join("archive")
    }

    pub fn media_dir(&self, snapshot_id: &str) -> PathBuf {
        self.archive_dir().join(snapshot_id).join("media")
    }

    pub fn videos_dir(&self) -> PathBuf {
        self.root.join("videos")
    }

    pub fn channels_dir(&self) -> PathBuf {
        self.root.join("channels")
    }

    /// Master index listing every channel
    pub fn index_file(&self) -> PathBuf {
        self.root.join("videos.html")
    }

    pub fn video_page(&self, video_id: &str) -> PathBuf {
        self.videos_dir().join(format!("{}.html", video_id))
    }

    pub fn channel_page(&self, stem: &str) -> PathBuf {
        self.channels_dir().join(format!("{}.html", stem))
    }
}

/// File stem of a channel page: the id after "/channel/" in the channel URL,
/// or the display name when the URL has no such segment.
///
/// The result is a single file name: path separators and characters that are
/// invalid in file names become '_'.
pub fn channel_file_stem(channel_url: &str, channel_name: &str) -> String {
    let raw = match channel_url.find(CHANNEL_URL_MARKER) {
        Some(pos) => &channel_url[pos + CHANNEL_URL_MARKER.len()..],
        None => channel_name,
    };

    let stem: String = raw
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    match stem.as_str() {
        "" | "." | ".." => stem.replace('.', "_") + "_",
        _ => stem,
    }
}

/// Ensure a directory exists
pub async fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).await?;
    Ok(())
}

/// Ensure the output directories exist
pub async fn ensure_output_dirs(paths: &ArchivePaths) -> Result<()> {
    ensure_dir(&paths.videos_dir()).await?;
    ensure_dir(&paths.channels_dir()).await?;
    Ok(())
}
