//! Snapshot loading
//!
//! Turns one `archive/<snapshot>/media` directory into a [`VideoRecord`].
//! A cached `metadata` file is used when present; otherwise everything is
//! extracted from the sidecar JSON and the video file, and the cache is
//! written for the next run.

use crate::core::comments::sort_comments;
use crate::core::downloader::{build_client, download_if_missing};
use crate::core::filter::RecordFilter;
use crate::core::probe::formatted_duration;
use crate::core::sidecar::parse_sidecar;
use crate::core::stats::RunStats;
use crate::error::{ArchiveError, Result};
use crate::storage::metadata::{read_metadata, write_metadata};
use crate::types::VideoRecord;
use crate::utils::hash::calculate_hash;
use reqwest::Client;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Container suffixes tried after the one declared in the sidecar
const VIDEO_SUFFIXES: [&str; 3] = [".mp4", ".mkv", ".webm"];

const PARTIAL_DOWNLOAD_SUFFIX: &str = ".part";

/// Loads snapshots; cheap to share between tasks
#[derive(Debug, Clone)]
pub struct ArchiveLoader {
    client: Client,
    ffprobe: String,
}

impl ArchiveLoader {
    pub fn new(ffprobe: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            ffprobe: ffprobe.into(),
        })
    }

    /// Load the record of one snapshot.
    ///
    /// Returns `Ok(None)` when `filter` asks for a different video id. Snapshots without a playable video file still produce
    /// a record; their id is added to the missing list in `stats`.
    pub async fn load(
        &self,
        media_dir: &Path,
        force_regenerate: bool,
        filter: &RecordFilter,
        stats: &RunStats,
    ) -> Result<Option<VideoRecord>> {
        if !force_regenerate {
            if let Some(record) = read_metadata(media_dir).await? {
                if !filter.matches_video_id(&record.id) {
                    return Ok(None);
                }
                if !record.has_video_file() {
                    stats.add_missing_video(&record.id);
                }
                return Ok(Some(record));
            }
        }

        self.extract(media_dir, filter, stats).await
    }

    async fn extract(
        &self,
        media_dir: &Path,
        filter: &RecordFilter,
        stats: &RunStats,
    ) -> Result<Option<VideoRecord>> {
        let files = list_files(media_dir).await?;

        let data = match find_by_suffix(&files, ".json") {
            Some(path) => {
                let text = fs::read_to_string(path).await?;
                serde_json::from_str(&text).map_err(|e| ArchiveError::parse(path, e.to_string()))?
            }
            None => Value::Object(Default::default()),
        };
        let info = parse_sidecar(&data);

        if !filter.matches_video_id(&info.id) {
            return Ok(None);
        }

        let mut record = VideoRecord {
            id: info.id,
            snapshot_id: snapshot_id(media_dir),
            title: info.title,
            channel_name: info.channel_name,
            channel_url: info.channel_url,
            channel_id: info.channel_id,
            upload_date: info.upload_date,
            upload_timestamp: info.timestamp,
            thumbnail_url: info.thumbnail,
            mini_thumbnail_url: info.mini_thumbnail,
            file_extension: info.ext,
            ..Default::default()
        };

        if !record.thumbnail_url.is_empty() {
            let thumbnail = media_dir.join(format!("thumbnail.{}", record.thumbnail_format()));
            download_if_missing(&self.client, &record.thumbnail_url, &thumbnail).await;

            let mini = media_dir.join(format!("mini-thumbnail.{}", record.mini_thumbnail_format()));
            download_if_missing(&self.client, &record.mini_thumbnail_url, &mini).await;
        }

        match find_video_file(&files, &record.file_extension) {
            Some(video) => {
                record.video_file_name = file_name(video).to_string();
                record.video_file_size_bytes = fs::metadata(video).await?.len();
                record.video_file_hash = calculate_hash(video).await?;
                record.duration_text = formatted_duration(&self.ffprobe, video).await;
            }
            None => {
                tracing::warn!(id = %record.id, snapshot = %record.snapshot_id, "snapshot has no video file");
            }
        }

        if let Some(path) = find_by_suffix(&files, ".description") {
            record.description = fs::read_to_string(path).await.unwrap_or_else(|e| {
                tracing::warn!(file = %path.display(), error = %e, "could not read description");
                String::new()
            });
        }

        record.comments = sort_comments(&info.comments)?;

        if let Err(e) = write_metadata(media_dir, &record).await {
            tracing::warn!(dir = %media_dir.display(), error = %e, "could not write metadata cache");
        }

        if !record.has_video_file() {
            stats.add_missing_video(&record.id);
        }
        Ok(Some(record))
    }
}

/// Regular files of a directory, sorted by name
async fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir).await?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|n| n.to_str()).unwrap_or("")
}

fn find_by_suffix<'a>(files: &'a [PathBuf], suffix: &str) -> Option<&'a PathBuf> {
    files.iter().find(|f| file_name(f).ends_with(suffix))
}

/// The declared extension first, then mp4, mkv, webm; a `.part` file counts as absent
fn find_video_file<'a>(files: &'a [PathBuf], declared_ext: &str) -> Option<&'a PathBuf> {
    let declared = (!declared_ext.is_empty()).then(|| format!(".{}", declared_ext));

    let found = declared
        .iter()
        .map(String::as_str)
        .chain(VIDEO_SUFFIXES)
        .find_map(|suffix| find_by_suffix(files, suffix))?;

    if file_name(found).ends_with(PARTIAL_DOWNLOAD_SUFFIX) {
        return None;
    }
    Some(found)
}

/// Name of the snapshot directory that contains `media_dir`
fn snapshot_id(media_dir: &Path) -> String {
    media_dir
        .parent()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}
