//! Per-snapshot metadata cache
//!
//! Each snapshot's media directory gets a flat `key=value` file named
//! `metadata` holding everything the full extraction produced, so later runs
//! skip hashing, probing and thumbnail downloads.
//!
//! Files written by this module carry a `cacheVersion` key and escape
//! backslashes and line breaks in values. Files without the key are read
//! verbatim, one value per line.

use crate::error::{ArchiveError, Result};
use crate::types::{Comment, VideoRecord};
use crate::utils::paths::METADATA_FILE_NAME;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tokio::fs;

/// Bumped whenever the set or meaning of keys changes
pub const CACHE_VERSION: u32 = 1;

const VERSION_KEY: &str = "cacheVersion";

const STAGING_FILE_NAME: &str = "metadata.tmp";

/// Location of the cache file inside a media directory
pub fn metadata_path(media_dir: &Path) -> PathBuf {
    media_dir.join(METADATA_FILE_NAME)
}

/// Read the cached record of a snapshot.
///
/// Returns `None` when there is no cache file or when it was written with a
/// different `cacheVersion`; both mean the snapshot must be extracted again.
pub async fn read_metadata(media_dir: &Path) -> Result<Option<VideoRecord>> {
    let path = metadata_path(media_dir);
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(&path).await?;
    decode(&content, &path)
}

/// Persist a freshly extracted record.
///
/// The file is written next to the cache and renamed over it, so an
/// interrupted run leaves either the old cache or the new one.
pub async fn write_metadata(media_dir: &Path, record: &VideoRecord) -> Result<()> {
    let content = encode(record)?;
    let staging = media_dir.join(STAGING_FILE_NAME);
    fs::write(&staging, content).await?;
    fs::rename(&staging, metadata_path(media_dir)).await?;
    Ok(())
}

/// Serialize a record into `key=value` lines
pub fn encode(record: &VideoRecord) -> Result<String> {
    let comments = serde_json::to_string(&record.comments)?;
    let size = record.video_file_size_bytes.to_string();
    let timestamp = record.upload_timestamp.to_string();
    let number = record.display_number.to_string();
    let version = CACHE_VERSION.to_string();

    let mut entries: Vec<(&str, &str)> = vec![
        (VERSION_KEY, version.as_str()),
        ("id", record.id.as_str()),
        ("snapshot", record.snapshot_id.as_str()),
        ("title", record.title.as_str()),
        ("videoFileName", record.video_file_name.as_str()),
        ("videoFileSizeInBytes", size.as_str()),
        ("videoFileSha512HashSum", record.video_file_hash.as_str()),
        ("videoDuration", record.duration_text.as_str()),
        ("channelName", record.channel_name.as_str()),
        ("channelUrl", record.channel_url.as_str()),
        ("channelId", record.channel_id.as_str()),
        ("uploadDate", record.upload_date.as_str()),
        ("timestamp", timestamp.as_str()),
        ("description", record.description.as_str()),
        ("thumbnail", record.thumbnail_url.as_str()),
        ("miniThumbnail", record.mini_thumbnail_url.as_str()),
        ("comments", comments.as_str()),
    ];
    if !record.previous_id.is_empty() {
        entries.push(("previousVideoId", record.previous_id.as_str()));
    }
    if !record.next_id.is_empty() {
        entries.push(("nextVideoId", record.next_id.as_str()));
    }
    entries.push(("ext", record.file_extension.as_str()));
    entries.push(("number", number.as_str()));

    let content: String = entries
        .iter()
        .map(|(key, value)| format!("{}={}\n", key, escape_value(value)))
        .collect();

    Ok(content)
}

/// Decode the content of a cache file; `path` is only used in errors
pub fn decode(content: &str, path: &Path) -> Result<Option<VideoRecord>> {
    let mut props: HashMap<&str, &str> = HashMap::new();
    for line in content.lines() {
        if let Some((key, value)) = line.split_once('=') {
            props.insert(key, value);
        }
    }

    let props = Properties {
        path,
        escaped: props.contains_key(VERSION_KEY),
        props,
    };

    if props.escaped {
        let version: u32 = props.number(VERSION_KEY)?;
        if version != CACHE_VERSION {
            tracing::debug!(
                path = %path.display(),
                found = version,
                expected = CACHE_VERSION,
                "ignoring metadata written by another cache version"
            );
            return Ok(None);
        }
    }

    let comments_json = props.text("comments");
    let comments: Vec<Comment> = if comments_json.is_empty() {
        Vec::new()
    } else {
        serde_json::from_str(&comments_json).map_err(|e| {
            ArchiveError::parse(path, format!("comments are not valid JSON: {}", e))
        })?
    };

    Ok(Some(VideoRecord {
        id: props.text("id"),
        snapshot_id: props.text("snapshot"),
        title: props.text("title"),
        video_file_name: props.text("videoFileName"),
        video_file_size_bytes: props.number("videoFileSizeInBytes")?,
        video_file_hash: props.text("videoFileSha512HashSum"),
        duration_text: props.text("videoDuration"),
        channel_name: props.text("channelName"),
        channel_url: props.text("channelUrl"),
        channel_id: props.text("channelId"),
        upload_date: props.text("uploadDate"),
        upload_timestamp: props.number("timestamp")?,
        description: props.text("description"),
        thumbnail_url: props.text("thumbnail"),
        mini_thumbnail_url: props.text("miniThumbnail"),
        comments,
        previous_id: props.text("previousVideoId"),
        next_id: props.text("nextVideoId"),
        file_extension: props.text("ext"),
        display_number: props.number("number")?,
    }))
}

/// Raw key lookup with per-field defaulting
struct Properties<'a> {
    path: &'a Path,
    escaped: bool,
    props: HashMap<&'a str, &'a str>,
}

impl Properties<'_> {
    /// Text field, empty when absent
    fn text(&self, key: &str) -> String {
        match self.props.get(key) {
            Some(value) if self.escaped => unescape_value(value),
            Some(value) => (*value).to_string(),
            None => String::new(),
        }
    }

    /// Numeric field, required
    fn number<T: FromStr>(&self, key: &str) -> Result<T>
    where
        T::Err: std::fmt::Display,
    {
        let raw = self
            .props
            .get(key)
            .ok_or_else(|| ArchiveError::parse(self.path, format!("missing key {}", key)))?;

        raw.trim().parse().map_err(|e| {
            ArchiveError::parse(self.path, format!("invalid value for {}: {:?} ({})", key, raw, e))
        })
    }
}

fn escape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out
}

fn unescape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> VideoRecord {
        VideoRecord {
            id: "5rGd2VQz3mo".into(),
            snapshot_id: "1700000000.123".into(),
            title: "Speedy Blupi = fun".into(),
            video_file_name: "Speedy Blupi [5rGd2VQz3mo].mp4".into(),
            video_file_size_bytes: 1_048_576,
            video_file_hash: "ab12".into(),
            duration_text: "00:03:15.40".into(),
            channel_name: "Blupi".into(),
            channel_url: "https://www.youtube.com/channel/UCblupi".into(),
            channel_id: "UCblupi".into(),
            upload_date: "20090412".into(),
            upload_timestamp: 1_239_500_000,
            description: "line one\nline two with C:\\path\r\n".into(),
            thumbnail_url: "https://i.ytimg.com/vi/5rGd2VQz3mo/maxresdefault.jpg".into(),
            mini_thumbnail_url: "https://i.ytimg.com/vi/5rGd2VQz3mo/hqdefault.jpg".into(),
            comments: vec![Comment {
                id: "c1".into(),
                parent_id: "root".into(),
                text: "first\nsecond".into(),
                author: "@someone".into(),
                timestamp_seconds: 1_239_600_000,
            }],
            file_extension: "mp4".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_encode_decode_keeps_every_field() {
        let record = sample_record();
        let content = encode(&record).unwrap();
        assert_eq!(content.lines().count(), 19);

        let decoded = decode(&content, Path::new("metadata")).unwrap().unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_links_written_only_when_set() {
        let mut record = sample_record();
        assert!(!encode(&record).unwrap().contains("previousVideoId"));

        record.previous_id = "prev".into();
        record.next_id = "next".into();
        let content = encode(&record).unwrap();
        assert!(content.contains("previousVideoId=prev\n"));
        assert!(content.contains("nextVideoId=next\n"));
    }

    #[test]
    fn test_legacy_file_is_read_verbatim() {
        let content = "id=abc\nsnapshot=1\ntitle=a\\b\nvideoFileSizeInBytes=0\n\
                       timestamp=5\nnumber=0\ncomments=[]\nvideoDuration=00:00:00.00\n";
        let record = decode(content, Path::new("metadata")).unwrap().unwrap();
        assert_eq!(record.id, "abc");
        assert_eq!(record.title, "a\\b");
        assert_eq!(record.upload_timestamp, 5);
        assert!(record.comments.is_empty());
    }

    #[test]
    fn test_missing_numeric_field_is_parse_error() {
        let content = "id=abc\nvideoFileSizeInBytes=10\nnumber=0\n";
        let err = decode(content, Path::new("metadata")).unwrap_err();
        assert!(matches!(err, ArchiveError::Parse { .. }));
        assert!(err.to_string().contains("timestamp"));
    }

    #[test]
    fn test_malformed_comments_is_parse_error() {
        let content = "id=abc\nvideoFileSizeInBytes=10\ntimestamp=1\nnumber=0\ncomments=[{\n";
        let err = decode(content, Path::new("metadata")).unwrap_err();
        assert!(matches!(err, ArchiveError::Parse { .. }));
    }

    #[test]
    fn test_other_cache_version_is_a_miss() {
        let content = "cacheVersion=999\nid=abc\n";
        assert!(decode(content, Path::new("metadata")).unwrap().is_none());
    }

    #[test]
    fn test_value_may_contain_equals_sign() {
        let content = encode(&sample_record()).unwrap();
        assert!(content.contains("title=Speedy Blupi = fun\n"));
    }

    #[tokio::test]
    async fn test_write_replaces_cache_without_leftovers() {
        let dir = tempfile::TempDir::new().unwrap();
        let record = sample_record();

        write_metadata(dir.path(), &record).await.unwrap();
        assert!(!dir.path().join(STAGING_FILE_NAME).exists());
        assert_eq!(read_metadata(dir.path()).await.unwrap(), Some(record));
    }

    #[tokio::test]
    async fn test_failed_write_keeps_previous_cache() {
        let dir = tempfile::TempDir::new().unwrap();
        let previous = sample_record();
        write_metadata(dir.path(), &previous).await.unwrap();

        // the staging file cannot be created while a directory holds its name
        std::fs::create_dir(dir.path().join(STAGING_FILE_NAME)).unwrap();
        let mut updated = sample_record();
        updated.title = "changed".into();
        assert!(write_metadata(dir.path(), &updated).await.is_err());

        assert_eq!(read_metadata(dir.path()).await.unwrap(), Some(previous));
    }
}
