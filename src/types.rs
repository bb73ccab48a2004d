//! Type definitions for yt-archive
//!
//! Source of truth for all data structures.

use serde::{Deserialize, Serialize};

/// Duration text used whenever a video could not be probed
pub const UNKNOWN_DURATION: &str = "00:00:00.00";

/// Parent id of top-level comments
pub const ROOT_COMMENT_PARENT: &str = "root";

/// Width in pixels of a video card on channel pages
pub const THUMBNAIL_WIDTH: u32 = 250;

// ============================================
// Video Types
// ============================================

/// One archived YouTube video
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoRecord {
    pub id: String,
    /// Name of the ArchiveBox snapshot directory
    pub snapshot_id: String,
    pub title: String,
    /// Empty when the snapshot has no playable video file
    pub video_file_name: String,
    pub video_file_size_bytes: u64,
    /// Hex SHA-512 of the video file
    pub video_file_hash: String,
    /// Formatted as "HH:MM:SS.cc"
    pub duration_text: String,
    pub channel_name: String,
    pub channel_url: String,
    pub channel_id: String,
    /// "YYYYMMDD"
    pub upload_date: String,
    /// Unix timestamp of the upload
    pub upload_timestamp: i64,
    pub description: String,
    pub thumbnail_url: String,
    pub mini_thumbnail_url: String,
    pub comments: Vec<Comment>,
    pub previous_id: String,
    pub next_id: String,
    pub file_extension: String,
    /// 1-based position within the channel, set while rendering
    pub display_number: u32,
}

impl Default for VideoRecord {
    fn default() -> Self {
        Self {
            id: String::new(),
            snapshot_id: String::new(),
            title: String::new(),
            video_file_name: String::new(),
            video_file_size_bytes: 0,
            video_file_hash: String::new(),
            duration_text: UNKNOWN_DURATION.into(),
            channel_name: String::new(),
            channel_url: String::new(),
            channel_id: String::new(),
            upload_date: String::new(),
            upload_timestamp: 0,
            description: String::new(),
            thumbnail_url: String::new(),
            mini_thumbnail_url: String::new(),
            comments: Vec::new(),
            previous_id: String::new(),
            next_id: String::new(),
            file_extension: String::new(),
            display_number: 0,
        }
    }
}

impl VideoRecord {
    pub fn has_video_file(&self) -> bool {
        !self.video_file_name.is_empty()
    }

    pub fn has_channel(&self) -> bool {
        !self.channel_name.is_empty()
    }

    /// Parse `duration_text` back into milliseconds (0 when malformed)
    pub fn duration_ms(&self) -> u64 {
        let parts: Vec<&str> = self.duration_text.split(':').collect();
        let &[hours, minutes, seconds] = parts.as_slice() else {
            return 0;
        };
        let (secs, centis) = seconds.split_once('.').unwrap_or((seconds, "0"));

        let parse = |s: &str| s.parse::<u64>().ok();
        match (parse(hours), parse(minutes), parse(secs), parse(centis)) {
            (Some(h), Some(m), Some(s), Some(c)) => {
                ((h * 60 + m) * 60 + s) * 1000 + c * 10
            }
            _ => 0,
        }
    }

    pub fn duration_minutes(&self) -> u64 {
        self.duration_ms() / 1000 / 60
    }

    pub fn size_mib(&self) -> f64 {
        self.video_file_size_bytes as f64 / 1024.0 / 1024.0
    }

    /// Image extension of the full-size thumbnail, e.g. "jpg" or "webp"
    pub fn thumbnail_format(&self) -> &str {
        extension_from_url(&self.thumbnail_url)
    }

    pub fn mini_thumbnail_format(&self) -> &str {
        extension_from_url(&self.mini_thumbnail_url)
    }

    pub fn youtube_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.id)
    }
}

/// Text after the last '.', cut at the query string
pub fn extension_from_url(url: &str) -> &str {
    let Some(pos) = url.rfind('.') else {
        return "";
    };
    let ext = &url[pos + 1..];
    match ext.find('?') {
        Some(qm) => &ext[..qm],
        None => ext,
    }
}

/// A comment as stored by yt-dlp (`--write-comments`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(default)]
    pub id: String,
    /// "root" for top-level comments
    #[serde(rename = "parent", default)]
    pub parent_id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub author: String,
    #[serde(rename = "timestamp", default)]
    pub timestamp_seconds: i64,
}

impl Comment {
    /// Nesting hint for ids shaped like "1.2.3"
    pub fn dot_count(&self) -> usize {
        self.id.chars().filter(|&c| c == '.').count()
    }
}

// ============================================
// Config Types
// ============================================

/// Run options, merged from the config file and the command line
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Only this video id
    pub video: Option<String>,
    /// Only this channel id
    pub channel: Option<String>,
    /// Ignore cached `metadata` files
    pub always_generate_metadata: bool,
    /// Rewrite video pages that already exist
    pub always_generate_html_files: bool,
    /// 0 disables the fixed-width layout
    pub videos_per_row: u32,
    pub thumbnail_as_base64: bool,
    pub thumbnail_links_to_youtube: bool,
    /// Loader tasks running at once (default: available parallelism, at least 2)
    pub workers: Option<usize>,
    /// Binary used to probe video durations
    pub ffprobe: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            video: None,
            channel: None,
            always_generate_metadata: true,
            always_generate_html_files: true,
            videos_per_row: 4,
            thumbnail_as_base64: false,
            thumbnail_links_to_youtube: false,
            workers: None,
            ffprobe: "ffprobe".into(),
        }
    }
}
