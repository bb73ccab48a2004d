//! yt-dlp info JSON parsing

use crate::types::{Comment, THUMBNAIL_WIDTH};
use serde_json::Value;

/// Fields taken from a `*.info.json` sidecar
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SidecarInfo {
    pub id: String,
    pub title: String,
    pub thumbnail: String,
    pub mini_thumbnail: String,
    pub ext: String,
    pub channel_name: String,
    pub channel_url: String,
    pub channel_id: String,
    pub upload_date: String,
    pub timestamp: i64,
    /// In file order, not yet threaded
    pub comments: Vec<Comment>,
}

fn string_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string()
}

fn integer_field(value: &Value, key: &str) -> i64 {
    value
        .get(key)
        .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f as i64)))
        .unwrap_or(0)
}

/// Extract the fields the pages need; missing fields default to empty / 0
pub fn parse_sidecar(data: &Value) -> SidecarInfo {
    let mini_thumbnail = data
        .get("thumbnails")
        .and_then(|t| t.as_array())
        .and_then(|t| select_mini_thumbnail(t))
        .unwrap_or("")
        .to_string();

    let comments = data
        .get("comments")
        .and_then(|c| c.as_array())
        .map(|items| items.iter().map(parse_comment).collect())
        .unwrap_or_default();

    SidecarInfo {
        id: string_field(data, "id"),
        title: string_field(data, "title"),
        thumbnail: string_field(data, "thumbnail"),
        mini_thumbnail,
        ext: string_field(data, "ext"),
        channel_name: string_field(data, "channel"),
        channel_url: string_field(data, "channel_url"),
        channel_id: string_field(data, "channel_id"),
        upload_date: string_field(data, "upload_date"),
        timestamp: integer_field(data, "timestamp"),
        comments,
    }
}

/// URL of the first thumbnail at least 80% as wide as a video card.
///
/// yt-dlp lists thumbnails smallest first, so the first hit is the cheapest
/// image that still looks sharp.
pub fn select_mini_thumbnail(thumbnails: &[Value]) -> Option<&str> {
    let min_width = (f64::from(THUMBNAIL_WIDTH) * 0.8) as i64;

    thumbnails.iter().find_map(|t| {
        let width = t.get("width")?.as_i64()?;
        if width < min_width {
            return None;
        }
        t.get("url")?.as_str()
    })
}

fn parse_comment(value: &Value) -> Comment {
    Comment {
        id: string_field(value, "id"),
        parent_id: string_field(value, "parent"),
        text: string_field(value, "text"),
        author: string_field(value, "author"),
        timestamp_seconds: integer_field(value, "timestamp"),
    }
}
