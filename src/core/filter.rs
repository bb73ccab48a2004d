//! Single-video / single-channel restriction

use crate::types::{Settings, VideoRecord};

/// Restricts a run to one video id and/or one channel id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    video: Option<String>,
    channel: Option<String>,
}

impl RecordFilter {
    pub fn new(video: Option<String>, channel: Option<String>) -> Self {
        Self {
            video: video.filter(|v| !v.is_empty()),
            channel: channel.filter(|c| !c.is_empty()),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.video.clone(), settings.channel.clone())
    }

    pub fn matches_video_id(&self, id: &str) -> bool {
        self.video.as_deref().is_none_or(|wanted| wanted == id)
    }

    pub fn matches(&self, record: &VideoRecord) -> bool {
        self.matches_video_id(&record.id)
            && self
                .channel
                .as_deref()
                .is_none_or(|wanted| wanted == record.channel_id)
    }

    /// Drop every record the filter rejects
    pub fn retain(&self, records: &mut Vec<VideoRecord>) {
        records.retain(|r| self.matches(r));
    }
}
