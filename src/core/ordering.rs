//! Ordering, previous/next links and channel grouping

use crate::types::VideoRecord;
use std::cmp::Ordering;
use std::collections::HashSet;

/// Result of comparing two records.
///
/// Records without a channel have no position among themselves; they are
/// `Unordered` and keep their relative input order under a stable sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Before,
    After,
    Unordered,
}

impl From<Placement> for Ordering {
    fn from(placement: Placement) -> Self {
        match placement {
            Placement::Before => Ordering::Less,
            Placement::After => Ordering::Greater,
            Placement::Unordered => Ordering::Equal,
        }
    }
}

/// Channel name (byte order), then upload date, then upload timestamp.
/// Records with a channel come before records without one.
pub fn compare_records(a: &VideoRecord, b: &VideoRecord) -> Placement {
    match (a.has_channel(), b.has_channel()) {
        (true, true) => {
            let ordering = a
                .channel_name
                .as_bytes()
                .cmp(b.channel_name.as_bytes())
                .then_with(|| a.upload_date.cmp(&b.upload_date))
                .then_with(|| a.upload_timestamp.cmp(&b.upload_timestamp));
            match ordering {
                Ordering::Less => Placement::Before,
                Ordering::Greater => Placement::After,
                Ordering::Equal => Placement::Unordered,
            }
        }
        (true, false) => Placement::Before,
        (false, true) => Placement::After,
        (false, false) => Placement::Unordered,
    }
}

/// Stable sort by [`compare_records`]
pub fn sort_records(records: &mut [VideoRecord]) {
    records.sort_by(|a, b| compare_records(a, b).into());
}

/// Point every record at its neighbours in the whole sequence
pub fn link_records(records: &mut [VideoRecord]) {
    let ids: Vec<String> = records.iter().map(|r| r.id.clone()).collect();

    for (i, record) in records.iter_mut().enumerate() {
        record.previous_id = if i > 0 { ids[i - 1].clone() } else { String::new() };
        record.next_id = ids.get(i + 1).cloned().unwrap_or_default();
    }
}

pub fn sort_and_link(records: &mut [VideoRecord]) {
    sort_records(records);
    link_records(records);
}

/// A channel as listed on the index page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelGroup {
    pub name: String,
    /// URL of the first video seen for this channel
    pub url: String,
}

/// Distinct channels in case-insensitive name order
pub fn group_channels(records: &[VideoRecord]) -> Vec<ChannelGroup> {
    let mut seen = HashSet::new();
    let mut channels: Vec<ChannelGroup> = records
        .iter()
        .filter(|r| r.has_channel() && seen.insert(r.channel_name.as_str()))
        .map(|r| ChannelGroup {
            name: r.channel_name.clone(),
            url: r.channel_url.clone(),
        })
        .collect();

    channels.sort_by_key(|c| c.name.to_lowercase());
    channels
}

pub fn count_in_channel(records: &[VideoRecord], channel_name: &str) -> usize {
    records
        .iter()
        .filter(|r| r.channel_name == channel_name)
        .count()
}
