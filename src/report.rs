//! End-of-run summary printed to stdout

use crate::core::stats::RunStats;
use crate::types::VideoRecord;
use colored::Colorize;

const MS_PER_HOUR: u64 = 60 * 60 * 1000;

/// Whole hours, rounded down
pub fn total_hours(total_ms: u64) -> u64 {
    total_ms / MS_PER_HOUR
}

/// Shortest first; equal durations keep their order
pub fn by_duration(records: &[VideoRecord]) -> Vec<&VideoRecord> {
    let mut sorted: Vec<&VideoRecord> = records.iter().collect();
    sorted.sort_by_key(|r| r.duration_ms());
    sorted
}

/// Smallest file first
pub fn by_size(records: &[VideoRecord]) -> Vec<&VideoRecord> {
    let mut sorted: Vec<&VideoRecord> = records.iter().collect();
    sorted.sort_by_key(|r| r.video_file_size_bytes);
    sorted
}

pub fn print_summary(records: &[VideoRecord], stats: &RunStats) {
    let missing = stats.missing_videos();
    if !missing.is_empty() {
        println!("{}", "[Warning] Snapshots without videos:".yellow());
        for id in &missing {
            println!("{}", id);
        }
    }

    let failures = stats.failures();
    if !failures.is_empty() {
        println!("{}", "[Error] Snapshots that could not be loaded:".red());
        for failure in &failures {
            println!(
                "{}\t{}",
                failure.snapshot_id,
                format!("{:?}: {}", failure.code, failure.message).dimmed()
            );
        }
    }

    println!(
        "{} {} hours",
        "Total duration:".green(),
        total_hours(stats.total_duration_ms())
    );

    println!();
    for record in by_duration(records) {
        println!(
            "{} minutes\t{}\t{}",
            record.duration_minutes(),
            record.youtube_url().cyan(),
            record.title
        );
    }

    println!();
    for record in by_size(records) {
        println!(
            "{:.2} MB\t{}\t{}",
            record.size_mib(),
            record.youtube_url().cyan(),
            record.title
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, duration: &str, size: u64) -> VideoRecord {
        VideoRecord {
            id: id.into(),
            duration_text: duration.into(),
            video_file_size_bytes: size,
            ..Default::default()
        }
    }

    #[test]
    fn test_total_hours_rounds_down() {
        assert_eq!(total_hours(0), 0);
        assert_eq!(total_hours(MS_PER_HOUR - 1), 0);
        assert_eq!(total_hours(5 * MS_PER_HOUR + 59 * 60 * 1000), 5);
    }

    #[test]
    fn test_sorted_views() {
        let records = vec![
            record("long", "01:00:00.00", 10),
            record("short", "00:01:00.00", 300),
            record("mid", "00:20:00.00", 20),
        ];

        let ids: Vec<&str> = by_duration(&records).iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["short", "mid", "long"]);

        let ids: Vec<&str> = by_size(&records).iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["long", "mid", "short"]);
    }
}
