//! Concurrent archive scan
//!
//! Every snapshot with a `media` directory becomes one loader task. Tasks run
//! on the multi-threaded runtime with at most `workers` of them loading at the
//! same time. The scan returns only after every task has finished.

use crate::core::filter::RecordFilter;
use crate::core::loader::ArchiveLoader;
use crate::core::ordering::sort_and_link;
use crate::core::stats::RunStats;
use crate::error::{ArchiveError, Result};
use crate::types::{Settings, VideoRecord};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Semaphore;
use tokio::task::{self, JoinSet};

/// How a scan loads and selects snapshots
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Ignore cached `metadata` files
    pub always_regenerate: bool,
    pub filter: RecordFilter,
    /// Loader tasks running at once (at least 1)
    pub workers: usize,
    pub show_progress: bool,
}

impl ScanOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            always_regenerate: settings.always_generate_metadata,
            filter: RecordFilter::from_settings(settings),
            workers: settings.workers.unwrap_or_else(default_workers),
            show_progress: false,
        }
    }
}

/// Available parallelism, but never fewer than two workers
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .max(2)
}

/// A snapshot directory that has downloaded media
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotDir {
    pub snapshot_id: String,
    pub media_dir: PathBuf,
}

/// Immediate subdirectories of `archive_dir` containing `media/`, by name
pub async fn list_snapshots(archive_dir: &Path) -> Result<Vec<SnapshotDir>> {
    let mut entries = fs::read_dir(archive_dir).await?;
    let mut snapshots = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let media_dir = entry.path().join("media");
        if !media_dir.is_dir() {
            continue;
        }
        snapshots.push(SnapshotDir {
            snapshot_id: entry.file_name().to_string_lossy().to_string(),
            media_dir,
        });
    }

    snapshots.sort_by(|a, b| a.snapshot_id.cmp(&b.snapshot_id));
    Ok(snapshots)
}

/// Load, filter, order and link every video of the archive.
///
/// A snapshot that fails to load is logged and recorded in `stats`; it never
/// stops the other snapshots. Only an unreadable `archive_dir` is an error.
pub async fn scan(
    archive_dir: &Path,
    options: &ScanOptions,
    loader: Arc<ArchiveLoader>,
    stats: Arc<RunStats>,
) -> Result<Vec<VideoRecord>> {
    let snapshots = list_snapshots(archive_dir).await?;
    tracing::info!(
        snapshots = snapshots.len(),
        workers = options.workers,
        "scanning {}",
        archive_dir.display()
    );

    let progress = progress_bar(snapshots.len() as u64, options.show_progress);
    let permits = Arc::new(Semaphore::new(options.workers.max(1)));
    let mut tasks = JoinSet::new();
    let mut task_snapshots = HashMap::new();

    for snapshot in snapshots {
        let permits = Arc::clone(&permits);
        let loader = Arc::clone(&loader);
        let stats = Arc::clone(&stats);
        let filter = options.filter.clone();
        let force = options.always_regenerate;
        let snapshot_id = snapshot.snapshot_id.clone();

        let handle = tasks.spawn(async move {
            let result = load_snapshot(&snapshot, &permits, &loader, force, &filter, &stats).await;
            (snapshot.snapshot_id, result)
        });
        task_snapshots.insert(handle.id(), snapshot_id);
    }

    let mut records = collect_results(&mut tasks, &task_snapshots, &stats, &progress).await;
    progress.finish_and_clear();

    options.filter.retain(&mut records);

    // pool completion order is arbitrary; ties in the ordering below must not depend on it
    records.sort_by(|a, b| a.snapshot_id.cmp(&b.snapshot_id));
    sort_and_link(&mut records);

    tracing::info!(videos = records.len(), "scan finished");
    Ok(records)
}

/// Outcome of one loader task
type SnapshotResult = (String, Result<Option<VideoRecord>>);

/// Drain `tasks`, keeping loaded records.
///
/// Load errors and crashed tasks are recorded in `stats` against their
/// snapshot; the remaining tasks are still joined.
async fn collect_results(
    tasks: &mut JoinSet<SnapshotResult>,
    task_snapshots: &HashMap<task::Id, String>,
    stats: &RunStats,
    progress: &ProgressBar,
) -> Vec<VideoRecord> {
    let mut records = Vec::new();
    while let Some(joined) = tasks.join_next_with_id().await {
        progress.inc(1);
        match joined {
            Ok((_, (_, Ok(Some(record))))) => records.push(record),
            Ok((_, (_, Ok(None)))) => {}
            Ok((_, (snapshot_id, Err(e)))) => {
                tracing::warn!(snapshot = %snapshot_id, error = %e, "skipping snapshot");
                stats.add_failure(&snapshot_id, &e);
            }
            Err(e) => {
                let snapshot_id = task_snapshots.get(&e.id()).cloned().unwrap_or_default();
                tracing::error!(snapshot = %snapshot_id, error = %e, "loader task crashed");
                let error = ArchiveError::Io(std::io::Error::other(e.to_string()));
                stats.add_failure(&snapshot_id, &error);
            }
        }
    }
    records
}

async fn load_snapshot(
    snapshot: &SnapshotDir,
    permits: &Semaphore,
    loader: &ArchiveLoader,
    force: bool,
    filter: &RecordFilter,
    stats: &RunStats,
) -> Result<Option<VideoRecord>> {
    let _permit = permits
        .acquire()
        .await
        .map_err(|e| ArchiveError::Io(std::io::Error::other(e)))?;

    let record = loader
        .load(&snapshot.media_dir, force, filter, stats)
        .await?;

    if let Some(record) = &record {
        tracing::debug!(id = %record.id, snapshot = %record.snapshot_id, duration = %record.duration_text, "loaded");
        if filter.matches(record) {
            stats.add_duration_ms(record.duration_ms());
        }
    }
    Ok(record)
}

fn progress_bar(len: u64, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::default_bar().template("{spinner:.green} [{bar:40}] {pos}/{len} snapshots") {
        bar.set_style(style);
    }
    bar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_only_directories_with_media_qualify() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("2/media")).unwrap();
        std::fs::create_dir_all(dir.path().join("1/media")).unwrap();
        std::fs::create_dir_all(dir.path().join("text-only")).unwrap();
        std::fs::write(dir.path().join("index.json"), "{}").unwrap();

        let snapshots = list_snapshots(dir.path()).await.unwrap();
        let ids: Vec<&str> = snapshots.iter().map(|s| s.snapshot_id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[tokio::test]
    async fn test_missing_archive_dir_is_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = list_snapshots(&dir.path().join("archive")).await.unwrap_err();
        assert!(matches!(err, ArchiveError::Io(_)));
    }

    #[test]
    fn test_default_workers_at_least_two() {
        assert!(default_workers() >= 2);
    }

    #[tokio::test]
    async fn test_crashed_task_is_recorded_and_others_finish() {
        let mut tasks: JoinSet<SnapshotResult> = JoinSet::new();
        let mut task_snapshots = HashMap::new();

        let crashing = tasks.spawn(async {
            if true {
                panic!("loader bug");
            }
            ("1600000000.1".to_string(), Ok(None))
        });
        task_snapshots.insert(crashing.id(), "1600000000.1".to_string());

        let healthy = tasks.spawn(async {
            let record = VideoRecord {
                id: "ok".into(),
                ..Default::default()
            };
            ("1600000000.2".to_string(), Ok(Some(record)))
        });
        task_snapshots.insert(healthy.id(), "1600000000.2".to_string());

        let stats = RunStats::new();
        let records =
            collect_results(&mut tasks, &task_snapshots, &stats, &ProgressBar::hidden()).await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "ok");
        let failures = stats.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].snapshot_id, "1600000000.1");
        assert_eq!(failures[0].code, crate::error::ErrorCode::FileError);
    }
}
