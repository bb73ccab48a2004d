//! Run-scoped aggregates shared by the loader tasks

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::error::{ArchiveError, ErrorCode};

/// A snapshot that could not be loaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFailure {
    pub snapshot_id: String,
    pub code: ErrorCode,
    pub message: String,
}

/// Counters for one invocation; create one per run and share it by `Arc`
#[derive(Debug, Default)]
pub struct RunStats {
    missing_videos: Mutex<Vec<String>>,
    failures: Mutex<Vec<LoadFailure>>,
    total_duration_ms: AtomicU64,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a snapshot whose video file is absent or incomplete
    pub fn add_missing_video(&self, id: &str) {
        lock(&self.missing_videos).push(id.to_string());
    }

    pub fn add_failure(&self, snapshot_id: &str, error: &ArchiveError) {
        lock(&self.failures).push(LoadFailure {
            snapshot_id: snapshot_id.to_string(),
            code: error.code(),
            message: error.to_string(),
        });
    }

    pub fn add_duration_ms(&self, ms: u64) {
        self.total_duration_ms.fetch_add(ms, Ordering::Relaxed);
    }

    /// Ids without a video file, sorted
    pub fn missing_videos(&self) -> Vec<String> {
        let mut ids = lock(&self.missing_videos).clone();
        ids.sort();
        ids
    }

    /// Failed snapshots, sorted by snapshot id
    pub fn failures(&self) -> Vec<LoadFailure> {
        let mut failures = lock(&self.failures).clone();
        failures.sort_by(|a, b| a.snapshot_id.cmp(&b.snapshot_id));
        failures
    }

    pub fn total_duration_ms(&self) -> u64 {
        self.total_duration_ms.load(Ordering::Relaxed)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_concurrent_updates_are_not_lost() {
        let stats = Arc::new(RunStats::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let stats = Arc::clone(&stats);
                std::thread::spawn(move || {
                    for i in 0..100 {
                        stats.add_missing_video(&format!("{}-{}", t, i));
                        stats.add_duration_ms(10);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(stats.missing_videos().len(), 800);
        assert_eq!(stats.total_duration_ms(), 8000);
    }

    #[test]
    fn test_failures_keep_error_code() {
        let stats = RunStats::new();
        stats.add_failure("b", &ArchiveError::Data("loop".into()));
        stats.add_failure("a", &ArchiveError::parse("metadata", "bad"));

        let failures = stats.failures();
        assert_eq!(failures[0].snapshot_id, "a");
        assert_eq!(failures[0].code, ErrorCode::ParseError);
        assert_eq!(failures[1].code, ErrorCode::DataError);
    }
}
