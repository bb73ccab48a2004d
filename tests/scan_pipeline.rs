//! End-to-end scan over a temporary archive

use std::fs;
use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;
use yt_archive::core::filter::RecordFilter;
use yt_archive::core::loader::ArchiveLoader;
use yt_archive::core::scanner::{ScanOptions, scan};
use yt_archive::core::stats::RunStats;
use yt_archive::render::site::{RenderOptions, write_site};
use yt_archive::types::VideoRecord;
use yt_archive::utils::paths::ArchivePaths;

/// (snapshot, id, channel, upload date, has video)
const SNAPSHOTS: [(&str, &str, &str, &str, bool); 6] = [
    ("1600000000.1", "b2", "Beta", "20200302", true),
    ("1600000000.2", "a1", "Alpha", "20190101", true),
    ("1600000000.3", "b1", "Beta", "20200301", false),
    ("1600000000.4", "nc", "", "20180101", true),
    ("1600000000.5", "a2", "Alpha", "20190505", false),
    ("1600000000.6", "a3", "Alpha", "20210101", true),
];

const MISSING: usize = 2;

fn build_archive(root: &Path) {
    for (snapshot, id, channel, date, has_video) in SNAPSHOTS {
        let media = root.join("archive").join(snapshot).join("media");
        fs::create_dir_all(&media).unwrap();

        let sidecar = serde_json::json!({
            "id": id,
            "title": format!("Video {}", id),
            "channel": channel,
            "channel_url": format!("https://www.youtube.com/channel/UC{}", channel),
            "channel_id": format!("UC{}", channel),
            "upload_date": date,
            "timestamp": 0,
            "ext": "mp4",
        });
        fs::write(media.join(format!("{}.info.json", id)), sidecar.to_string()).unwrap();
        if has_video {
            fs::write(media.join(format!("{}.mp4", id)), id.as_bytes()).unwrap();
        }
    }
    // snapshots without downloaded media are not videos
    fs::create_dir_all(root.join("archive").join("1600000000.9")).unwrap();
}

fn options(workers: usize, always_regenerate: bool) -> ScanOptions {
    ScanOptions {
        always_regenerate,
        filter: RecordFilter::default(),
        workers,
        show_progress: false,
    }
}

async fn run(paths: &ArchivePaths, options: &ScanOptions) -> (Vec<VideoRecord>, Arc<RunStats>) {
    let loader = Arc::new(ArchiveLoader::new("yt-archive-no-such-ffprobe").unwrap());
    let stats = Arc::new(RunStats::new());
    let records = scan(&paths.archive_dir(), options, loader, Arc::clone(&stats))
        .await
        .unwrap();
    (records, stats)
}

fn ids(records: &[VideoRecord]) -> Vec<&str> {
    records.iter().map(|r| r.id.as_str()).collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_same_result_for_any_worker_count() {
    for workers in [1, 4] {
        let dir = TempDir::new().unwrap();
        build_archive(dir.path());
        let paths = ArchivePaths::new(dir.path());

        let (records, stats) = run(&paths, &options(workers, true)).await;

        assert_eq!(ids(&records), vec!["a1", "a2", "a3", "b1", "b2", "nc"]);
        assert_eq!(stats.missing_videos().len(), MISSING);
        assert_eq!(stats.missing_videos(), vec!["a2".to_string(), "b1".to_string()]);
        assert!(stats.failures().is_empty());

        assert_eq!(records[0].previous_id, "");
        assert_eq!(records[0].next_id, "a2");
        assert_eq!(records[2].next_id, "b1");
        assert_eq!(records[5].previous_id, "b2");
        assert_eq!(records[5].next_id, "");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_second_run_uses_cache() {
    let dir = TempDir::new().unwrap();
    build_archive(dir.path());
    let paths = ArchivePaths::new(dir.path());

    let (first, _) = run(&paths, &options(2, true)).await;
    for (snapshot, ..) in SNAPSHOTS {
        assert!(paths.media_dir(snapshot).join("metadata").exists());
    }

    let (second, stats) = run(&paths, &options(2, false)).await;
    assert_eq!(first, second);
    assert_eq!(stats.missing_videos().len(), MISSING);
}

#[tokio::test]
async fn test_broken_snapshot_does_not_stop_scan() {
    let dir = TempDir::new().unwrap();
    build_archive(dir.path());
    let broken = dir.path().join("archive").join("1600000000.7").join("media");
    fs::create_dir_all(&broken).unwrap();
    fs::write(broken.join("x.info.json"), "{ not json").unwrap();
    let paths = ArchivePaths::new(dir.path());

    let (records, stats) = run(&paths, &options(3, true)).await;

    assert_eq!(records.len(), SNAPSHOTS.len());
    let failures = stats.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].snapshot_id, "1600000000.7");
}

#[tokio::test]
async fn test_channel_filter() {
    let dir = TempDir::new().unwrap();
    build_archive(dir.path());
    let paths = ArchivePaths::new(dir.path());

    let mut opts = options(2, true);
    opts.filter = RecordFilter::new(None, Some("UCBeta".into()));
    let (records, _) = run(&paths, &opts).await;

    assert_eq!(ids(&records), vec!["b1", "b2"]);
    assert_eq!(records[0].next_id, "b2");
}

#[tokio::test]
async fn test_video_filter() {
    let dir = TempDir::new().unwrap();
    build_archive(dir.path());
    let paths = ArchivePaths::new(dir.path());

    let mut opts = options(2, true);
    opts.filter = RecordFilter::new(Some("a3".into()), None);
    let (records, stats) = run(&paths, &opts).await;

    assert_eq!(ids(&records), vec!["a3"]);
    assert!(stats.missing_videos().is_empty());
}

#[tokio::test]
async fn test_pages_are_written() {
    let dir = TempDir::new().unwrap();
    build_archive(dir.path());
    let paths = ArchivePaths::new(dir.path());
    let (mut records, _) = run(&paths, &options(2, true)).await;

    let render = RenderOptions {
        videos_per_row: 4,
        thumbnail_as_base64: false,
        thumbnail_links_to_youtube: false,
        always_generate_html_files: true,
    };
    let report = write_site(&mut records, &paths, &render).await.unwrap();

    assert_eq!(report.channel_pages, 2);
    // the channel-less record has no channel page to be listed on
    assert_eq!(report.video_pages, 5);

    let index = fs::read_to_string(paths.index_file()).unwrap();
    assert!(index.find("<h1>Alpha</h1>").unwrap() < index.find("<h1>Beta</h1>").unwrap());

    let middle = fs::read_to_string(paths.video_page("a2")).unwrap();
    assert!(middle.contains("./a1.html'\">Back</button>"));
    assert!(middle.contains("<button  style=\"font-size:200%;\" onclick=\"window.location ='./a3.html'\">Next</button>"));

    // a3 is last in its channel although the sequence continues with b1
    let last = fs::read_to_string(paths.video_page("a3")).unwrap();
    assert!(last.contains("<button disabled style=\"visibility:hidden;font-size:200%;\" onclick=\"window.location ='./b1.html'\">Next</button>"));
}
