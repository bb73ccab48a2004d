//! yt-archive - browse the YouTube videos of an ArchiveBox archive offline
//!
//! Scans `<root>/archive/*/media`, caches per-snapshot metadata and writes
//! `videos.html`, `channels/*.html` and `videos/*.html` next to the archive.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use yt_archive::core::loader::ArchiveLoader;
use yt_archive::core::scanner::{ScanOptions, scan};
use yt_archive::core::stats::RunStats;
use yt_archive::render::site::{RenderOptions, write_site};
use yt_archive::report::print_summary;
use yt_archive::storage::config;
use yt_archive::types::Settings;
use yt_archive::utils::paths::ArchivePaths;

/// Static HTML pages for the YouTube videos in an ArchiveBox archive.
#[derive(Parser, Debug)]
#[command(name = "yt-archive")]
#[command(version, about, long_about = None)]
struct Cli {
    /// ArchiveBox root directory (default: current directory)
    root: Option<PathBuf>,

    /// Only this video id
    #[arg(long)]
    video: Option<String>,

    /// Only this channel id
    #[arg(long)]
    channel: Option<String>,

    /// Videos per row on channel pages; less than 2 disables the fixed width
    #[arg(long, allow_hyphen_values = true)]
    videos_per_row: Option<i64>,

    /// Ignore cached metadata files (1|true|0|false)
    #[arg(long, value_parser = parse_switch)]
    always_generate_metadata: Option<bool>,

    /// Rewrite existing video pages (1|true|0|false)
    #[arg(long, value_parser = parse_switch)]
    always_generate_html_files: Option<bool>,

    /// Inline thumbnails into channel pages (1|true|0|false)
    #[arg(long, value_parser = parse_switch)]
    thumbnail_as_base64: Option<bool>,

    /// Thumbnails link to YouTube instead of the local page (1|true|0|false)
    #[arg(long, value_parser = parse_switch)]
    thumbnail_links_to_youtube: Option<bool>,

    /// Snapshots loaded at the same time
    #[arg(long)]
    workers: Option<usize>,

    /// Hide the progress bar
    #[arg(long)]
    no_progress: bool,
}

impl Cli {
    /// Flags given on the command line win over the config file
    fn apply(&self, settings: &mut Settings) {
        if self.video.is_some() {
            settings.video = self.video.clone();
        }
        if self.channel.is_some() {
            settings.channel = self.channel.clone();
        }
        if let Some(n) = self.videos_per_row {
            settings.videos_per_row = config::normalize_videos_per_row(n);
        }
        if let Some(v) = self.always_generate_metadata {
            settings.always_generate_metadata = v;
        }
        if let Some(v) = self.always_generate_html_files {
            settings.always_generate_html_files = v;
        }
        if let Some(v) = self.thumbnail_as_base64 {
            settings.thumbnail_as_base64 = v;
        }
        if let Some(v) = self.thumbnail_links_to_youtube {
            settings.thumbnail_links_to_youtube = v;
        }
        if self.workers.is_some() {
            settings.workers = self.workers;
        }
    }
}

fn parse_switch(value: &str) -> Result<bool, String> {
    config::parse_switch(value).map_err(|e| e.to_string())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut settings = config::load_config().await?;
    cli.apply(&mut settings);
    if settings.workers == Some(0) {
        bail!("--workers must be at least 1");
    }
    tracing::debug!(?settings, "settings");

    let root = match &cli.root {
        Some(root) => root.clone(),
        None => std::env::current_dir().context("cannot determine working directory")?,
    };
    let paths = ArchivePaths::new(root);
    println!("{} {}", "Archive:".dimmed(), paths.root().display());

    let loader = Arc::new(ArchiveLoader::new(settings.ffprobe.clone())?);
    let stats = Arc::new(RunStats::new());

    let mut options = ScanOptions::from_settings(&settings);
    options.show_progress = !cli.no_progress;

    let mut records = scan(&paths.archive_dir(), &options, loader, Arc::clone(&stats))
        .await
        .with_context(|| format!("cannot scan {}", paths.archive_dir().display()))?;

    let site = write_site(&mut records, &paths, &RenderOptions::from_settings(&settings)).await;
    print_summary(&records, &stats);

    let site = site.context("cannot write pages")?;
    println!(
        "{} {} channel pages, {} video pages",
        "Done:".green(),
        site.channel_pages,
        site.video_pages
    );
    Ok(())
}
