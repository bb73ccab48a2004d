//! yt-archive library
//!
//! Scans an ArchiveBox archive for downloaded YouTube videos and renders
//! static HTML pages for browsing them offline.

pub mod core;
pub mod error;
pub mod render;
pub mod report;
pub mod storage;
pub mod types;
pub mod utils;
