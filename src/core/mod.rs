//! Core pipeline: snapshot loading, concurrent scan, ordering

pub mod comments;
pub mod downloader;
pub mod filter;
pub mod loader;
pub mod ordering;
pub mod probe;
pub mod scanner;
pub mod sidecar;
pub mod stats;
