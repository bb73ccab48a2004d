//! Error types for yt-archive

use std::path::PathBuf;

use thiserror::Error;

/// Coarse classification used in the run summary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Fatal for the whole run
    InvalidConfig,

    // Scoped to a single snapshot
    ParseError,
    DataError,

    // I/O and network
    FileError,
    NetworkError,
}

/// Main error type for yt-archive
#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Inconsistent archive data: {0}")]
    Data(String),

    #[error("File error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

impl ArchiveError {
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Config(_) => ErrorCode::InvalidConfig,
            Self::Parse { .. } => ErrorCode::ParseError,
            Self::Data(_) => ErrorCode::DataError,
            Self::Io(_) => ErrorCode::FileError,
            Self::Http(_) => ErrorCode::NetworkError,
            Self::Json(_) => ErrorCode::ParseError,
            Self::Image(_) => ErrorCode::FileError,
        }
    }
}

pub type Result<T> = std::result::Result<T, ArchiveError>;
