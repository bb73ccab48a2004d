//! Configuration management
//!
//! Settings come from an optional JSON file in the config directory; flags
//! given on the command line take precedence over it.

use crate::error::{ArchiveError, Result};
use crate::types::Settings;
use crate::utils::paths::get_config_path;
use std::path::Path;
use tokio::fs;

/// Load settings from the user's config file, falling back to defaults
pub async fn load_config() -> Result<Settings> {
    load_config_from(&get_config_path()).await
}

/// Load settings from a specific file
pub async fn load_config_from(path: &Path) -> Result<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }

    let content = fs::read_to_string(path).await?;
    let mut settings: Settings = serde_json::from_str(&content)
        .map_err(|e| ArchiveError::Config(format!("{}: {}", path.display(), e)))?;

    settings.videos_per_row = normalize_videos_per_row(i64::from(settings.videos_per_row));
    if settings.workers == Some(0) {
        return Err(ArchiveError::Config(format!(
            "{}: workers must be at least 1",
            path.display()
        )));
    }

    Ok(settings)
}

/// Parse a boolean flag value ("1", "true", "0" or "false")
pub fn parse_switch(value: &str) -> Result<bool> {
    match value {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        other => Err(ArchiveError::Config(format!(
            "could not create boolean from string: {}",
            other
        ))),
    }
}

/// Fewer than two videos per row disables the fixed-width layout (0)
pub fn normalize_videos_per_row(requested: i64) -> u32 {
    if requested < 2 {
        0
    } else {
        u32::try_from(requested).unwrap_or(u32::MAX)
    }
}
