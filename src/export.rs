use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use image::{ImageFormat, RgbaImage};
use tracing::info;

use crate::error::{Error, Result};

pub const EXPORT_PREFIX: &str = "filter-workflow-";

/// `filter-workflow-<ISO-8601 UTC>.png` with `:` and `.` turned into `-`.
pub fn export_file_name(now: DateTime<Utc>) -> String {
    let stamp = now
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("{EXPORT_PREFIX}{stamp}.png")
}

/// Writes `canvas` as a PNG into `dir` and returns the file path.
pub fn write_png(canvas: &RgbaImage, dir: &Path, now: DateTime<Utc>) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(now));
    canvas
        .save_with_format(&path, ImageFormat::Png)
        .map_err(|source| Error::Export {
            path: path.clone(),
            source,
        })?;
    info!(path = %path.display(), "exported canvas");
    Ok(path)
}
