//! JSON dumps of results for offline debugging

use chrono::Utc;
use log::info;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Replace anything outside `[A-Za-z0-9_-]` so a label is safe in a filename
pub fn sanitize_label(label: &str) -> String {
    let cleaned: String = label
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "dump".to_string()
    } else {
        cleaned
    }
}

/// Write `value` as pretty JSON to `<dir>/<label>-<timestamp>.json`
pub fn write_dump<T: Serialize + ?Sized>(dir: &Path, label: &str, value: &T) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let timestamp = Utc::now().format("%Y%m%dT%H%M%S%.3fZ");
    let path = dir.join(format!("{}-{}.json", sanitize_label(label), timestamp));
    fs::write(&path, serde_json::to_string_pretty(value)?)?;
    info!("Wrote {}", path.display());
    Ok(path)
}
