//! Registry operations implementation

use chrono::{DateTime, Local};
use log::debug;
use std::cmp::Ordering;
use std::time::SystemTime;

use crate::error::ShareError;
use crate::registry::results::StoredFile;
use crate::storage::FileStore;

const SIZE_UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// All stored files, newest first; equal timestamps are ordered by name.
pub async fn list_with_metadata(store: &FileStore) -> Result<Vec<StoredFile>, ShareError> {
    let mut files = Vec::new();

    for filename in store.list().await? {
        let size_bytes = match store.size(&filename).await {
            Ok(size) => size,
            // Deleted between the directory read and the stat
            Err(ShareError::NotFound(_)) => continue,
            Err(e) => return Err(e),
        };
        let modified_at = match store.modified_at(&filename).await {
            Ok(time) => time,
            Err(ShareError::NotFound(_)) => continue,
            Err(e) => return Err(e),
        };

        files.push(StoredFile {
            filename,
            size_bytes,
            modified_at,
        });
    }

    files.sort_by(newest_first);
    debug!("Registry lists {} files", files.len());
    Ok(files)
}

fn newest_first(a: &StoredFile, b: &StoredFile) -> Ordering {
    b.modified_at
        .cmp(&a.modified_at)
        .then_with(|| a.filename.cmp(&b.filename))
}

/// Human-readable size with one decimal, e.g. `1536` -> `1.5 KB`
pub fn format_size(size_bytes: u64) -> String {
    let mut size = size_bytes as f64;
    for unit in SIZE_UNITS {
        if size < 1024.0 {
            return format!("{size:.1} {unit}");
        }
        size /= 1024.0;
    }
    format!("{size:.1} TB")
}

/// Local time as `YYYY-MM-DD HH:MM`
pub fn format_timestamp(time: SystemTime) -> String {
    DateTime::<Local>::from(time)
        .format("%Y-%m-%d %H:%M")
        .to_string()
}
