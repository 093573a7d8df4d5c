//! Result types for registry operations

use std::time::SystemTime;

use crate::registry::operations::{format_size, format_timestamp};

/// One file in the shared directory, as seen at listing time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub filename: String,
    pub size_bytes: u64,
    pub modified_at: SystemTime,
}

impl StoredFile {
    pub fn display_size(&self) -> String {
        format_size(self.size_bytes)
    }

    pub fn display_date(&self) -> String {
        format_timestamp(self.modified_at)
    }
}
