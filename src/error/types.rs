//! Error types
//!
//! Every failure a request can run into. The `Display` text of each variant is
//! the message shown to the user on the index page.

use std::io;
use thiserror::Error;

use crate::registry::format_size;

#[derive(Debug, Error)]
pub enum ShareError {
    #[error("No file selected")]
    NoFileSelected,

    #[error("File too large! Max size: {}", format_size(*limit))]
    FileTooLarge { limit: u64 },

    #[error("File type not allowed: {0}")]
    UnsupportedFileType(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid file name: {0}")]
    InvalidPath(String),

    /// Another upload published the same name between probe and write.
    #[error("A file named {0} was just stored by another upload, please try again")]
    NameTaken(String),

    #[error("File operation failed: {0}")]
    Io(#[from] io::Error),
}

impl ShareError {
    /// Short stable name of the failure kind, used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            ShareError::NoFileSelected => "no_file_selected",
            ShareError::FileTooLarge { .. } => "file_too_large",
            ShareError::UnsupportedFileType(_) => "unsupported_file_type",
            ShareError::NotFound(_) => "not_found",
            ShareError::InvalidPath(_) => "invalid_path",
            ShareError::NameTaken(_) => "name_taken",
            ShareError::Io(_) => "io_error",
        }
    }
}
