//! File system storage management
//!
//! Handles the shared directory and the path validation guarding it.

pub mod filesystem;
pub mod validation;

pub use filesystem::FileStore;
pub use validation::{is_plain_file_name, secure_filename};
