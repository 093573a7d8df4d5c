//! Registry module
//!
//! Reads the shared directory as the list of stored files. There is no index
//! besides the directory itself.

mod operations;
mod results;

pub use operations::{format_size, format_timestamp, list_with_metadata};
pub use results::StoredFile;
