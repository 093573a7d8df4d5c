//! Upload policy
//!
//! Decides whether an upload may be stored and under which name.

mod operations;

pub use operations::{FORM_OVERHEAD_BYTES, UploadPolicy};
