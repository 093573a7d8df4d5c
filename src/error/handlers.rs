//! Error handlers
//!
//! Logs request failures at a level matching their severity.

use crate::error::types::ShareError;
use log::{error, warn};

/// Log a failed request operation
pub fn report(operation: &str, err: &ShareError) {
    match err {
        ShareError::Io(e) => error!("{operation} failed ({}): {e}", err.kind()),
        _ => warn!("{operation} rejected ({}): {err}", err.kind()),
    }
}
