//! Error handling
//!
//! Defines the request error taxonomy and how failures are reported.

pub mod handlers;
pub mod types;

pub use types::*;
