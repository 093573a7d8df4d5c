//! HTTP protocol layer
//!
//! Request handlers, the redirect-with-status responses they produce, and the
//! index page they render.

pub mod handlers;
pub mod page;
pub mod responses;

pub use handlers::{delete, download, index, upload};
pub use responses::HandlerOutcome;
