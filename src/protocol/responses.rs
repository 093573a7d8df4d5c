//! HTTP response handling
//!
//! Turns handler outcomes into the redirect back to the index page that
//! carries the status message in its query string.

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};

use crate::error::ShareError;
use crate::error::handlers::report;

/// Tagged result of a mutating request: a success message or a typed failure
pub type HandlerOutcome = Result<String, ShareError>;

/// Build the `302 Found` redirect to `/` for an outcome
pub fn redirect_to_index(operation: &str, outcome: HandlerOutcome) -> Response {
    let location = match &outcome {
        Ok(message) => format!("/?success={}", urlencoding::encode(message)),
        Err(err) => {
            report(operation, err);
            format!("/?error={}", urlencoding::encode(&err.to_string()))
        }
    };

    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

/// Generic response for failures that cannot be shown on the page
pub fn internal_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
}
