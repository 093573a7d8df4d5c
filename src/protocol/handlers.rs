//! Request handlers for the LAN share server.
//!
//! Each handler is stateless: it validates its input, delegates to the upload
//! policy and the file store, and turns the outcome into a response. Failures
//! from the error taxonomy never escape as protocol errors; they become a
//! redirect back to the index page carrying the message.

use axum::body::Body;
use axum::extract::multipart::{Field, MultipartError, MultipartRejection};
use axum::extract::rejection::QueryRejection;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use futures_util::TryStreamExt;
use log::{error, info};
use serde::Deserialize;
use std::sync::Arc;
use tokio_util::io::ReaderStream;

use crate::error::ShareError;
use crate::protocol::page::{IndexView, render_index};
use crate::protocol::responses::{HandlerOutcome, internal_error, redirect_to_index};
use crate::registry::list_with_metadata;
use crate::server::AppState;

/// Multipart field carrying the uploaded file
pub const FILE_FIELD: &str = "file";

/// Status message passed back through the redirect
#[derive(Debug, Default, Deserialize)]
pub struct StatusQuery {
    pub success: Option<String>,
    pub error: Option<String>,
}

/// `GET /`: render the listing with any status message.
///
/// A query string that does not decode still renders the page, without a
/// status message.
pub async fn index(
    State(state): State<Arc<AppState>>,
    query: Result<Query<StatusQuery>, QueryRejection>,
) -> Response {
    let status = match query {
        Ok(Query(status)) => status,
        Err(rejection) => {
            info!("Ignoring unreadable status query: {rejection}");
            StatusQuery::default()
        }
    };

    let files = match list_with_metadata(&state.store).await {
        Ok(files) => files,
        Err(e) => {
            error!("Failed to read shared directory: {e}");
            return internal_error();
        }
    };

    let view = IndexView {
        local_ip: &state.local_ip,
        port: state.config.server_port,
        files: &files,
        success: status.success.as_deref().filter(|s| !s.is_empty()),
        error: status.error.as_deref().filter(|s| !s.is_empty()),
    };

    Html(render_index(&view)).into_response()
}

/// `POST /upload`: store the `file` field of a multipart form.
///
/// The `Multipart` extractor must stay last since it consumes the body.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let outcome = receive_upload(&state, &headers, multipart).await;
    redirect_to_index("upload", outcome)
}

async fn receive_upload(
    state: &AppState,
    headers: &HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> HandlerOutcome {
    let mut multipart = multipart.map_err(|rejection| {
        info!("Upload without a readable form: {rejection}");
        ShareError::NoFileSelected
    })?;

    let limit = state.policy.max_bytes();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| transport_error(e, limit))?
    {
        if field.name() == Some(FILE_FIELD) {
            return store_field(state, headers, field).await;
        }
    }

    Err(ShareError::NoFileSelected)
}

async fn store_field(
    state: &AppState,
    headers: &HeaderMap,
    field: Field<'_>,
) -> HandlerOutcome {
    let limit = state.policy.max_bytes();
    let client_name = field.file_name().unwrap_or_default().to_string();
    let stored_name = state
        .policy
        .plan(&state.store, &client_name, declared_length(headers))
        .await?;

    let body = field.map_err(move |e| transport_error(e, limit));
    let written = state.store.save(&stored_name, body, limit).await?;

    info!("Upload {client_name:?} stored as {stored_name} ({written} bytes)");
    Ok(format!("File uploaded successfully: {stored_name}"))
}

/// `GET /download/{filename}`: stream a stored file as an attachment.
pub async fn download(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Response {
    let (file, len) = match state.store.open_read(&filename).await {
        Ok(opened) => opened,
        Err(e) => return redirect_to_index("download", Err(e)),
    };

    info!("Sending {filename} ({len} bytes)");

    let mime = mime_guess::from_path(&filename).first_or_octet_stream();
    let disposition = attachment_disposition(&filename);

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, mime.to_string()),
            (header::CONTENT_LENGTH, len.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Body::from_stream(ReaderStream::new(file)),
    )
        .into_response()
}

/// `POST /delete/{filename}`: remove a stored file.
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Response {
    let outcome = state
        .store
        .remove(&filename)
        .await
        .map(|()| format!("File deleted: {filename}"));
    redirect_to_index("delete", outcome)
}

/// Map a failure while reading the form. Bodies cut off by the transport
/// limit report as `FileTooLarge`.
fn transport_error(err: MultipartError, limit: u64) -> ShareError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ShareError::FileTooLarge { limit }
    } else {
        ShareError::Io(std::io::Error::other(err.body_text()))
    }
}

/// `Content-Disposition` value.
///
/// The quoted `filename` is an ASCII fallback where characters a header cannot
/// carry become `_`. Names that needed a substitution also get an RFC 5987
/// `filename*` with the exact name percent-encoded as UTF-8.
fn attachment_disposition(filename: &str) -> String {
    let safe: String = filename
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_',
        })
        .collect();

    if safe == filename {
        format!("attachment; filename=\"{safe}\"")
    } else {
        format!(
            "attachment; filename=\"{safe}\"; filename*=UTF-8''{}",
            urlencoding::encode(filename)
        )
    }
}

fn declared_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disposition_is_always_a_valid_header() {
        assert_eq!(
            attachment_disposition("report.pdf"),
            "attachment; filename=\"report.pdf\""
        );
        assert_eq!(
            attachment_disposition("my \"quoted\" file.txt"),
            "attachment; filename=\"my _quoted_ file.txt\"; filename*=UTF-8''my%20%22quoted%22%20file.txt"
        );

        let value = attachment_disposition("naïve\r\n.txt");
        assert_eq!(
            value,
            "attachment; filename=\"na_ve__.txt\"; filename*=UTF-8''na%C3%AFve%0D%0A.txt"
        );
        assert!(axum::http::HeaderValue::from_str(&value).is_ok());
    }

    #[test]
    fn disposition_keeps_unicode_names() {
        let value = attachment_disposition("résumé 2024.pdf");
        assert_eq!(
            value,
            "attachment; filename=\"r_sum_ 2024.pdf\"; filename*=UTF-8''r%C3%A9sum%C3%A9%202024.pdf"
        );
        assert!(axum::http::HeaderValue::from_str(&value).is_ok());

        let encoded = value.split("UTF-8''").nth(1).unwrap();
        assert_eq!(urlencoding::decode(encoded).unwrap(), "résumé 2024.pdf");
    }

    #[test]
    fn declared_length_reads_content_length() {
        let mut headers = HeaderMap::new();
        assert_eq!(declared_length(&headers), None);

        headers.insert(header::CONTENT_LENGTH, "2048".parse().unwrap());
        assert_eq!(declared_length(&headers), Some(2048));

        headers.insert(header::CONTENT_LENGTH, "lots".parse().unwrap());
        assert_eq!(declared_length(&headers), None);
    }
}
