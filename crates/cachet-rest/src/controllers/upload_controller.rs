//! Upload controller: multipart upload and file download.

use crate::{responses::AppError, state::AppState};
use axum::{
    body::Body,
    extract::{
        multipart::{Field, MultipartError, MultipartRejection},
        DefaultBodyLimit, Multipart, Path, State,
    },
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use bytes::BytesMut;
use cachet_core::CachetError;
use cachet_service::{IncomingFile, UploadResponse};
use tracing::{debug, warn};

/// Room for multipart framing and other form fields on top of the file.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Creates the upload router. `max_file_size` sizes the request body limit.
pub fn router(max_file_size: u64) -> Router<AppState> {
    let body_limit = usize::try_from(max_file_size)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        .route(
            "/upload",
            post(upload_file).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/download/:filename", get(download_file))
}

fn message(status: StatusCode, text: impl Into<String>) -> Response {
    (status, Json(UploadResponse::message(text))).into_response()
}

/// Classifies a failed body read. Hitting the request body limit means the
/// file is over the size limit; anything else is a malformed request.
fn read_error(e: &MultipartError, limit: u64, declared: Option<u64>) -> CachetError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        let floor = limit.saturating_add(1);
        CachetError::TooLarge {
            size: declared.map_or(floor, |size| size.max(floor)),
            limit,
        }
    } else {
        CachetError::validation(e.body_text())
    }
}

fn declared_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse().ok())
}

/// Reads a field into memory, stopping after `cap` bytes.
async fn read_capped(
    field: &mut Field<'_>,
    cap: usize,
    limit: u64,
    declared: Option<u64>,
) -> Result<bytes::Bytes, CachetError> {
    let mut buf = BytesMut::new();
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| read_error(&e, limit, declared))?
    {
        let room = cap - buf.len();
        if chunk.len() >= room {
            buf.extend_from_slice(&chunk[..room]);
            break;
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(buf.freeze())
}

/// Accept a single file.
///
/// At most `max_file_size + 1` bytes are read, enough to tell an oversized
/// file apart without buffering all of it. A body over the request limit
/// is reported as too large before any field is seen.
async fn upload_file(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let Ok(mut multipart) = multipart else {
        return message(StatusCode::BAD_REQUEST, "No file selected!");
    };

    let limits = state.upload_gateway.limits().clone();
    let cap = usize::try_from(limits.max_file_size)
        .unwrap_or(usize::MAX)
        .saturating_add(1);
    let declared = declared_length(&headers);

    let mut incoming = None;
    loop {
        let mut field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                let error = read_error(&e, limits.max_file_size, declared);
                debug!("Upload rejected while reading: {}", error);
                return message(StatusCode::BAD_REQUEST, error.to_string());
            }
        };

        // Text fields carry no file, and browsers send an empty file name
        // when nothing was picked.
        let Some(original_name) = field.file_name().filter(|n| !n.is_empty()).map(str::to_string)
        else {
            continue;
        };
        let field_name = field.name().unwrap_or_default().to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();

        let bytes = match read_capped(&mut field, cap, limits.max_file_size, declared).await {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!("Upload rejected while reading: {}", e);
                return message(StatusCode::BAD_REQUEST, e.to_string());
            }
        };

        incoming = Some(IncomingFile {
            field_name,
            original_name,
            content_type,
            bytes,
        });
        break;
    }

    let Some(file) = incoming else {
        return message(StatusCode::BAD_REQUEST, "No file selected!");
    };

    match state.upload_gateway.upload(file).await {
        Ok(asset) => {
            debug!("Upload stored as {}", asset.stored_name);
            Json(UploadResponse::uploaded(&state.upload_dir_label, &asset.stored_name))
                .into_response()
        }
        Err(e) if e.is_validation() => {
            debug!("Upload rejected: {}", e);
            message(StatusCode::BAD_REQUEST, e.to_string())
        }
        Err(e) => AppError::from(e).into_response(),
    }
}

/// Stream a stored file as an attachment.
async fn download_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Response {
    let download = match state.upload_gateway.download(&filename).await {
        Ok(download) => download,
        Err(CachetError::NotFound { .. }) => {
            return message(StatusCode::NOT_FOUND, "File not found!");
        }
        Err(e) => return AppError::from(e).into_response(),
    };

    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        download.file_name.replace(|c: char| c == '"' || c == '\\', "_")
    ))
    .unwrap_or_else(|_| {
        warn!("File name not representable in a header: {:?}", download.file_name);
        HeaderValue::from_static("attachment")
    });

    (
        StatusCode::OK,
        [
            (CONTENT_TYPE, HeaderValue::from_static(download.content_type)),
            (CONTENT_LENGTH, HeaderValue::from(download.size)),
            (CONTENT_DISPOSITION, disposition),
        ],
        Body::from_stream(download.stream),
    )
        .into_response()
}
