//! Axum route handlers for the Analysis API.

use axum::{
    extract::{Multipart, State},
    http::HeaderMap,
    Json,
};
use bytes::Bytes;

use crate::analysis::models::AnalysisResponse;
use crate::documents::{MAX_DOCUMENT_BYTES, MIME_PDF};
use crate::errors::AppError;
use crate::rate_limit::RemainingRequests;
use crate::state::AppState;

pub const JOB_DESCRIPTION_FIELD: &str = "jobDescription";
pub const CV_FIELD: &str = "cv";

/// POST /api/v1/analyze
///
/// Multipart upload of two PDFs, `jobDescription` and `cv`.
/// Returns the normalized analysis plus a metadata envelope.
pub async fn handle_analyze(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<AnalysisResponse>, AppError> {
    let mut job_description: Option<Bytes> = None;
    let mut cv: Option<Bytes> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name != JOB_DESCRIPTION_FIELD && name != CV_FIELD {
            continue;
        }
        if let Some(content_type) = field.content_type() {
            if !is_pdf_media_type(content_type) {
                return Err(AppError::BadRequest(format!(
                    "'{name}' must be a PDF file (got {content_type})"
                )));
            }
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read '{name}': {e}")))?;
        if data.len() > MAX_DOCUMENT_BYTES {
            return Err(AppError::PayloadTooLarge(format!(
                "'{name}' exceeds the {} MiB limit",
                MAX_DOCUMENT_BYTES / (1024 * 1024)
            )));
        }

        if name == JOB_DESCRIPTION_FIELD {
            job_description = Some(data);
        } else {
            cv = Some(data);
        }
    }

    let job_description = job_description.ok_or_else(|| {
        AppError::BadRequest(format!("Missing '{JOB_DESCRIPTION_FIELD}' PDF file"))
    })?;
    let cv = cv.ok_or_else(|| AppError::BadRequest(format!("Missing '{CV_FIELD}' PDF file")))?;

    let caller = caller_identifier(&headers);
    let response = state
        .analyzer
        .analyze(job_description, cv, caller.as_deref())
        .await?;

    Ok(Json(response))
}

/// GET /api/v1/rate-limit
///
/// Requests still available to the caller in each admission window.
pub async fn handle_rate_limit(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<RemainingRequests> {
    let caller = caller_identifier(&headers);
    Json(state.analyzer.remaining(caller.as_deref()))
}

/// Compares the media type only, ignoring case and any `;` parameters.
fn is_pdf_media_type(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(str::trim)
        .is_some_and(|media| media.eq_ignore_ascii_case(MIME_PDF))
}

/// `x-client-id`, else the first `x-forwarded-for` hop.
fn caller_identifier(headers: &HeaderMap) -> Option<String> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    header("x-client-id")
        .or_else(|| {
            header("x-forwarded-for")
                .and_then(|v| v.split(',').next())
                .map(str::trim)
        })
        .map(String::from)
}
