use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::analysis::normalize::ParseError;
use crate::documents::extract::ExtractionError;
use crate::documents::DocumentKind;
use crate::llm_client::GatewayError;

/// Every way a single analysis can fail, one variant per pipeline stage.
///
/// Only `Validation` is user-correctable; everything else is internal-class.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("{0}")]
    Validation(String),

    #[error("{document} text extraction failed: {source}")]
    Extraction {
        document: DocumentKind,
        #[source]
        source: ExtractionError,
    },

    #[error("{0}")]
    AdmissionRejected(String),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl AnalysisError {
    pub fn is_bad_request(&self) -> bool {
        matches!(self, AnalysisError::Validation(_))
    }

    /// Pipeline stage the failure originated from, used as a log field.
    pub fn component(&self) -> &'static str {
        match self {
            AnalysisError::Validation(_) => "validation",
            AnalysisError::Extraction { .. } => "extraction",
            AnalysisError::AdmissionRejected(_) => "admission",
            AnalysisError::Gateway(_) => "gateway",
            AnalysisError::Parse(_) => "normalize",
        }
    }
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<AnalysisError> for AppError {
    fn from(err: AnalysisError) -> Self {
        if err.is_bad_request() {
            AppError::BadRequest(err.to_string())
        } else {
            AppError::Internal(err.to_string())
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            AppError::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", msg)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg)
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_bad_request() {
        let err = AnalysisError::Validation("CV: Invalid PDF format".to_string());
        assert!(err.is_bad_request());
        match AppError::from(err) {
            AppError::BadRequest(msg) => assert_eq!(msg, "CV: Invalid PDF format"),
            other => panic!("expected BadRequest, got {other:?}"),
        }
    }

    #[test]
    fn test_admission_rejection_is_internal_with_reason_verbatim() {
        let reason = "Rate limit exceeded: maximum 20 requests per minute";
        let err = AnalysisError::AdmissionRejected(reason.to_string());
        assert!(!err.is_bad_request());
        match AppError::from(err) {
            AppError::Internal(msg) => assert_eq!(msg, reason),
            other => panic!("expected Internal, got {other:?}"),
        }
    }

    #[test]
    fn test_gateway_error_keeps_remote_message() {
        let err: AnalysisError = GatewayError::Transport("quota project missing".to_string()).into();
        assert_eq!(err.component(), "gateway");
        assert!(AppError::from(err).to_string().contains("quota project missing"));
    }

    #[test]
    fn test_status_codes() {
        let bad = AppError::BadRequest("x".to_string()).into_response();
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
        let internal = AppError::Internal("x".to_string()).into_response();
        assert_eq!(internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
