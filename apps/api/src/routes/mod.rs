pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::documents::MAX_DOCUMENT_BYTES;
use crate::state::AppState;

/// Two documents plus headroom for multipart framing.
const MAX_REQUEST_BYTES: usize = 2 * MAX_DOCUMENT_BYTES + 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/analyze", post(handlers::handle_analyze))
        .route("/api/v1/rate-limit", get(handlers::handle_rate_limit))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BYTES))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::analysis::orchestrator::tests::{
        MockExtractor, MockGateway, CV_PDF, GOOD_REPLY, JOB_PDF,
    };
    use crate::analysis::orchestrator::AnalysisOrchestrator;
    use crate::rate_limit::RateAdmissionController;

    const BOUNDARY: &str = "cvfit-test-boundary";

    fn app() -> Router {
        let orchestrator = AnalysisOrchestrator::new(
            Arc::new(RateAdmissionController::new()),
            Arc::new(MockExtractor::standard()),
            Arc::new(MockGateway::replying(GOOD_REPLY)),
        );
        build_router(AppState {
            analyzer: Arc::new(orchestrator),
        })
    }

    fn multipart_request(parts: &[(&str, &str, &[u8])]) -> Request<Body> {
        let mut body = Vec::new();
        for (name, content_type, data) in parts {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{name}.pdf\"\r\nContent-Type: {content_type}\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/v1/analyze")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .header("x-client-id", "router-test")
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["endpoint"], "Alternate");
    }

    #[tokio::test]
    async fn test_analyze_success() {
        let request = multipart_request(&[
            ("jobDescription", "application/pdf", JOB_PDF),
            ("cv", "application/pdf", CV_PDF),
        ]);
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["overallMatch"], 82);
        assert_eq!(body["metadata"]["cvPages"], 3);
        assert_eq!(body["metadata"]["remainingRequests"]["minute"], 19);
        assert_eq!(body["metadata"]["endpointUsed"], "Alternate");
    }

    #[tokio::test]
    async fn test_pdf_content_type_with_parameters_is_accepted() {
        let request = multipart_request(&[
            ("jobDescription", "Application/PDF", JOB_PDF),
            ("cv", "application/pdf; name=cv.pdf", CV_PDF),
        ]);
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_cv_part_is_400() {
        let request = multipart_request(&[("jobDescription", "application/pdf", JOB_PDF)]);
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "BAD_REQUEST");
        assert!(body["error"]["message"].as_str().unwrap().contains("'cv'"));
    }

    #[tokio::test]
    async fn test_non_pdf_content_type_is_400() {
        let request = multipart_request(&[
            ("jobDescription", "application/pdf", JOB_PDF),
            ("cv", "text/plain", b"hello"),
        ]);
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_bad_header_is_400_with_document_name() {
        let request = multipart_request(&[
            ("jobDescription", "application/pdf", JOB_PDF),
            ("cv", "application/pdf", b"GIF89a"),
        ]);
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .starts_with("CV: Invalid PDF format"));
    }

    #[tokio::test]
    async fn test_unreadable_document_is_500() {
        let request = multipart_request(&[
            ("jobDescription", "application/pdf", JOB_PDF),
            ("cv", "application/pdf", b"%PDF-1.4\ncorrupt"),
        ]);
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "INTERNAL_ERROR");
    }

    #[tokio::test]
    async fn test_rate_limit_route_reports_full_window() {
        let response = app()
            .oneshot(
                Request::get("/api/v1/rate-limit")
                    .header("x-client-id", "fresh")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["minute"], 20);
        assert_eq!(body["hour"], 300);
    }
}
