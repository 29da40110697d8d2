//! Analysis orchestrator, the single public operation of the analysis core.
//!
//! Flow: validate both uploads → extract both concurrently → clean text →
//!       admission check → build prompt → model call → normalize → envelope.
//!
//! Fail-fast: the first failing step ends the analysis with no partial result,
//! and nothing is retried.

use std::sync::Arc;

use bytes::Bytes;
use chrono::{SecondsFormat, Utc};
use tracing::{debug, error, info, info_span, Instrument};
use uuid::Uuid;

use crate::analysis::models::{AnalysisMetadata, AnalysisRequest, AnalysisResponse};
use crate::analysis::normalize::normalize_response;
use crate::analysis::prompts::build_analysis_prompt;
use crate::documents::extract::{clean_text, ExtractedDocument, TextExtractor};
use crate::documents::validator::validate_pdf;
use crate::documents::DocumentKind;
use crate::errors::AnalysisError;
use crate::llm_client::{EndpointVariant, ModelGateway};
use crate::rate_limit::{RateAdmissionController, RemainingRequests, DEFAULT_IDENTIFIER};

/// Composes validator, extractor, admission gate, prompt builder, gateway and
/// normalizer. Held by `AppState` behind an `Arc`; cheap to share.
pub struct AnalysisOrchestrator {
    limiter: Arc<RateAdmissionController>,
    extractor: Arc<dyn TextExtractor>,
    gateway: Arc<dyn ModelGateway>,
}

impl AnalysisOrchestrator {
    pub fn new(
        limiter: Arc<RateAdmissionController>,
        extractor: Arc<dyn TextExtractor>,
        gateway: Arc<dyn ModelGateway>,
    ) -> Self {
        Self {
            limiter,
            extractor,
            gateway,
        }
    }

    pub fn endpoint_variant(&self) -> EndpointVariant {
        self.gateway.variant()
    }

    pub fn remaining(&self, caller: Option<&str>) -> RemainingRequests {
        self.limiter.remaining(resolve_caller(caller))
    }

    /// Runs one full analysis. `caller` partitions admission state; blank or
    /// absent callers share the default window.
    pub async fn analyze(
        &self,
        job_bytes: Bytes,
        cv_bytes: Bytes,
        caller: Option<&str>,
    ) -> Result<AnalysisResponse, AnalysisError> {
        let caller = resolve_caller(caller);
        let span = info_span!("analysis", analysis_id = %Uuid::new_v4(), caller);

        self.run(job_bytes, cv_bytes, caller)
            .instrument(span.clone())
            .await
            .inspect_err(|e| {
                span.in_scope(|| error!(component = e.component(), error = %e, "analysis failed"));
            })
    }

    async fn run(
        &self,
        job_bytes: Bytes,
        cv_bytes: Bytes,
        caller: &str,
    ) -> Result<AnalysisResponse, AnalysisError> {
        // 1. Structural validation, before any extraction cost is spent.
        for (kind, bytes) in [
            (DocumentKind::JobDescription, &job_bytes),
            (DocumentKind::Cv, &cv_bytes),
        ] {
            let report = validate_pdf(bytes);
            if !report.is_valid {
                return Err(AnalysisError::Validation(format!(
                    "{kind}: {}",
                    report.error.unwrap_or_default()
                )));
            }
        }

        // 2. Extract both documents concurrently; the first failure wins.
        let (job_doc, cv_doc) = tokio::try_join!(
            self.extract(DocumentKind::JobDescription, job_bytes),
            self.extract(DocumentKind::Cv, cv_bytes),
        )?;

        // 3. Clean text; an empty document is the uploader's problem.
        let request = AnalysisRequest {
            job_description_text: readable_text(DocumentKind::JobDescription, &job_doc)?,
            candidate_text: readable_text(DocumentKind::Cv, &cv_doc)?,
        };

        // 4. Admission. No suspension point between check and slot use.
        let decision = self.limiter.check(caller);
        if !decision.allowed {
            return Err(AnalysisError::AdmissionRejected(
                decision.reason.unwrap_or_default(),
            ));
        }

        // 5. Prompt, model call, normalization.
        let prompt = build_analysis_prompt(&request.candidate_text, &request.job_description_text);
        debug!(prompt_chars = prompt.len(), "invoking model gateway");
        let raw = self.gateway.invoke(&prompt).await?;
        let result = normalize_response(&raw)?;

        // 6. Envelope.
        let metadata = AnalysisMetadata {
            job_description_pages: job_doc.page_count,
            cv_pages: cv_doc.page_count,
            analysis_timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            remaining_requests: self.limiter.remaining(caller),
            endpoint_used: self.gateway.variant(),
        };

        info!(
            overall_match = result.overall_match,
            endpoint = ?metadata.endpoint_used,
            remaining_minute = metadata.remaining_requests.minute,
            "analysis complete"
        );

        Ok(AnalysisResponse { result, metadata })
    }

    async fn extract(
        &self,
        document: DocumentKind,
        bytes: Bytes,
    ) -> Result<ExtractedDocument, AnalysisError> {
        let extracted = self
            .extractor
            .extract(bytes)
            .await
            .map_err(|source| AnalysisError::Extraction { document, source })?;
        debug!(
            %document,
            pages = extracted.page_count,
            title = ?extracted.raw_metadata.get("Title"),
            "document extracted"
        );
        Ok(extracted)
    }
}

fn resolve_caller(caller: Option<&str>) -> &str {
    caller
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_IDENTIFIER)
}

fn readable_text(kind: DocumentKind, doc: &ExtractedDocument) -> Result<String, AnalysisError> {
    let text = clean_text(&doc.text);
    if text.is_empty() {
        return Err(AnalysisError::Validation(format!(
            "{kind}: no readable text found in PDF"
        )));
    }
    Ok(text)
}
