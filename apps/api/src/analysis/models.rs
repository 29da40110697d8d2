use serde::{Deserialize, Serialize};

use crate::llm_client::EndpointVariant;
use crate::rate_limit::RemainingRequests;

/// Cleaned text of both documents, ready for prompting.
/// Only built once both uploads passed validation and extraction.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub job_description_text: String,
    pub candidate_text: String,
}

/// Normalized compatibility analysis. Always fully populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// 0..=100
    pub overall_match: u8,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendations: Vec<String>,
    pub key_alignments: Vec<String>,
    pub missing_skills: Vec<String>,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisMetadata {
    pub job_description_pages: usize,
    pub cv_pages: usize,
    /// RFC 3339 / ISO-8601, UTC.
    pub analysis_timestamp: String,
    pub remaining_requests: RemainingRequests,
    pub endpoint_used: EndpointVariant,
}

/// Success body of `POST /api/v1/analyze`: the result fields plus `metadata`.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResponse {
    #[serde(flatten)]
    pub result: AnalysisResult,
    pub metadata: AnalysisMetadata,
}
