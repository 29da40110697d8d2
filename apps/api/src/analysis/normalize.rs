//! Response normalization: recover the analysis object from free-form model
//! text and coerce it into a fully populated `AnalysisResult`.
//!
//! Recovery is a heuristic. The span from the first `{` to the last `}` is
//! parsed as JSON; without braces the whole reply is tried instead. A reply with
//! two top-level objects yields an invalid span and fails with `ParseError`.

use serde_json::Value;
use thiserror::Error;

use crate::analysis::models::AnalysisResult;

pub const SUMMARY_PLACEHOLDER: &str = "No summary provided.";

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Failed to parse AI response as JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse AI response: expected a JSON object, found {0}")]
    NotAnObject(&'static str),
}

pub fn normalize_response(raw: &str) -> Result<AnalysisResult, ParseError> {
    let candidate = locate_json_object(raw);
    let value: Value = serde_json::from_str(candidate)?;
    let Value::Object(_) = value else {
        return Err(ParseError::NotAnObject(json_kind(&value)));
    };

    Ok(AnalysisResult {
        overall_match: coerce_score(value.get("overallMatch")),
        strengths: coerce_string_list(value.get("strengths")),
        weaknesses: coerce_string_list(value.get("weaknesses")),
        recommendations: coerce_string_list(value.get("recommendations")),
        key_alignments: coerce_string_list(value.get("keyAlignments")),
        missing_skills: coerce_string_list(value.get("missingSkills")),
        summary: value
            .get("summary")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(SUMMARY_PLACEHOLDER)
            .to_string(),
    })
}

/// First `{` through last `}` of the fence-stripped reply, or the whole reply.
fn locate_json_object(raw: &str) -> &str {
    let text = strip_json_fences(raw);
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start <= end => &text[start..=end],
        _ => text,
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let inner = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"));
    match inner {
        Some(stripped) => stripped
            .trim_start()
            .strip_suffix("```")
            .map(str::trim)
            .unwrap_or(stripped.trim_start()),
        None => text,
    }
}

/// Clamps into 0..=100; absent or non-numeric values score 0.
fn coerce_score(value: Option<&Value>) -> u8 {
    let score = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().trim_end_matches('%').parse::<f64>().ok(),
        _ => None,
    };
    score
        .filter(|s| s.is_finite())
        .map(|s| s.round().clamp(0.0, 100.0) as u8)
        .unwrap_or(0)
}

/// Non-arrays become empty; non-string items are dropped.
fn coerce_string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
