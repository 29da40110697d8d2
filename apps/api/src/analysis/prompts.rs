//! Prompt construction for the compatibility analysis.
//!
//! Deterministic: the same two texts always produce the same prompt. Both texts
//! are embedded verbatim in a single formatting pass, so placeholder-looking
//! content inside a document is never re-substituted.

use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;

/// Evaluation dimensions the model is asked to weigh, in prompt order.
pub const EVALUATION_DIMENSIONS: [&str; 6] = [
    "Technical skills alignment",
    "Experience relevance",
    "Cultural fit indicators",
    "Education and certification match",
    "Soft skills",
    "Growth potential",
];

/// The exact object shape the normalizer expects back.
const RESPONSE_SCHEMA: &str = r#"{
  "overallMatch": <integer 0-100>,
  "strengths": ["<strength of the candidate for this role>"],
  "weaknesses": ["<weakness or concern>"],
  "recommendations": ["<actionable recommendation for the candidate>"],
  "keyAlignments": ["<where the CV directly meets a job requirement>"],
  "missingSkills": ["<required skill absent from the CV>"],
  "summary": "<two or three sentence overall assessment>"
}"#;

pub fn build_analysis_prompt(candidate_text: &str, job_text: &str) -> String {
    let dimensions = EVALUATION_DIMENSIONS
        .iter()
        .enumerate()
        .map(|(i, d)| format!("{}. {d}", i + 1))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are an expert technical recruiter. Compare the candidate CV against the job description and assess how well the candidate fits the role.

JOB DESCRIPTION:
{job_text}

CANDIDATE CV:
{candidate_text}

Evaluate the candidate on these dimensions:
{dimensions}

Return a JSON object with this EXACT schema (no extra fields):
{RESPONSE_SCHEMA}

{JSON_ONLY_INSTRUCTION}"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_is_deterministic() {
        let a = build_analysis_prompt("Rust dev, 6 years", "Senior Rust Engineer");
        let b = build_analysis_prompt("Rust dev, 6 years", "Senior Rust Engineer");
        assert_eq!(a, b);
    }

    #[test]
    fn test_prompt_embeds_both_texts_verbatim() {
        let prompt = build_analysis_prompt("CANDIDATE-MARKER built {x}", "JOB-MARKER wants {y}");
        assert!(prompt.contains("CANDIDATE-MARKER built {x}"));
        assert!(prompt.contains("JOB-MARKER wants {y}"));
        assert!(prompt.find("JOB-MARKER").unwrap() < prompt.find("CANDIDATE-MARKER").unwrap());
    }

    #[test]
    fn test_prompt_names_all_seven_keys() {
        let prompt = build_analysis_prompt("cv", "jd");
        for key in [
            "\"overallMatch\"",
            "\"strengths\"",
            "\"weaknesses\"",
            "\"recommendations\"",
            "\"keyAlignments\"",
            "\"missingSkills\"",
            "\"summary\"",
        ] {
            assert!(prompt.contains(key), "missing {key}");
        }
    }

    #[test]
    fn test_prompt_lists_every_dimension() {
        let prompt = build_analysis_prompt("cv", "jd");
        for dimension in EVALUATION_DIMENSIONS {
            assert!(prompt.contains(dimension), "missing {dimension}");
        }
        assert!(prompt.contains("6. Growth potential"));
    }
}
