//! Cheap structural checks on raw upload bytes, run before extraction.

use serde::Serialize;

use crate::documents::MAX_DOCUMENT_BYTES;

const PDF_MAGIC: &[u8] = b"%PDF";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub error: Option<String>,
}

impl ValidationReport {
    fn valid() -> Self {
        Self {
            is_valid: true,
            error: None,
        }
    }

    fn invalid(error: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            error: Some(error.into()),
        }
    }
}

/// Validates that `bytes` looks like a PDF of acceptable size.
///
/// FAIL conditions (checked in order):
/// - first four bytes are not `%PDF` (an empty buffer fails here)
/// - length exceeds 10 MiB
pub fn validate_pdf(bytes: &[u8]) -> ValidationReport {
    if !bytes.starts_with(PDF_MAGIC) {
        return ValidationReport::invalid("Invalid PDF format: missing %PDF header");
    }
    if bytes.len() > MAX_DOCUMENT_BYTES {
        return ValidationReport::invalid(format!(
            "PDF file too large: {} bytes exceeds the {} MiB limit",
            bytes.len(),
            MAX_DOCUMENT_BYTES / (1024 * 1024)
        ));
    }
    ValidationReport::valid()
}
