// Document intake: header/size validation, then text extraction.
// Both run before any admission check or remote call is made.

pub mod extract;
pub mod validator;

use std::fmt;

use serde::Serialize;

/// Upper bound on a single uploaded document, enforced again in `validator`.
pub const MAX_DOCUMENT_BYTES: usize = 10 * 1024 * 1024;

pub const MIME_PDF: &str = "application/pdf";

/// Which of the two uploaded documents a failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DocumentKind {
    JobDescription,
    Cv,
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::JobDescription => f.write_str("Job description"),
            DocumentKind::Cv => f.write_str("CV"),
        }
    }
}
