//! Text extraction adapter over the PDF parser.
//!
//! The parser is CPU-bound and may panic on hostile input, so it runs on the
//! blocking pool and both failure modes surface as `ExtractionError`.

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use lopdf::{Document, Object};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("PDF parsing failed: {0}")]
    Parse(String),

    #[error("PDF is encrypted")]
    Encrypted,

    #[error("extraction task aborted: {0}")]
    Task(String),
}

/// Text and structure pulled out of one uploaded document.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedDocument {
    pub text: String,
    pub page_count: usize,
    /// Entries of the PDF Info dictionary (Title, Author, Producer, ...).
    pub raw_metadata: HashMap<String, String>,
}

/// Swappable extraction backend. The orchestrator holds an `Arc<dyn TextExtractor>`.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, bytes: Bytes) -> Result<ExtractedDocument, ExtractionError>;
}

/// Default backend: lopdf for structure, pdf-extract for text.
pub struct PdfTextExtractor;

#[async_trait]
impl TextExtractor for PdfTextExtractor {
    async fn extract(&self, bytes: Bytes) -> Result<ExtractedDocument, ExtractionError> {
        tokio::task::spawn_blocking(move || extract_pdf(&bytes))
            .await
            .map_err(|e| ExtractionError::Task(e.to_string()))?
    }
}

fn extract_pdf(bytes: &[u8]) -> Result<ExtractedDocument, ExtractionError> {
    let doc = Document::load_mem(bytes).map_err(|e| ExtractionError::Parse(e.to_string()))?;
    if doc.trailer.get(b"Encrypt").is_ok() {
        return Err(ExtractionError::Encrypted);
    }

    let page_count = doc.get_pages().len();
    let raw_metadata = read_info_dictionary(&doc);

    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| ExtractionError::Parse(e.to_string()))?;

    debug!(page_count, chars = text.len(), "PDF text extracted");

    Ok(ExtractedDocument {
        text,
        page_count,
        raw_metadata,
    })
}

fn read_info_dictionary(doc: &Document) -> HashMap<String, String> {
    let info = match doc.trailer.get(b"Info") {
        Ok(Object::Reference(id)) => doc.get_object(*id).ok(),
        Ok(other) => Some(other),
        Err(_) => None,
    };
    let Some(Object::Dictionary(dict)) = info else {
        return HashMap::new();
    };

    dict.iter()
        .filter_map(|(key, value)| {
            let value = match value {
                Object::String(raw, _) => decode_pdf_string(raw),
                Object::Name(name) => String::from_utf8_lossy(name).into_owned(),
                Object::Integer(i) => i.to_string(),
                Object::Boolean(b) => b.to_string(),
                _ => return None,
            };
            Some((String::from_utf8_lossy(key).into_owned(), value))
        })
        .collect()
}

/// Text strings are UTF-16BE when they carry a BOM, PDFDocEncoding otherwise.
fn decode_pdf_string(raw: &[u8]) -> String {
    match raw.strip_prefix(&[0xFE, 0xFF]) {
        Some(utf16) => {
            let units: Vec<u16> = utf16
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        // PDFDocEncoding agrees with Latin-1 for printable text.
        None => raw.iter().map(|&b| b as char).collect(),
    }
}

/// Collapses every line-break variant and whitespace run to a single space
/// and trims the ends.
pub fn clean_text(text: &str) -> String {
    text.replace("\r\n", " ")
        .replace(['\r', '\n'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
