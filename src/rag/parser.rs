//! Document parser port.
//!
//! Extraction backends (PDF, DOCX, OCR) live outside this crate; ingestion
//! consumes them through this trait. [`PlainTextParser`] handles the
//! trivial case and backs the tests.

use async_trait::async_trait;

use crate::types::{AppError, DocumentContent, DocumentPage, Result};

/// Port for extracting page-segmented text from raw document bytes.
#[async_trait]
pub trait DocumentParser: Send + Sync {
    /// Extract text from a document.
    ///
    /// Pages come back in document order with 1-based numbering.
    async fn parse(&self, data: &[u8], filename: &str) -> Result<DocumentContent>;

    /// File extensions this parser accepts, lowercase without dots.
    fn supported_extensions(&self) -> &[&str];
}

/// Parser for plain UTF-8 text. Pages are split on form feed characters.
#[derive(Debug, Clone, Default)]
pub struct PlainTextParser;

#[async_trait]
impl DocumentParser for PlainTextParser {
    async fn parse(&self, data: &[u8], filename: &str) -> Result<DocumentContent> {
        let text = std::str::from_utf8(data).map_err(|e| {
            AppError::Validation(format!("{} is not valid UTF-8 text: {}", filename, e))
        })?;

        let pages: Vec<DocumentPage> = text
            .split('\u{c}')
            .enumerate()
            .map(|(i, page_text)| DocumentPage {
                number: (i + 1) as u32,
                text: page_text.to_string(),
                section_title: None,
            })
            .collect();

        let total_chars = pages.iter().map(|p| p.text.chars().count()).sum();
        Ok(DocumentContent {
            page_count: pages.len(),
            total_chars,
            pages,
            extraction_method: "plain_text".to_string(),
        })
    }

    fn supported_extensions(&self) -> &[&str] {
        &["txt", "md"]
    }
}
