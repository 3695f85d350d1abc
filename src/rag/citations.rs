//! Citation extraction from generated answer text.
//!
//! Two passes over the response:
//! 1. Explicit `[Document, Page N]` patterns, resolved against the retrieved
//!    chunks by case-insensitive document-name containment plus exact page
//!    match.
//! 2. A heuristic pass crediting any of the top-3 chunks whose document name
//!    appears anywhere in the response, even without the bracket pattern.
//!
//! Citations are de-duplicated by `(document, page)`; the first occurrence
//! wins.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use tracing::info;

use crate::types::{Chunk, Citation};

const SNIPPET_CHARS: usize = 200;

fn citation_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // The pattern is a fixed literal, compile failure is unreachable.
        Regex::new(r"(?i)\[([^\]]+),\s*Page\s*(\d+)\]").unwrap()
    })
}

/// First `SNIPPET_CHARS` characters of the chunk text, cut on a char
/// boundary.
fn snippet(content: &str) -> String {
    content.chars().take(SNIPPET_CHARS).collect()
}

fn citation_for(chunk: &Chunk) -> Citation {
    Citation {
        document: chunk.document.clone(),
        page: chunk.page,
        section: (!chunk.section.is_empty()).then(|| chunk.section.clone()),
        text: snippet(&chunk.content),
        score: chunk.score,
    }
}

/// Extract citations from a generated response.
///
/// `chunks` must be the retrieval result in descending-score order; the
/// heuristic pass only considers the first three.
pub fn extract_citations(response: &str, chunks: &[Chunk]) -> Vec<Citation> {
    let mut citations = Vec::new();
    let mut seen: HashSet<(String, u32)> = HashSet::new();
    let response_lower = response.to_lowercase();

    for capture in citation_pattern().captures_iter(response) {
        let doc_name = capture[1].trim().to_lowercase();
        let Ok(page) = capture[2].parse::<u32>() else {
            continue;
        };

        for chunk in chunks {
            if chunk.document.to_lowercase().contains(&doc_name) && chunk.page == page {
                if seen.insert((chunk.document.clone(), chunk.page)) {
                    citations.push(citation_for(chunk));
                }
                break;
            }
        }
    }

    // Top chunks mentioned by name are credited even without brackets.
    for chunk in chunks.iter().take(3) {
        if response_lower.contains(&chunk.document.to_lowercase())
            && seen.insert((chunk.document.clone(), chunk.page))
        {
            citations.push(citation_for(chunk));
        }
    }

    info!(count = citations.len(), "extracted citations from response");
    citations
}
