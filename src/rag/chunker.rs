//! Character-window text chunking with overlap.

/// Default chunk size in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 1200;
/// Default overlap between consecutive chunks in characters.
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

/// Splits text into overlapping character windows, preferring to break at
/// a sentence or paragraph boundary in the second half of the window.
pub struct TextChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextChunker {
    /// Create a chunker with explicit size and overlap (characters).
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
        }
    }

    /// Split text into chunks. Whitespace-only input yields nothing.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        if chars.len() <= self.chunk_size {
            let trimmed = text.trim();
            return if trimmed.is_empty() {
                Vec::new()
            } else {
                vec![trimmed.to_string()]
            };
        }

        let mut chunks = Vec::new();
        let mut start = 0;

        while start < chars.len() {
            let mut end = start + self.chunk_size;
            if end >= chars.len() {
                chunks.push(chars[start..].iter().collect::<String>());
                break;
            }

            // Break at the last period or newline, but only in the second
            // half of the window so chunks don't collapse.
            let window = &chars[start..end];
            if let Some(boundary) = window.iter().rposition(|c| *c == '.' || *c == '\n') {
                if boundary > self.chunk_size / 2 {
                    end = start + boundary + 1;
                }
            }

            chunks.push(chars[start..end].iter().collect::<String>());

            let next = end.saturating_sub(self.chunk_overlap);
            start = if next > start { next } else { end };
        }

        chunks
            .into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect()
    }
}

impl Default for TextChunker {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE, DEFAULT_CHUNK_OVERLAP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_one_chunk() {
        let chunker = TextChunker::default();
        let chunks = chunker.chunk("A short paragraph.");
        assert_eq!(chunks, vec!["A short paragraph."]);
    }

    #[test]
    fn empty_text_yields_nothing() {
        let chunker = TextChunker::default();
        assert!(chunker.chunk("   \n  ").is_empty());
    }

    #[test]
    fn chunks_respect_size_bound() {
        let chunker = TextChunker::new(100, 20);
        let text = "word ".repeat(200);
        for chunk in chunker.chunk(&text) {
            assert!(chunk.chars().count() <= 100);
        }
    }

    #[test]
    fn consecutive_chunks_overlap() {
        let chunker = TextChunker::new(100, 20);
        // No break characters, so windows are exact and the overlap shows.
        let text: String = ('a'..='z').cycle().take(300).collect();
        let chunks = chunker.chunk(&text);
        assert!(chunks.len() >= 3);

        let tail: String = chunks[0].chars().skip(80).collect();
        assert!(chunks[1].starts_with(&tail));
    }

    #[test]
    fn prefers_sentence_boundary() {
        let chunker = TextChunker::new(100, 10);
        let mut text = "x".repeat(80);
        text.push('.');
        text.push_str(&"y".repeat(80));

        let chunks = chunker.chunk(&text);
        assert!(chunks[0].ends_with('.'));
    }

    #[test]
    fn multibyte_text_is_handled() {
        let chunker = TextChunker::new(50, 10);
        let text = "日本語のテキスト。".repeat(30);
        let chunks = chunker.chunk(&text);
        assert!(!chunks.is_empty());
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 50);
        }
    }
}
