use crate::types::{AppError, Result};
use text_splitter::{ChunkConfig, TextSplitter};

/// Fixed-size character splitter with overlap.
///
/// Splits at the coarsest semantic boundary (paragraph, line, sentence,
/// word) that keeps chunks within `chunk_size` characters.
pub struct TextChunker {
    splitter: TextSplitter<text_splitter::Characters>,
}

impl TextChunker {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(AppError::InvalidInput(
                "chunk_size must be greater than 0".to_string(),
            ));
        }
        if chunk_overlap >= chunk_size {
            return Err(AppError::InvalidInput(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                chunk_overlap, chunk_size
            )));
        }

        let config = ChunkConfig::new(chunk_size)
            .with_overlap(chunk_overlap)
            .map_err(|e| AppError::InvalidInput(e.to_string()))?;

        Ok(Self {
            splitter: TextSplitter::new(config),
        })
    }

    pub fn chunk(&self, text: &str) -> Vec<String> {
        self.splitter
            .chunks(text)
            .map(str::to_string)
            .collect()
    }

    /// Chunk every document, concatenating the results in order.
    pub fn chunk_all(&self, documents: &[String]) -> Vec<String> {
        documents.iter().flat_map(|doc| self.chunk(doc)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_sizes() {
        assert!(TextChunker::new(0, 0).is_err());
        assert!(TextChunker::new(100, 100).is_err());
        assert!(TextChunker::new(100, 150).is_err());
        assert!(TextChunker::new(300, 50).is_ok());
    }

    #[test]
    fn test_short_text_single_chunk() {
        let chunker = TextChunker::new(300, 50).unwrap();
        assert_eq!(chunker.chunk("A short paragraph."), vec!["A short paragraph."]);
    }

    #[test]
    fn test_chunks_respect_size() {
        let chunker = TextChunker::new(100, 20).unwrap();
        let text = "Methane is a potent greenhouse gas. ".repeat(30);
        let chunks = chunker.chunk(&text);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 100, "chunk too long: {}", chunk.len());
        }
    }

    #[test]
    fn test_empty_text() {
        let chunker = TextChunker::new(300, 50).unwrap();
        assert!(chunker.chunk("").is_empty());
        assert!(chunker.chunk_all(&[]).is_empty());
    }

    #[test]
    fn test_chunk_all_preserves_document_order() {
        let chunker = TextChunker::new(300, 50).unwrap();
        let docs = vec!["first".to_string(), "second".to_string()];
        assert_eq!(chunker.chunk_all(&docs), vec!["first", "second"]);
    }
}
