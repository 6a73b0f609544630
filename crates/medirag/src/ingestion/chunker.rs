//! Text chunking with page and position tracking

use unicode_segmentation::UnicodeSegmentation;

use crate::types::{Chunk, ChunkSource, Document};

use super::parser::ParsedDocument;

/// Text chunker with configurable size and overlap
pub struct TextChunker {
    /// Target chunk size in characters
    chunk_size: usize,
    /// Overlap between chunks
    overlap: usize,
    /// Minimum chunk size
    min_size: usize,
}

impl TextChunker {
    /// Create a new chunker
    pub fn new(chunk_size: usize, overlap: usize, min_size: usize) -> Self {
        Self {
            chunk_size,
            overlap,
            min_size,
        }
    }

    /// Chunk a parsed document
    pub fn chunk_document(&self, doc: &Document, parsed: &ParsedDocument) -> Vec<Chunk> {
        if parsed.pages.len() > 1 {
            let mut chunks = Vec::new();
            for page in &parsed.pages {
                let source = ChunkSource::pdf(
                    doc.filename.clone(),
                    page.page_number,
                    parsed.total_pages.unwrap_or(page.page_number),
                );
                let page_chunks = self.chunk_text(
                    &page.content,
                    source,
                    doc,
                    page.char_offset,
                    chunks.len() as u32,
                );
                chunks.extend(page_chunks);
            }
            chunks
        } else {
            let content = parsed
                .pages
                .first()
                .map(|p| p.content.as_str())
                .unwrap_or(parsed.content.as_str());
            let source = ChunkSource::text(doc.filename.clone(), parsed.file_type.clone());
            self.chunk_text(content, source, doc, 0, 0)
        }
    }

    /// Chunk a text span into overlapping sentence-aligned chunks
    fn chunk_text(
        &self,
        text: &str,
        source: ChunkSource,
        doc: &Document,
        base_offset: usize,
        start_index: u32,
    ) -> Vec<Chunk> {
        let mut chunks = Vec::new();

        let mut current_chunk = String::new();
        let mut current_start = 0usize;
        let mut chunk_index = start_index;
        let mut char_pos = 0usize;

        for sentence in text.split_sentence_bounds() {
            let sentence_len = sentence.len();

            // If adding this sentence exceeds chunk size, save current chunk
            if !current_chunk.is_empty() && current_chunk.len() + sentence_len > self.chunk_size {
                if current_chunk.len() >= self.min_size {
                    chunks.push(Chunk::new(
                        doc.id,
                        current_chunk.trim().to_string(),
                        source.clone(),
                        base_offset + current_start,
                        base_offset + char_pos,
                        chunk_index,
                    ));
                    chunk_index += 1;
                }

                // Start new chunk with overlap
                current_chunk = self.overlap_text(&current_chunk);
                current_start = char_pos.saturating_sub(self.overlap);
            }

            current_chunk.push_str(sentence);
            char_pos += sentence_len;
        }

        // Save final chunk
        if current_chunk.trim().len() >= self.min_size {
            chunks.push(Chunk::new(
                doc.id,
                current_chunk.trim().to_string(),
                source,
                base_offset + current_start,
                base_offset + char_pos,
                chunk_index,
            ));
        }

        chunks
    }

    /// Carry-over text from the end of a chunk
    fn overlap_text(&self, text: &str) -> String {
        if self.overlap == 0 {
            return String::new();
        }
        if text.len() <= self.overlap {
            return text.to_string();
        }

        let mut start = text.len().saturating_sub(self.overlap);
        while start > 0 && !text.is_char_boundary(start) {
            start -= 1;
        }
        let overlap_text = &text[start..];

        // Prefer a sentence boundary, then a word boundary
        if let Some(pos) = overlap_text.find(". ") {
            return overlap_text[pos + 2..].to_string();
        }
        if let Some(pos) = overlap_text.find(' ') {
            return overlap_text[pos + 1..].to_string();
        }

        overlap_text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestion::FileParser;
    use crate::types::FileType;

    fn make_doc() -> Document {
        Document::new(
            "dosing.txt".to_string(),
            FileType::Txt,
            "hash".to_string(),
            0,
        )
    }

    #[test]
    fn short_text_yields_single_chunk() {
        let parsed = FileParser::parse("dosing.txt", b"Metformin is first-line therapy.").unwrap();
        let chunker = TextChunker::new(200, 40, 10);
        let chunks = chunker.chunk_document(&make_doc(), &parsed);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].chunk_index, 0);
        assert!(chunks[0].content.contains("Metformin"));
    }

    #[test]
    fn long_text_is_split_with_bounded_chunks() {
        let sentence = "Start metformin at 500mg once daily with the evening meal. ";
        let text = sentence.repeat(30);
        let parsed = FileParser::parse("dosing.txt", text.as_bytes()).unwrap();

        let chunk_size = 200;
        let chunker = TextChunker::new(chunk_size, 50, 10);
        let chunks = chunker.chunk_document(&make_doc(), &parsed);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            // Size bound is target size plus at most one sentence of spill
            assert!(chunk.content.len() <= chunk_size + sentence.len());
        }

        // Indices are consecutive
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.chunk_index, i as u32);
        }
    }

    #[test]
    fn consecutive_chunks_share_overlap() {
        let text = "Alpha one two three four five. Bravo one two three four five. \
                    Charlie one two three four five. Delta one two three four five. \
                    Echo one two three four five. Foxtrot one two three four five."
            .to_string();
        let parsed = FileParser::parse("dosing.txt", text.as_bytes()).unwrap();

        let chunker = TextChunker::new(80, 40, 10);
        let chunks = chunker.chunk_document(&make_doc(), &parsed);
        assert!(chunks.len() > 1);

        // The tail of each chunk reappears at the head of the next one
        for pair in chunks.windows(2) {
            let first_words: Vec<&str> = pair[1].content.split_whitespace().take(2).collect();
            let head = first_words.join(" ");
            assert!(
                pair[0].content.contains(&head),
                "expected overlap '{}' in '{}'",
                head,
                pair[0].content
            );
        }
    }

    #[test]
    fn tiny_fragments_are_skipped() {
        let parsed = FileParser::parse("dosing.txt", b"ok").unwrap();
        let chunker = TextChunker::new(200, 40, 10);
        let chunks = chunker.chunk_document(&make_doc(), &parsed);
        assert!(chunks.is_empty());
    }
}
