//! File parser for the supported source formats

use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::types::FileType;

/// Parsed document with extracted text and metadata
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    /// File type
    pub file_type: FileType,
    /// Extracted text content
    pub content: String,
    /// Content hash for deduplication
    pub content_hash: String,
    /// Total pages (if applicable)
    pub total_pages: Option<u32>,
    /// Page-level content (for PDFs)
    pub pages: Vec<PageContent>,
}

/// Content from a single page
#[derive(Debug, Clone)]
pub struct PageContent {
    /// Page number (1-indexed)
    pub page_number: u32,
    /// Text content of the page
    pub content: String,
    /// Character offset in the full document
    pub char_offset: usize,
}

/// Parser for the supported source formats (txt, markdown, pdf)
pub struct FileParser;

impl FileParser {
    /// Parse a file from raw bytes
    pub fn parse(filename: &str, data: &[u8]) -> Result<ParsedDocument> {
        let file_type = FileType::from_filename(filename);

        match file_type {
            FileType::Txt | FileType::Markdown => Self::parse_text(filename, data, file_type),
            FileType::Pdf => Self::parse_pdf(filename, data),
            FileType::Unknown => {
                let ext = std::path::Path::new(filename)
                    .extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("(none)");
                Err(Error::UnsupportedFileType(ext.to_string()))
            }
        }
    }

    fn parse_text(filename: &str, data: &[u8], file_type: FileType) -> Result<ParsedDocument> {
        let content = String::from_utf8(data.to_vec())
            .map_err(|e| Error::file_parse(filename, format!("invalid UTF-8: {}", e)))?;

        Ok(ParsedDocument {
            file_type,
            content_hash: Self::content_hash(&content),
            content,
            total_pages: None,
            pages: Vec::new(),
        })
    }

    fn parse_pdf(filename: &str, data: &[u8]) -> Result<ParsedDocument> {
        let text = pdf_extract::extract_text_from_mem(data)
            .map_err(|e| Error::file_parse(filename, e.to_string()))?;

        // pdf-extract separates pages with form feeds
        let mut pages = Vec::new();
        let mut char_offset = 0usize;
        for (i, page_text) in text.split('\u{c}').enumerate() {
            let trimmed = page_text.trim();
            if !trimmed.is_empty() {
                pages.push(PageContent {
                    page_number: i as u32 + 1,
                    content: trimmed.to_string(),
                    char_offset,
                });
            }
            char_offset += page_text.len() + 1;
        }

        let total_pages = if pages.is_empty() {
            None
        } else {
            Some(pages.last().map(|p| p.page_number).unwrap_or(1))
        };

        Ok(ParsedDocument {
            file_type: FileType::Pdf,
            content_hash: Self::content_hash(&text),
            content: text,
            total_pages,
            pages,
        })
    }

    /// SHA-256 hash of the extracted content, hex encoded
    pub fn content_hash(content: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_text() {
        let parsed = FileParser::parse("notes.txt", b"metformin dosing notes").unwrap();
        assert_eq!(parsed.file_type, FileType::Txt);
        assert_eq!(parsed.content, "metformin dosing notes");
        assert!(parsed.pages.is_empty());
        assert_eq!(parsed.total_pages, None);
    }

    #[test]
    fn rejects_unsupported_extension() {
        let err = FileParser::parse("scan.png", b"...").unwrap_err();
        assert!(matches!(err, Error::UnsupportedFileType(_)));
    }

    #[test]
    fn identical_content_hashes_match() {
        let a = FileParser::parse("a.txt", b"same content").unwrap();
        let b = FileParser::parse("b.txt", b"same content").unwrap();
        assert_eq!(a.content_hash, b.content_hash);
    }
}
