//! Citation extraction and linking

use regex::Regex;

use crate::types::response::Citation;

/// Extract `[Source: filename, Page X]` markers from an answer and link them
/// to the citations that were offered to the model. When the model cited
/// nothing explicitly, the top citations by similarity are appended instead.
pub fn extract_and_link_citations(
    answer: &str,
    available_citations: &mut Vec<Citation>,
) -> (String, Vec<Citation>) {
    let citation_pattern = Regex::new(r"\[Source:\s*([^,\]]+)(?:,\s*Page\s*(\d+))?\]")
        .expect("Invalid regex");

    let mut linked_citations: Vec<Citation> = Vec::new();
    let mut clean_answer = answer.to_string();

    for cap in citation_pattern.captures_iter(answer) {
        let filename = cap.get(1).map(|m| m.as_str().trim()).unwrap_or("");
        let page: Option<u32> = cap.get(2).and_then(|m| m.as_str().parse().ok());

        if let Some(citation) = find_matching_citation(available_citations, filename, page) {
            if !linked_citations.iter().any(|c| c.chunk_id == citation.chunk_id) {
                linked_citations.push(citation);
            }
        }
    }

    if linked_citations.is_empty() && !available_citations.is_empty() {
        available_citations.sort_by(|a, b| {
            b.similarity_score
                .partial_cmp(&a.similarity_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        for citation in available_citations.iter().take(3) {
            linked_citations.push(citation.clone());
        }

        clean_answer.push_str("\n\nSources used:");
        for citation in &linked_citations {
            clean_answer.push_str(&format!("\n- {}", citation.format_inline()));
        }
    }

    (clean_answer, linked_citations)
}

/// Find a citation matching the given filename and optional page
fn find_matching_citation(
    citations: &[Citation],
    filename: &str,
    page: Option<u32>,
) -> Option<Citation> {
    for citation in citations {
        let filename_matches = citation.filename.contains(filename)
            || filename.contains(&citation.filename)
            || filename.eq_ignore_ascii_case(&citation.filename);

        if filename_matches {
            match page {
                Some(p) if citation.page_number == Some(p) => return Some(citation.clone()),
                None => return Some(citation.clone()),
                _ => continue,
            }
        }
    }

    // Fuzzy fallback: filename match regardless of page
    citations
        .iter()
        .find(|c| c.filename.contains(filename) || filename.contains(&c.filename))
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Chunk, ChunkSource, FileType};
    use uuid::Uuid;

    fn make_citation(filename: &str, page: Option<u32>, similarity: f32) -> Citation {
        let source = ChunkSource {
            filename: filename.to_string(),
            file_type: FileType::Pdf,
            page_number: page,
            page_count: None,
        };
        let chunk = Chunk::new(Uuid::new_v4(), "snippet".to_string(), source, 0, 7, 0);
        Citation::from_chunk(&chunk, similarity)
    }

    #[test]
    fn explicit_citations_are_linked() {
        let mut available = vec![
            make_citation("guidelines.pdf", Some(3), 0.8),
            make_citation("guidelines.pdf", Some(7), 0.7),
        ];

        let answer = "Start at 500mg [Source: guidelines.pdf, Page 7].";
        let (clean, linked) = extract_and_link_citations(answer, &mut available);

        assert_eq!(clean, answer);
        assert_eq!(linked.len(), 1);
        assert_eq!(linked[0].page_number, Some(7));
    }

    #[test]
    fn uncited_answers_fall_back_to_top_citations() {
        let mut available = vec![
            make_citation("a.pdf", Some(1), 0.5),
            make_citation("b.pdf", Some(2), 0.9),
        ];

        let (clean, linked) = extract_and_link_citations("Take metformin.", &mut available);

        assert!(clean.contains("Sources used:"));
        assert_eq!(linked.len(), 2);
        assert_eq!(linked[0].filename, "b.pdf");
    }

    #[test]
    fn duplicate_markers_link_once() {
        let mut available = vec![make_citation("a.pdf", Some(1), 0.5)];

        let answer = "First [Source: a.pdf, Page 1]. Again [Source: a.pdf, Page 1].";
        let (_, linked) = extract_and_link_citations(answer, &mut available);
        assert_eq!(linked.len(), 1);
    }
}
