//! Prompt templates for the assistant

use crate::retrieval::SearchResult;

/// System prompt for the dosage assistant. `{context}` is replaced with the
/// retrieved document content before the prompt is sent.
const SYSTEM_PROMPT: &str = r#"You are a specialist medical assistant AI focused on diabetes care (type 1, type 2,
and related metabolic disorders). Your role is to help clinicians select appropriate
antidiabetic medications, insulin regimens, dosing adjustments, monitoring plans, and
education for patients with diabetes.

Your responsibilities:
1. Always use the retrieved context below when formulating recommendations -
   incorporate relevant passages, guidelines, or local protocols found in the retrieved
   documents into your answer.
2. Analyze patient information (age, weight, renal/hepatic function, comorbidities, current
   medications, pregnancy status) and tailor medication and dosing suggestions accordingly.
3. Recommend dosing ranges, titration steps, monitoring schedules (glucose, A1c, renal
   function), and when to intensify or de-escalate therapy.
4. Highlight contraindications, drug interactions, hypoglycemia risk, and special
   populations (pregnancy, pediatrics, elderly, renal impairment).
5. Cite supporting evidence from the retrieved context: for each clinical recommendation,
   include a brief citation in the form [Source: filename, Page X] when available.

IMPORTANT: Always remind the clinician that final decisions rest with a qualified
healthcare professional. This tool assists clinical decision-making and does not replace
clinical judgment or institutional protocols.

If the retrieved context is empty or does not provide direct guidance, state that explicitly,
provide evidence-based general guidance (with common-dose ranges and monitoring), and
encourage verification against authoritative guidelines. Prioritize patient safety and note
uncertainty when appropriate.

CONTEXT FROM DOCUMENTS:
{context}"#;

/// Prompt builder for assistant queries
pub struct PromptBuilder;

impl PromptBuilder {
    /// Build the retrieved-context block from search results
    pub fn build_context(results: &[SearchResult]) -> String {
        let mut context = String::new();

        for (i, result) in results.iter().enumerate() {
            context.push_str(&format!(
                "[{}] {}\n\nContent:\n{}\n\n---\n\n",
                i + 1,
                result.chunk.source.format_citation(),
                result.chunk.content
            ));
        }

        context
    }

    /// Build the system prompt with the context inlined
    pub fn build_system_prompt(context: &str) -> String {
        let context = if context.trim().is_empty() {
            "No specific context available."
        } else {
            context
        };
        SYSTEM_PROMPT.replace("{context}", context)
    }

    /// Build the user message, prepending patient info when present
    pub fn build_user_message(question: &str, patient_info: &str) -> String {
        if patient_info.trim().is_empty() {
            question.to_string()
        } else {
            format!("PATIENT INFORMATION:\n{}\n\nQUESTION: {}", patient_info, question)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Chunk, ChunkSource, FileType};
    use uuid::Uuid;

    fn make_result(content: &str, page: Option<u32>) -> SearchResult {
        let source = match page {
            Some(p) => ChunkSource::pdf("guidelines.pdf".to_string(), p, 10),
            None => ChunkSource::text("dosing.txt".to_string(), FileType::Txt),
        };
        SearchResult {
            chunk: Chunk::new(Uuid::new_v4(), content.to_string(), source, 0, content.len(), 0),
            similarity: 0.9,
        }
    }

    #[test]
    fn context_includes_sources_and_content() {
        let results = vec![
            make_result("Metformin 500mg", Some(3)),
            make_result("Insulin glargine", None),
        ];
        let context = PromptBuilder::build_context(&results);

        assert!(context.contains("[1] guidelines.pdf, Page 3"));
        assert!(context.contains("[2] dosing.txt"));
        assert!(context.contains("Metformin 500mg"));
    }

    #[test]
    fn system_prompt_inlines_context() {
        let prompt = PromptBuilder::build_system_prompt("RETRIEVED TEXT");
        assert!(prompt.contains("RETRIEVED TEXT"));
        assert!(!prompt.contains("{context}"));
    }

    #[test]
    fn empty_context_gets_placeholder() {
        let prompt = PromptBuilder::build_system_prompt("  ");
        assert!(prompt.contains("No specific context available."));
    }

    #[test]
    fn user_message_includes_patient_info() {
        let msg = PromptBuilder::build_user_message("What dose?", "Age: 60");
        assert!(msg.starts_with("PATIENT INFORMATION:"));
        assert!(msg.contains("Age: 60"));
        assert!(msg.ends_with("QUESTION: What dose?"));

        let msg = PromptBuilder::build_user_message("What dose?", "");
        assert_eq!(msg, "What dose?");
    }
}
