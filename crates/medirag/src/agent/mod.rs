//! Agent pipeline for the dosage assistant
//!
//! A fixed three-step sequence over a per-request state: retrieve context,
//! analyze the query, generate the response. There is no branching or
//! loop-back. The retrieval and generation seams are trait objects.

mod state;

pub use state::AgentState;

use std::sync::Arc;

use crate::config::RetrievalConfig;
use crate::error::Result;
use crate::generation::{citation::extract_and_link_citations, PromptBuilder};
use crate::providers::{ContextRetriever, LlmProvider};
use crate::types::response::Citation;

/// Fallback answer when the pipeline ends without a response
const NO_RESPONSE: &str =
    "I apologize, but I couldn't generate a response. Please try again.";

/// Reply returned by the agent
#[derive(Debug, Clone)]
pub struct AgentReply {
    /// Generated answer
    pub answer: String,
    /// Citations linked to the answer
    pub citations: Vec<Citation>,
}

/// The assistant agent: retrieve -> analyze -> respond
pub struct AssistantAgent {
    retriever: Arc<dyn ContextRetriever>,
    llm: Arc<dyn LlmProvider>,
    top_k: usize,
}

impl AssistantAgent {
    /// Create a new agent over a retriever and an LLM provider
    pub fn new(
        retriever: Arc<dyn ContextRetriever>,
        llm: Arc<dyn LlmProvider>,
        retrieval: &RetrievalConfig,
    ) -> Self {
        Self {
            retriever,
            llm,
            top_k: retrieval.top_k,
        }
    }

    /// Process a user message and return the agent's reply
    pub async fn invoke(&self, message: &str, patient_info: &str) -> Result<AgentReply> {
        let mut state = AgentState::new(message, patient_info);

        if state.query.is_empty() {
            return Ok(AgentReply {
                answer: NO_RESPONSE.to_string(),
                citations: Vec::new(),
            });
        }

        self.retrieve_context(&mut state).await?;
        self.analyze_query(&mut state);
        self.generate_response(&mut state).await?;

        Ok(AgentReply {
            answer: state.answer,
            citations: state.citations,
        })
    }

    /// Retrieve relevant context for the query
    async fn retrieve_context(&self, state: &mut AgentState) -> Result<()> {
        let results = self.retriever.retrieve(&state.query, self.top_k).await?;

        state.citations = results
            .iter()
            .map(|r| Citation::from_chunk(&r.chunk, r.similarity))
            .collect();
        state.context = PromptBuilder::build_context(&results);

        tracing::debug!(
            "Retrieved {} chunks for query ({} context chars)",
            results.len(),
            state.context.len()
        );
        Ok(())
    }

    /// Analyze the query: a message that mentions patient characteristics
    /// doubles as the patient info when none was supplied explicitly.
    fn analyze_query(&self, state: &mut AgentState) {
        if !state.patient_info.is_empty() {
            return;
        }
        let lower = state.query.to_lowercase();
        if lower.contains("patient") || lower.contains("age") || lower.contains("weight") {
            state.patient_info = state.query.clone();
        }
    }

    /// Generate the response with the LLM and link citations
    async fn generate_response(&self, state: &mut AgentState) -> Result<()> {
        let system = PromptBuilder::build_system_prompt(&state.context);
        let user = PromptBuilder::build_user_message(&state.query, &state.patient_info);

        let answer = self.llm.complete(&system, &user).await?;

        let (linked_answer, linked_citations) =
            extract_and_link_citations(&answer, &mut state.citations);
        state.answer = linked_answer;
        state.citations = linked_citations;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieval::SearchResult;
    use crate::types::{Chunk, ChunkSource, FileType};
    use async_trait::async_trait;
    use uuid::Uuid;

    struct FixedRetriever {
        results: Vec<SearchResult>,
    }

    #[async_trait]
    impl ContextRetriever for FixedRetriever {
        async fn retrieve(&self, _query: &str, _top_k: usize) -> Result<Vec<SearchResult>> {
            Ok(self.results.clone())
        }
    }

    struct FixedLlm {
        answer: String,
    }

    #[async_trait]
    impl LlmProvider for FixedLlm {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String> {
            Ok(self.answer.clone())
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "fixed"
        }

        fn model(&self) -> &str {
            "fixed-model"
        }
    }

    fn make_result(filename: &str, page: u32, content: &str) -> SearchResult {
        let source = ChunkSource::pdf(filename.to_string(), page, 10);
        SearchResult {
            chunk: Chunk::new(Uuid::new_v4(), content.to_string(), source, 0, content.len(), 0),
            similarity: 0.85,
        }
    }

    fn make_agent(results: Vec<SearchResult>, answer: &str) -> AssistantAgent {
        AssistantAgent::new(
            Arc::new(FixedRetriever { results }),
            Arc::new(FixedLlm {
                answer: answer.to_string(),
            }),
            &RetrievalConfig::default(),
        )
    }

    #[tokio::test]
    async fn pipeline_returns_llm_output_verbatim() {
        let answer = "Start metformin at 500mg [Source: guidelines.pdf, Page 3].";
        let agent = make_agent(
            vec![make_result("guidelines.pdf", 3, "Metformin initiation guidance")],
            answer,
        );

        let reply = agent.invoke("What is the starting dose of metformin?", "").await.unwrap();

        assert_eq!(reply.answer, answer);
        assert_eq!(reply.citations.len(), 1);
        assert_eq!(reply.citations[0].filename, "guidelines.pdf");
    }

    #[tokio::test]
    async fn empty_message_short_circuits() {
        let agent = make_agent(Vec::new(), "unused");
        let reply = agent.invoke("   ", "").await.unwrap();
        assert!(reply.answer.contains("couldn't generate a response"));
        assert!(reply.citations.is_empty());
    }

    #[tokio::test]
    async fn message_mentioning_patient_becomes_patient_info() {
        struct CapturingLlm {
            seen: parking_lot::Mutex<String>,
        }

        #[async_trait]
        impl LlmProvider for CapturingLlm {
            async fn complete(&self, _system: &str, user: &str) -> Result<String> {
                *self.seen.lock() = user.to_string();
                Ok("ok".to_string())
            }

            async fn health_check(&self) -> Result<bool> {
                Ok(true)
            }

            fn name(&self) -> &str {
                "capturing"
            }

            fn model(&self) -> &str {
                "capturing-model"
            }
        }

        let llm = Arc::new(CapturingLlm {
            seen: parking_lot::Mutex::new(String::new()),
        });
        let agent = AssistantAgent::new(
            Arc::new(FixedRetriever { results: Vec::new() }),
            llm.clone(),
            &RetrievalConfig::default(),
        );

        agent
            .invoke("My patient is 70 years old, what metformin dose?", "")
            .await
            .unwrap();

        let user = llm.seen.lock().clone();
        assert!(user.starts_with("PATIENT INFORMATION:"));
        assert!(user.contains("70 years old"));
    }
}
