//! Per-request agent state

use crate::types::response::Citation;

/// Mutable state threaded through the pipeline stages. Created at request
/// start, dropped after the response; never shared across requests.
#[derive(Debug, Clone, Default)]
pub struct AgentState {
    /// The user's question
    pub query: String,
    /// Structured or free-text patient information
    pub patient_info: String,
    /// Retrieved context handed to the LLM
    pub context: String,
    /// Citations collected during retrieval, linked during generation
    pub citations: Vec<Citation>,
    /// Final answer
    pub answer: String,
}

impl AgentState {
    /// Create the initial state for a request
    pub fn new(query: &str, patient_info: &str) -> Self {
        Self {
            query: query.trim().to_string(),
            patient_info: patient_info.trim().to_string(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_trims_inputs() {
        let state = AgentState::new("  question  ", " info ");
        assert_eq!(state.query, "question");
        assert_eq!(state.patient_info, "info");
        assert!(state.context.is_empty());
        assert!(state.citations.is_empty());
        assert!(state.answer.is_empty());
    }
}
