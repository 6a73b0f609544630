//! Request types for the query and consult endpoints

use serde::{Deserialize, Serialize};

/// Query request for the assistant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    /// The question to answer
    pub question: String,

    /// Free-text patient information to include in the prompt
    #[serde(default)]
    pub patient_info: Option<String>,
}

impl QueryRequest {
    /// Create a new query
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            patient_info: None,
        }
    }

    /// Attach patient information
    pub fn with_patient_info(mut self, info: impl Into<String>) -> Self {
        self.patient_info = Some(info.into());
        self
    }
}

/// Consult request: a question about a specific patient
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsultRequest {
    /// The clinical question
    pub question: String,

    /// Patient to pull from the registry (optional)
    #[serde(default)]
    pub patient_id: Option<String>,

    /// Additional free-text notes merged into the patient info
    #[serde(default)]
    pub notes: Option<String>,
}
