//! Patient record used by the consult flow

use serde::{Deserialize, Serialize};

/// A patient record as stored in the registry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    /// External patient identifier (primary key)
    pub patient_id: String,
    /// Full name
    pub name: String,
    /// Age in years
    pub age: Option<u32>,
    /// Gender
    pub gender: Option<String>,
    /// Height in centimeters
    pub height_cm: Option<f64>,
    /// Weight in kilograms
    pub weight_kg: Option<f64>,
    /// Diabetes type (e.g. "Type 1", "Type 2")
    pub diabetes_type: Option<String>,
    /// Years since diagnosis
    pub duration_years: Option<f64>,
    /// Comorbidities, free text
    pub comorbidities: Option<String>,
    /// Latest HbA1c (%)
    pub latest_hba1c: Option<f64>,
    /// Current medications, free text
    pub current_meds: Option<String>,
    /// Estimated glomerular filtration rate (mL/min)
    pub egfr_ml_min: Option<f64>,
    /// Recent symptoms, free text
    pub recent_symptoms: Option<String>,
    /// Record creation timestamp
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Patient {
    /// Format the record into the structured patient-info block handed to
    /// the agent pipeline.
    pub fn to_context_block(&self) -> String {
        let mut lines = vec![format!("Patient: {} (ID: {})", self.name, self.patient_id)];

        let mut push_field = |label: &str, value: Option<String>| {
            if let Some(v) = value {
                lines.push(format!("{}: {}", label, v));
            }
        };

        push_field("Age", self.age.map(|v| v.to_string()));
        push_field("Gender", self.gender.clone());
        push_field("Height (cm)", self.height_cm.map(|v| v.to_string()));
        push_field("Weight (kg)", self.weight_kg.map(|v| v.to_string()));
        push_field("Diabetes type", self.diabetes_type.clone());
        push_field(
            "Duration of diabetes (years)",
            self.duration_years.map(|v| v.to_string()),
        );
        push_field("Comorbidities", self.comorbidities.clone());
        push_field("Latest HbA1c (%)", self.latest_hba1c.map(|v| v.to_string()));
        push_field("Current medications", self.current_meds.clone());
        push_field("eGFR (mL/min)", self.egfr_ml_min.map(|v| v.to_string()));
        push_field("Recent symptoms", self.recent_symptoms.clone());

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_block_skips_missing_fields() {
        let patient = Patient {
            patient_id: "P-001".to_string(),
            name: "Jane Doe".to_string(),
            age: Some(54),
            gender: None,
            height_cm: None,
            weight_kg: Some(82.5),
            diabetes_type: Some("Type 2".to_string()),
            duration_years: None,
            comorbidities: None,
            latest_hba1c: Some(8.1),
            current_meds: Some("metformin 1000mg BID".to_string()),
            egfr_ml_min: None,
            recent_symptoms: None,
            created_at: None,
        };

        let block = patient.to_context_block();
        assert!(block.contains("Jane Doe"));
        assert!(block.contains("Age: 54"));
        assert!(block.contains("metformin"));
        assert!(!block.contains("Gender"));
        assert!(!block.contains("eGFR"));
    }
}
