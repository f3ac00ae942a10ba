//! Advisory pipeline types

use crate::types::DoseResult;
use serde::{Deserialize, Serialize};

/// Pharmacology bundle from the terminology service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeSnippet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mechanism: Option<String>,

    #[serde(default)]
    pub indications: Vec<String>,

    #[serde(default)]
    pub contraindications: Vec<String>,
}

impl KnowledgeSnippet {
    pub fn is_empty(&self) -> bool {
        self.mechanism.is_none() && self.indications.is_empty() && self.contraindications.is_empty()
    }
}

/// Facts handed to the advisory pipeline, derived 1:1 from a dose result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisoryRequest {
    pub medicine_name: String,
    pub patient_weight: f64,
    pub daily_dose: f64,
    pub doses_per_day: u32,
    pub dose_per_administration: f64,
    pub volume_per_dose: f64,
    pub safe_range: String,
    pub alert: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medicine_description: Option<String>,
}

impl AdvisoryRequest {
    pub fn from_dose(dose: &DoseResult, medicine_description: Option<String>) -> Self {
        Self {
            medicine_name: dose.medicine.clone(),
            patient_weight: dose.weight_kg,
            daily_dose: dose.mg_per_day,
            doses_per_day: dose.doses_per_day,
            dose_per_administration: dose.mg_per_dose,
            volume_per_dose: dose.ml_per_dose,
            safe_range: dose.safe_range.clone(),
            alert: dose.alert.clone(),
            medicine_description,
        }
    }
}

impl From<&DoseResult> for AdvisoryRequest {
    fn from(dose: &DoseResult) -> Self {
        Self::from_dose(dose, None)
    }
}

/// Structured caregiver advisory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvisoryResult {
    pub advice: String,
    pub recommendations: Vec<String>,
    pub warnings: Vec<String>,
}

impl AdvisoryResult {
    /// No advice text and no list entries
    pub fn is_empty(&self) -> bool {
        self.advice.trim().is_empty() && self.recommendations.is_empty() && self.warnings.is_empty()
    }
}

/// How the final advisory content was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvisoryOrigin {
    /// Model output used as-is
    Model,

    /// Model output with missing fields backfilled
    Patched,

    /// Deterministic replacement, no usable model content
    Fallback,
}

/// Advisory returned by the orchestrator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advisory {
    #[serde(flatten)]
    pub result: AdvisoryResult,
    pub origin: AdvisoryOrigin,
}
