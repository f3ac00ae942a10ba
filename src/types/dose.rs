//! Dose request and result types

use serde::{Deserialize, Serialize};
use std::fmt;

/// User-supplied concentration; a missing axis falls back to the profile
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ConcentrationOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mg: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ml: Option<f64>,
}

impl ConcentrationOverride {
    pub fn is_empty(&self) -> bool {
        self.mg.is_none() && self.ml.is_none()
    }
}

/// One user calculation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoseRequest {
    pub medicine_name: String,
    pub weight_kg: f64,

    #[serde(default)]
    pub concentration: ConcentrationOverride,
}

impl DoseRequest {
    pub fn new(medicine_name: impl Into<String>, weight_kg: f64) -> Self {
        Self {
            medicine_name: medicine_name.into(),
            weight_kg,
            concentration: ConcentrationOverride::default(),
        }
    }

    /// Override the mg side of the concentration
    pub fn with_concentration_mg(mut self, mg: f64) -> Self {
        self.concentration.mg = Some(mg);
        self
    }

    /// Override the ml side of the concentration
    pub fn with_concentration_ml(mut self, ml: f64) -> Self {
        self.concentration.ml = Some(ml);
        self
    }
}

/// Position of the per-dose volume relative to the safe band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyClassification {
    Safe,
    BelowRange,
    AboveRange,
}

impl SafetyClassification {
    pub fn is_safe(&self) -> bool {
        matches!(self, SafetyClassification::Safe)
    }

    /// Caregiver-facing alert line
    pub fn alert(&self) -> &'static str {
        match self {
            SafetyClassification::Safe => "Dosis dentro del rango seguro",
            SafetyClassification::BelowRange => "Dosis por debajo del rango seguro",
            SafetyClassification::AboveRange => "Dosis por encima del rango seguro",
        }
    }
}

impl fmt::Display for SafetyClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.alert())
    }
}

/// Concrete administration plan for one patient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoseResult {
    pub medicine: String,
    pub weight_kg: f64,
    pub mg_per_day: f64,
    pub doses_per_day: u32,
    pub mg_per_dose: f64,
    pub ml_per_dose: f64,
    pub classification: SafetyClassification,
    pub alert: String,
    pub safe_range: String,
}
