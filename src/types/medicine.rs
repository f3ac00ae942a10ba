//! Medicine reference data
//!
//! Profiles are owned by an external registry and only ever read here.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Active-ingredient mass dissolved in a liquid volume
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Concentration {
    /// Milligrams of active ingredient
    pub mg: f64,

    /// Millilitres of formulation
    pub ml: f64,
}

impl Concentration {
    pub fn new(mg: f64, ml: f64) -> Self {
        Self { mg, ml }
    }

    /// Volume needed to deliver one milligram
    pub fn ml_per_mg(&self) -> f64 {
        self.ml / self.mg
    }

    /// Both axes strictly positive and finite
    pub fn is_valid(&self) -> bool {
        self.mg.is_finite() && self.ml.is_finite() && self.mg > 0.0 && self.ml > 0.0
    }
}

/// Inclusive per-dose volume range considered clinically safe
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SafeVolumeBand {
    pub min_ml: f64,
    pub max_ml: f64,
}

impl SafeVolumeBand {
    pub fn new(min_ml: f64, max_ml: f64) -> Self {
        Self { min_ml, max_ml }
    }
}

impl fmt::Display for SafeVolumeBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} ml - {:.2} ml", self.min_ml, self.max_ml)
    }
}

/// Dosing profile of a single liquid formulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicineProfile {
    pub name: String,

    /// Free-text description shown to the advisory model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Dosing rate in mg per kg of body weight per day
    pub mg_kg_day: f64,

    pub doses_per_day: u32,

    /// Reference concentration, mg side
    pub concentration_mg: f64,

    /// Reference concentration, ml side
    pub concentration_ml: f64,

    pub min_safe_ml: f64,
    pub max_safe_ml: f64,
}

impl MedicineProfile {
    pub fn reference_concentration(&self) -> Concentration {
        Concentration::new(self.concentration_mg, self.concentration_ml)
    }

    pub fn safe_band(&self) -> SafeVolumeBand {
        SafeVolumeBand::new(self.min_safe_ml, self.max_safe_ml)
    }

    /// Case-insensitive exact name match
    pub fn matches_name(&self, name: &str) -> bool {
        self.name.trim().to_lowercase() == name.trim().to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_band_display() {
        let band = SafeVolumeBand::new(0.5, 5.0);
        assert_eq!(band.to_string(), "0.50 ml - 5.00 ml");
    }

    #[test]
    fn test_concentration_validity() {
        assert!(Concentration::new(100.0, 5.0).is_valid());
        assert!(!Concentration::new(0.0, 5.0).is_valid());
        assert!(!Concentration::new(100.0, -1.0).is_valid());
        assert!(!Concentration::new(f64::NAN, 5.0).is_valid());
    }

    #[test]
    fn test_name_match_ignores_case_and_padding() {
        let profile = MedicineProfile {
            name: "Ibuprofeno".to_string(),
            description: None,
            mg_kg_day: 30.0,
            doses_per_day: 3,
            concentration_mg: 100.0,
            concentration_ml: 5.0,
            min_safe_ml: 1.0,
            max_safe_ml: 10.0,
        };

        assert!(profile.matches_name("ibuprofeno"));
        assert!(profile.matches_name("  IBUPROFENO "));
        assert!(!profile.matches_name("ibupro"));
    }
}
