//! Weight-based dose calculation
//!
//! Turns a medicine profile and a patient weight into a per-dose mass and
//! volume, then classifies the volume against the profile's safe band.
//! Outputs are rounded to two decimals before classification, so a volume
//! that only reaches a band edge after rounding counts as inside the band.

use crate::dosing::registry::MedicineRegistry;
use crate::dosing::safety::classify;
use crate::errors::DoseError;
use crate::types::{Concentration, ConcentrationOverride, DoseRequest, DoseResult, MedicineProfile};
use std::sync::Arc;

/// Round to two decimal places, half away from zero
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Resolve the concentration actually used for the mass-to-volume conversion
pub fn effective_concentration(
    profile: &MedicineProfile,
    overrides: ConcentrationOverride,
) -> Result<Concentration, DoseError> {
    let reference = profile.reference_concentration();
    let concentration = Concentration::new(
        overrides.mg.unwrap_or(reference.mg),
        overrides.ml.unwrap_or(reference.ml),
    );

    if !concentration.is_valid() {
        return Err(DoseError::InvalidConcentration {
            mg: concentration.mg,
            ml: concentration.ml,
        });
    }

    Ok(concentration)
}

/// Compute a dose for an already resolved profile
///
/// # Algorithm
///
/// ```text
/// mg_per_day  = mg_kg_day × weight
/// mg_per_dose = mg_per_day ÷ doses_per_day
/// ml_per_dose = mg_per_dose × (conc_ml ÷ conc_mg)
/// classification = classify(round2(ml_per_dose), [min_safe_ml, max_safe_ml])
/// ```
pub fn compute_dose(
    profile: &MedicineProfile,
    weight_kg: f64,
    overrides: ConcentrationOverride,
) -> Result<DoseResult, DoseError> {
    if !weight_kg.is_finite() || weight_kg <= 0.0 {
        return Err(DoseError::InvalidWeight { weight_kg });
    }

    if profile.doses_per_day == 0 {
        return Err(DoseError::InvalidProfile {
            name: profile.name.clone(),
            reason: "doses_per_day must be at least 1".to_string(),
        });
    }

    let concentration = effective_concentration(profile, overrides)?;

    let mg_per_day = profile.mg_kg_day * weight_kg;
    let mg_per_dose = mg_per_day / f64::from(profile.doses_per_day);
    let ml_per_dose = mg_per_dose * concentration.ml_per_mg();

    let mg_per_day = round2(mg_per_day);
    let mg_per_dose = round2(mg_per_dose);
    let ml_per_dose = round2(ml_per_dose);

    let band = profile.safe_band();
    let classification = classify(ml_per_dose, band)?;

    Ok(DoseResult {
        medicine: profile.name.clone(),
        weight_kg,
        mg_per_day,
        doses_per_day: profile.doses_per_day,
        mg_per_dose,
        ml_per_dose,
        classification,
        alert: classification.alert().to_string(),
        safe_range: band.to_string(),
    })
}

/// Registry-backed dose calculator
#[derive(Clone)]
pub struct DoseCalculator {
    registry: Arc<dyn MedicineRegistry>,
}

impl DoseCalculator {
    pub fn new(registry: Arc<dyn MedicineRegistry>) -> Self {
        Self { registry }
    }

    /// Look up the requested medicine and compute its dose
    pub fn calculate(&self, request: &DoseRequest) -> Result<DoseResult, DoseError> {
        let profile = self.profile(&request.medicine_name)?;
        let result = compute_dose(profile, request.weight_kg, request.concentration)?;

        tracing::debug!(
            medicine = %result.medicine,
            weight_kg = result.weight_kg,
            ml_per_dose = result.ml_per_dose,
            classification = ?result.classification,
            "dose calculated"
        );

        Ok(result)
    }

    /// Resolve a profile by case-insensitive name
    pub fn profile(&self, name: &str) -> Result<&MedicineProfile, DoseError> {
        self.registry
            .find_by_name(name)
            .ok_or_else(|| DoseError::MedicineNotFound {
                name: name.to_string(),
            })
    }

    pub fn registry(&self) -> &Arc<dyn MedicineRegistry> {
        &self.registry
    }
}
