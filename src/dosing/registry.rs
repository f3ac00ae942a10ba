//! Medicine registry
//!
//! Read-only provider of dosing profiles. The TOML-backed catalog is loaded
//! once and shared behind an `Arc`; nothing mutates it afterwards.
//!
//! ```toml
//! [[medicines]]
//! name = "Ibuprofeno"
//! description = "Suspensión oral 100 mg / 5 ml"
//! mg_kg_day = 30.0
//! doses_per_day = 3
//! concentration_mg = 100.0
//! concentration_ml = 5.0
//! min_safe_ml = 1.0
//! max_safe_ml = 10.0
//! ```

use crate::errors::DoseError;
use crate::types::MedicineProfile;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Lookup interface over medicine reference data
pub trait MedicineRegistry: Send + Sync {
    /// Case-insensitive exact match on the medicine name
    fn find_by_name(&self, name: &str) -> Option<&MedicineProfile>;

    /// All profiles, in registry order
    fn profiles(&self) -> &[MedicineProfile];
}

/// In-memory registry loaded from a TOML file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MedicineCatalog {
    #[serde(default)]
    medicines: Vec<MedicineProfile>,
}

impl MedicineCatalog {
    pub fn new(medicines: Vec<MedicineProfile>) -> Self {
        Self { medicines }
    }

    /// Parse and validate a catalog from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let catalog: MedicineCatalog =
            toml::from_str(contents).context("Failed to parse medicine registry")?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load a catalog from a TOML file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read medicine registry {:?}", path))?;
        let catalog = Self::from_toml_str(&contents)
            .with_context(|| format!("Invalid medicine registry {:?}", path))?;

        tracing::info!(
            "Loaded {} medicine profile(s) from {:?}",
            catalog.medicines.len(),
            path
        );
        Ok(catalog)
    }

    /// Check every profile for data-integrity problems
    pub fn validate(&self) -> std::result::Result<(), DoseError> {
        let mut seen: Vec<String> = Vec::with_capacity(self.medicines.len());

        for profile in &self.medicines {
            let invalid = |reason: &str| DoseError::InvalidProfile {
                name: profile.name.clone(),
                reason: reason.to_string(),
            };

            if profile.name.trim().is_empty() {
                return Err(invalid("name must not be empty"));
            }
            if profile.doses_per_day == 0 {
                return Err(invalid("doses_per_day must be at least 1"));
            }
            if !profile.mg_kg_day.is_finite() || profile.mg_kg_day <= 0.0 {
                return Err(invalid("mg_kg_day must be greater than 0"));
            }
            if !profile.reference_concentration().is_valid() {
                return Err(DoseError::InvalidConcentration {
                    mg: profile.concentration_mg,
                    ml: profile.concentration_ml,
                });
            }
            if profile.min_safe_ml < 0.0 || profile.min_safe_ml > profile.max_safe_ml {
                return Err(DoseError::InvalidRange {
                    min: profile.min_safe_ml,
                    max: profile.max_safe_ml,
                });
            }

            let key = profile.name.trim().to_lowercase();
            if seen.contains(&key) {
                return Err(invalid("duplicate medicine name"));
            }
            seen.push(key);
        }

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.medicines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.medicines.is_empty()
    }
}

impl MedicineRegistry for MedicineCatalog {
    fn find_by_name(&self, name: &str) -> Option<&MedicineProfile> {
        self.medicines.iter().find(|m| m.matches_name(name))
    }

    fn profiles(&self) -> &[MedicineProfile] {
        &self.medicines
    }
}
