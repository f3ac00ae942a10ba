//! Type definitions module
//!
//! Reference data, dose calculation and advisory types.

pub mod medicine;
pub mod dose;
pub mod advisory;

// Re-export commonly used types
pub use medicine::{Concentration, MedicineProfile, SafeVolumeBand};
pub use dose::{ConcentrationOverride, DoseRequest, DoseResult, SafetyClassification};
pub use advisory::{Advisory, AdvisoryOrigin, AdvisoryRequest, AdvisoryResult, KnowledgeSnippet};
