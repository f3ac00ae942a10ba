//! Dose calculation module
//!
//! Pure arithmetic over read-only reference data:
//! - Safety classification against an inclusive safe band
//! - Weight-based dose calculator with concentration overrides
//! - Medicine registry (TOML catalog)

pub mod safety;
pub mod calculator;
pub mod registry;

// Re-export commonly used types
pub use safety::classify;
pub use calculator::{compute_dose, round2, DoseCalculator};
pub use registry::{MedicineCatalog, MedicineRegistry};
