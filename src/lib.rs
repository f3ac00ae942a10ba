//! Dosewise v0.3.0 - Pediatric Dose Calculator
//!
//! Weight-based dose calculation against a medicine registry, with an
//! optional caregiver advisory produced by a generative text service.
//!
//! # Architecture
//!
//! - **Dosing**: registry lookup, dose arithmetic, safety classification
//! - **Knowledge**: best-effort drug facts (RxNav)
//! - **Generation**: model client with timeout/retry policy
//! - **Advisory**: prompt, parser, fallback and the orchestrating pipeline

pub mod errors;
pub mod types;
pub mod dosing;
pub mod knowledge;
pub mod generation;
pub mod advisory;
pub mod consultation;

// Binary support
pub mod cli;
pub mod config;
pub mod logging;

#[cfg(test)]
mod test_http;

// Re-export commonly used types
pub use errors::{AdvisoryError, DoseError, GenerationError, KnowledgeError};
pub use types::{
    Advisory, AdvisoryOrigin, AdvisoryRequest, AdvisoryResult, DoseRequest, DoseResult,
    MedicineProfile, SafetyClassification,
};
pub use dosing::{DoseCalculator, MedicineCatalog, MedicineRegistry};
pub use advisory::{AdvisoryOrchestrator, CancelSignal};
pub use consultation::{AdvisoryOutcome, Consultation, DoseReport};
