//! Error types for Dosewise
//!
//! Dose errors are fatal to the request that raised them. Knowledge errors are
//! always recovered by the advisory pipeline. Advisory errors are surfaced to
//! the caller but never invalidate an already computed dose.

use thiserror::Error;

/// Errors raised while turning a dose request into a dose result
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DoseError {
    /// No profile matches the requested medicine name
    #[error("Medicine not found: {name}")]
    MedicineNotFound { name: String },

    /// Patient weight must be a positive, finite number of kilograms
    #[error("Invalid patient weight: {weight_kg} kg (must be greater than 0)")]
    InvalidWeight { weight_kg: f64 },

    /// Safe-volume band with min above max
    #[error("Invalid safe range: min {min} ml exceeds max {max} ml")]
    InvalidRange { min: f64, max: f64 },

    /// Effective concentration axis is zero, negative or not finite
    #[error("Invalid concentration: {mg} mg / {ml} ml")]
    InvalidConcentration { mg: f64, ml: f64 },

    /// Malformed reference data in the medicine registry
    #[error("Invalid medicine profile '{name}': {reason}")]
    InvalidProfile { name: String, reason: String },
}

/// Errors from the knowledge lookup collaborator (logged, never surfaced)
#[derive(Error, Debug)]
pub enum KnowledgeError {
    /// HTTP client errors
    #[error("Knowledge request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status from the terminology service
    #[error("Knowledge service returned HTTP {status}")]
    Status { status: u16 },
}

/// Errors from the generative text collaborator
#[derive(Error, Debug, Clone)]
pub enum GenerationError {
    /// Request exceeded its deadline
    #[error("Generation timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Connection or protocol failure
    #[error("Generation transport error: {0}")]
    Transport(String),

    /// Non-success status from the generation endpoint
    #[error("Generation API error: HTTP {status}: {body}")]
    Api { status: u16, body: String },

    /// Response envelope could not be decoded
    #[error("Generation response could not be decoded: {0}")]
    Decode(String),
}

impl GenerationError {
    /// Only timeouts are retried
    pub fn is_timeout(&self) -> bool {
        matches!(self, GenerationError::Timeout { .. })
    }
}

/// Error text never carries the request URL
impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        let err = err.without_url();
        if err.is_timeout() {
            GenerationError::Timeout { duration_ms: 0 }
        } else if err.is_decode() {
            GenerationError::Decode(err.to_string())
        } else {
            GenerationError::Transport(err.to_string())
        }
    }
}

/// User-facing message for a timed out advisory
pub const TIMEOUT_MESSAGE: &str =
    "El servicio de IA tardó demasiado en responder. Intenta nuevamente.";

/// User-facing message for any other advisory failure
pub const TRANSPORT_MESSAGE: &str =
    "Error al generar consejos médicos. Por favor, consulte a un profesional de la salud.";

/// Errors surfaced by the advisory orchestrator
#[derive(Error, Debug)]
pub enum AdvisoryError {
    /// Every attempt hit the timeout ceiling
    #[error("Advisory timed out after {attempts} attempt(s) of {timeout_ms}ms")]
    Timeout { attempts: u32, timeout_ms: u64 },

    /// Non-timeout failure talking to the generation service
    #[error("Advisory generation failed: {0}")]
    Transport(#[source] GenerationError),

    /// Caller abandoned the request
    #[error("Advisory request cancelled")]
    Cancelled,

    /// State machine transition errors
    #[error("Invalid advisory transition from {from} on {event}")]
    InvalidTransition { from: String, event: String },
}

impl AdvisoryError {
    /// Message suitable for showing to a caregiver
    pub fn user_message(&self) -> &'static str {
        match self {
            AdvisoryError::Timeout { .. } => TIMEOUT_MESSAGE,
            _ => TRANSPORT_MESSAGE,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, AdvisoryError::Timeout { .. })
    }
}
