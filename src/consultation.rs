//! Consultation: one dose calculation plus its optional advisory
//!
//! The dose result is final as soon as it is computed. Advisory outcomes are
//! attached to the report afterwards and never alter the dose.

use crate::advisory::{AdvisoryOrchestrator, CancelSignal};
use crate::dosing::{DoseCalculator, MedicineRegistry};
use crate::errors::{AdvisoryError, DoseError};
use crate::types::{Advisory, AdvisoryRequest, DoseRequest, DoseResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// What happened to the advisory half of a consultation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AdvisoryOutcome {
    NotRequested,
    Ready { advisory: Advisory },
    TimedOut { message: String },
    Failed { message: String },
    Cancelled,
}

impl AdvisoryOutcome {
    pub fn from_result(result: Result<Advisory, AdvisoryError>) -> Self {
        match result {
            Ok(advisory) => AdvisoryOutcome::Ready { advisory },
            Err(AdvisoryError::Cancelled) => AdvisoryOutcome::Cancelled,
            Err(e) if e.is_timeout() => AdvisoryOutcome::TimedOut {
                message: e.user_message().to_string(),
            },
            Err(e) => AdvisoryOutcome::Failed {
                message: e.user_message().to_string(),
            },
        }
    }

    pub fn advisory(&self) -> Option<&Advisory> {
        match self {
            AdvisoryOutcome::Ready { advisory } => Some(advisory),
            _ => None,
        }
    }

    /// Caregiver-facing error text, if the advisory failed
    pub fn error_message(&self) -> Option<&str> {
        match self {
            AdvisoryOutcome::TimedOut { message } | AdvisoryOutcome::Failed { message } => Some(message),
            _ => None,
        }
    }
}

/// Dose result with its advisory outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoseReport {
    pub calculated_at: DateTime<Utc>,
    pub dose: DoseResult,
    pub advisory: AdvisoryOutcome,
}

impl DoseReport {
    pub fn new(dose: DoseResult) -> Self {
        Self {
            calculated_at: Utc::now(),
            dose,
            advisory: AdvisoryOutcome::NotRequested,
        }
    }
}

/// Calculator and advisory pipeline wired for one user action
#[derive(Clone)]
pub struct Consultation {
    calculator: DoseCalculator,
    orchestrator: AdvisoryOrchestrator,
}

impl Consultation {
    pub fn new(registry: Arc<dyn MedicineRegistry>, orchestrator: AdvisoryOrchestrator) -> Self {
        Self {
            calculator: DoseCalculator::new(registry),
            orchestrator,
        }
    }

    pub fn calculator(&self) -> &DoseCalculator {
        &self.calculator
    }

    pub fn calculate(&self, request: &DoseRequest) -> Result<DoseResult, DoseError> {
        self.calculator.calculate(request)
    }

    /// Advisory request for a dose, enriched with the profile description
    pub fn advisory_request(&self, dose: &DoseResult) -> AdvisoryRequest {
        let description = self
            .calculator
            .profile(&dose.medicine)
            .ok()
            .and_then(|profile| profile.description.clone());
        AdvisoryRequest::from_dose(dose, description)
    }

    pub async fn advise(&self, dose: &DoseResult, cancel: &CancelSignal) -> Result<Advisory, AdvisoryError> {
        let request = self.advisory_request(dose);
        self.orchestrator
            .generate_advisory_with_cancel(&request, cancel)
            .await
    }

    /// Calculate a dose and, if asked, attach an advisory
    ///
    /// Dose errors fail the whole call. Advisory errors only mark the report.
    pub async fn run(
        &self,
        request: &DoseRequest,
        with_advisory: bool,
        cancel: &CancelSignal,
    ) -> Result<DoseReport, DoseError> {
        let mut report = DoseReport::new(self.calculate(request)?);

        if with_advisory {
            let result = self.advise(&report.dose, cancel).await;
            report.advisory = AdvisoryOutcome::from_result(result);
        }

        Ok(report)
    }
}
