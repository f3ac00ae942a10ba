//! Advisory orchestrator - main coordinator
//!
//! Runs one advisory request through:
//! - Knowledge lookup (failures swallowed)
//! - Prompt construction
//! - Model call under the timeout/retry policy
//! - Response parsing
//! - Completeness rules (whole fallback or per-field backfill)
//!
//! The orchestrator holds no per-request state; concurrent calls share only
//! the read-only collaborators.

use crate::advisory::cancel::CancelSignal;
use crate::advisory::fallback::{default_advice, default_recommendations, default_warnings, fallback_advisory};
use crate::advisory::parser::{is_placeholder, parse_response};
use crate::advisory::prompt::build_prompt;
use crate::advisory::state::{StageEvent, StageTracker};
use crate::errors::AdvisoryError;
use crate::generation::{RetryPolicy, TextGenerator};
use crate::knowledge::KnowledgeLookup;
use crate::types::{Advisory, AdvisoryOrigin, AdvisoryRequest, AdvisoryResult, KnowledgeSnippet};
use std::sync::Arc;

/// Advisory pipeline coordinator
#[derive(Clone)]
pub struct AdvisoryOrchestrator {
    knowledge: Arc<dyn KnowledgeLookup>,
    generator: Arc<dyn TextGenerator>,
    retry: RetryPolicy,
}

impl AdvisoryOrchestrator {
    /// Create orchestrator with the default 15s / one-retry policy
    pub fn new(knowledge: Arc<dyn KnowledgeLookup>, generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            knowledge,
            generator,
            retry: RetryPolicy::new(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Produce an advisory for one request
    pub async fn generate_advisory(&self, request: &AdvisoryRequest) -> Result<Advisory, AdvisoryError> {
        self.generate_advisory_with_cancel(request, &CancelSignal::never())
            .await
    }

    /// Produce an advisory, abandoning the run as soon as `cancel` fires
    pub async fn generate_advisory_with_cancel(
        &self,
        request: &AdvisoryRequest,
        cancel: &CancelSignal,
    ) -> Result<Advisory, AdvisoryError> {
        if cancel.is_cancelled() {
            return Err(AdvisoryError::Cancelled);
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!(medicine = %request.medicine_name, "advisory cancelled");
                Err(AdvisoryError::Cancelled)
            }
            result = self.run(request) => result,
        }
    }

    async fn run(&self, request: &AdvisoryRequest) -> Result<Advisory, AdvisoryError> {
        let mut stages = StageTracker::new();
        stages.advance(StageEvent::Start)?;

        let knowledge = self.lookup_knowledge(&request.medicine_name).await;
        stages.advance(StageEvent::KnowledgeResolved)?;

        let prompt = build_prompt(request, knowledge.as_ref());
        stages.advance(StageEvent::PromptReady)?;

        let generator = self.generator.as_ref();
        let prompt = prompt.as_str();
        let response = match self.retry.execute(move || generator.generate(prompt)).await {
            Ok(response) => response,
            Err(e) => {
                stages.advance(StageEvent::ModelFailed)?;
                tracing::warn!(medicine = %request.medicine_name, "advisory generation failed: {}", e);
                return Err(e);
            }
        };
        stages.advance(StageEvent::ResponseReceived)?;

        let parsed = parse_response(&response);
        tracing::debug!(kind = parsed.kind(), "model response parsed");
        stages.advance(StageEvent::Parsed)?;

        let advisory = ensure_complete(parsed.into_result(), request);
        stages.advance(StageEvent::Completed)?;

        tracing::debug!(origin = ?advisory.origin, "advisory ready");
        Ok(advisory)
    }

    /// Best-effort lookup: errors and empty bundles both mean no knowledge
    async fn lookup_knowledge(&self, medicine_name: &str) -> Option<KnowledgeSnippet> {
        match self.knowledge.lookup(medicine_name).await {
            Ok(Some(snippet)) if !snippet.is_empty() => Some(snippet),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(medicine = medicine_name, "knowledge lookup failed: {}", e);
                None
            }
        }
    }
}

/// Apply the completeness rules to a parsed advisory
///
/// ```text
/// no meaningful advice ∧ no recommendations ∧ no warnings → full fallback
/// otherwise                                               → backfill empty parts
/// ```
///
/// Advice is meaningful when it is non-blank and not a parser placeholder.
pub fn ensure_complete(parsed: AdvisoryResult, request: &AdvisoryRequest) -> Advisory {
    let has_advice = !parsed.advice.trim().is_empty() && !is_placeholder(&parsed.advice);
    let has_recommendations = !parsed.recommendations.is_empty();
    let has_warnings = !parsed.warnings.is_empty();

    if !has_advice && !has_recommendations && !has_warnings {
        return Advisory {
            result: fallback_advisory(request),
            origin: AdvisoryOrigin::Fallback,
        };
    }

    if has_advice && has_recommendations && has_warnings {
        return Advisory {
            result: parsed,
            origin: AdvisoryOrigin::Model,
        };
    }

    let mut result = parsed;
    if !has_advice {
        result.advice = default_advice(request);
    }
    if !has_recommendations {
        result.recommendations = default_recommendations(request);
    }
    if !has_warnings {
        result.warnings = default_warnings(request);
    }

    Advisory {
        result,
        origin: AdvisoryOrigin::Patched,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisory::parser::{BLOCKED_MESSAGE, EMPTY_MESSAGE};

    fn request() -> AdvisoryRequest {
        AdvisoryRequest {
            medicine_name: "Ibuprofeno".to_string(),
            patient_weight: 40.0,
            daily_dose: 600.0,
            doses_per_day: 3,
            dose_per_administration: 200.0,
            volume_per_dose: 2.0,
            safe_range: "0.50 ml - 5.00 ml".to_string(),
            alert: "Dosis dentro del rango seguro".to_string(),
            medicine_description: None,
        }
    }

    #[test]
    fn test_empty_advisory_is_replaced() {
        let advisory = ensure_complete(AdvisoryResult::default(), &request());
        assert_eq!(advisory.origin, AdvisoryOrigin::Fallback);
        assert_eq!(advisory.result, fallback_advisory(&request()));
    }

    #[test]
    fn test_placeholder_advice_is_replaced() {
        for placeholder in [EMPTY_MESSAGE, BLOCKED_MESSAGE] {
            let parsed = AdvisoryResult {
                advice: placeholder.to_string(),
                ..Default::default()
            };
            let advisory = ensure_complete(parsed, &request());
            assert_eq!(advisory.origin, AdvisoryOrigin::Fallback);
            assert_eq!(advisory.result.advice, default_advice(&request()));
        }
    }

    #[test]
    fn test_complete_model_content_kept() {
        let parsed = AdvisoryResult {
            advice: "Dar con comida".to_string(),
            recommendations: vec!["Agitar el frasco".to_string()],
            warnings: vec!["No exceder 4 tomas".to_string()],
        };
        let advisory = ensure_complete(parsed.clone(), &request());
        assert_eq!(advisory.origin, AdvisoryOrigin::Model);
        assert_eq!(advisory.result, parsed);
    }

    #[test]
    fn test_missing_lists_are_backfilled() {
        let parsed = AdvisoryResult {
            advice: "Dar con comida".to_string(),
            recommendations: vec![],
            warnings: vec!["No exceder 4 tomas".to_string()],
        };
        let advisory = ensure_complete(parsed, &request());

        assert_eq!(advisory.origin, AdvisoryOrigin::Patched);
        assert_eq!(advisory.result.advice, "Dar con comida");
        assert_eq!(advisory.result.recommendations, default_recommendations(&request()));
        assert_eq!(advisory.result.warnings, vec!["No exceder 4 tomas"]);
    }

    #[test]
    fn test_placeholder_advice_with_lists_is_patched() {
        let parsed = AdvisoryResult {
            advice: EMPTY_MESSAGE.to_string(),
            recommendations: vec!["Agitar el frasco".to_string()],
            warnings: vec![],
        };
        let advisory = ensure_complete(parsed, &request());

        assert_eq!(advisory.origin, AdvisoryOrigin::Patched);
        assert_eq!(advisory.result.advice, default_advice(&request()));
        assert_eq!(advisory.result.recommendations, vec!["Agitar el frasco"]);
        assert_eq!(advisory.result.warnings, default_warnings(&request()));
    }
}
