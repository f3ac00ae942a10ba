//! Advisory pipeline state machine
//!
//! Deterministic stage sequence for one advisory run:
//! - Every run starts in `Idle` and ends in `Done` or `Failed`
//! - Only the model call can fail the run
//! - Terminal states absorb every further event

use crate::errors::AdvisoryError;
use serde::{Deserialize, Serialize};

/// Advisory run stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdvisoryStage {
    /// Request accepted, nothing started
    Idle,

    /// Fetching pharmacology facts
    LookingUpKnowledge,

    /// Rendering the prompt
    BuildingPrompt,

    /// Waiting on the generation service
    CallingModel,

    /// Decoding model output
    ParsingResponse,

    /// Applying the fallback rules
    EnsuringCompleteness,

    /// Advisory produced (terminal)
    Done,

    /// Model call failed (terminal)
    Failed,
}

/// Events that trigger stage transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageEvent {
    /// `generate_advisory` called
    Start,

    /// Lookup finished, with or without knowledge
    KnowledgeResolved,

    /// Prompt rendered
    PromptReady,

    /// Model replied within the deadline
    ResponseReceived,

    /// Timeout after retries, or transport failure
    ModelFailed,

    /// Parser produced a (possibly empty) advisory
    Parsed,

    /// Fallback rules applied
    Completed,
}

impl AdvisoryStage {
    /// Check if this is a terminal stage
    pub fn is_terminal(&self) -> bool {
        matches!(self, AdvisoryStage::Done | AdvisoryStage::Failed)
    }

    /// Attempt a stage transition
    ///
    /// Valid transitions:
    /// 1. Idle                 → LookingUpKnowledge   (on: Start)
    /// 2. LookingUpKnowledge   → BuildingPrompt       (on: KnowledgeResolved)
    /// 3. BuildingPrompt       → CallingModel         (on: PromptReady)
    /// 4. CallingModel         → ParsingResponse      (on: ResponseReceived)
    /// 5. CallingModel         → Failed               (on: ModelFailed)
    /// 6. ParsingResponse      → EnsuringCompleteness (on: Parsed)
    /// 7. EnsuringCompleteness → Done                 (on: Completed)
    /// 8. Done / Failed        → self                 (terminal)
    pub fn transition(&self, event: StageEvent) -> Result<AdvisoryStage, AdvisoryError> {
        use AdvisoryStage::*;
        use StageEvent::*;

        let next = match (self, event) {
            (Idle, Start) => LookingUpKnowledge,
            (LookingUpKnowledge, KnowledgeResolved) => BuildingPrompt,
            (BuildingPrompt, PromptReady) => CallingModel,
            (CallingModel, ResponseReceived) => ParsingResponse,
            (CallingModel, ModelFailed) => Failed,
            (ParsingResponse, Parsed) => EnsuringCompleteness,
            (EnsuringCompleteness, Completed) => Done,

            // Terminal stages (self-loops)
            (Done, _) => Done,
            (Failed, _) => Failed,

            (from, event) => {
                return Err(AdvisoryError::InvalidTransition {
                    from: format!("{:?}", from),
                    event: format!("{:?}", event),
                });
            }
        };

        Ok(next)
    }
}

/// Stage tracker for a single run
#[derive(Debug, Clone)]
pub struct StageTracker {
    current: AdvisoryStage,
    history: Vec<AdvisoryStage>,
}

impl Default for StageTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl StageTracker {
    pub fn new() -> Self {
        Self {
            current: AdvisoryStage::Idle,
            history: vec![AdvisoryStage::Idle],
        }
    }

    /// Apply an event, logging the transition
    pub fn advance(&mut self, event: StageEvent) -> Result<AdvisoryStage, AdvisoryError> {
        let next = self.current.transition(event)?;
        tracing::debug!("[STAGE] {:?} -> {:?}", self.current, next);

        if next != self.current {
            self.history.push(next);
        }
        self.current = next;
        Ok(next)
    }

    pub fn current(&self) -> AdvisoryStage {
        self.current
    }

    /// Stages visited so far, in order
    pub fn history(&self) -> &[AdvisoryStage] {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        crate::logging::init_test();
        let mut tracker = StageTracker::new();
        for event in [
            StageEvent::Start,
            StageEvent::KnowledgeResolved,
            StageEvent::PromptReady,
            StageEvent::ResponseReceived,
            StageEvent::Parsed,
            StageEvent::Completed,
        ] {
            tracker.advance(event).unwrap();
        }

        assert_eq!(tracker.current(), AdvisoryStage::Done);
        assert_eq!(
            tracker.history(),
            &[
                AdvisoryStage::Idle,
                AdvisoryStage::LookingUpKnowledge,
                AdvisoryStage::BuildingPrompt,
                AdvisoryStage::CallingModel,
                AdvisoryStage::ParsingResponse,
                AdvisoryStage::EnsuringCompleteness,
                AdvisoryStage::Done,
            ]
        );
    }

    #[test]
    fn test_model_failure_is_terminal() {
        let state = AdvisoryStage::CallingModel
            .transition(StageEvent::ModelFailed)
            .unwrap();
        assert_eq!(state, AdvisoryStage::Failed);
        assert!(state.is_terminal());
        assert_eq!(state.transition(StageEvent::Completed).unwrap(), AdvisoryStage::Failed);
    }

    #[test]
    fn test_only_model_call_can_fail() {
        for stage in [
            AdvisoryStage::Idle,
            AdvisoryStage::LookingUpKnowledge,
            AdvisoryStage::BuildingPrompt,
            AdvisoryStage::ParsingResponse,
            AdvisoryStage::EnsuringCompleteness,
        ] {
            assert!(stage.transition(StageEvent::ModelFailed).is_err());
        }
    }

    #[test]
    fn test_invalid_transition() {
        let result = AdvisoryStage::Idle.transition(StageEvent::Parsed);
        assert!(matches!(result, Err(AdvisoryError::InvalidTransition { .. })));
    }
}
