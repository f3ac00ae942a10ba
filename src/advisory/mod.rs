//! Advisory pipeline module
//!
//! Knowledge → prompt → model → parser → completeness, coordinated by the
//! orchestrator and tracked by an explicit stage machine.

pub mod prompt;
pub mod parser;
pub mod fallback;
pub mod state;
pub mod cancel;
pub mod orchestrator;

// Re-export commonly used types
pub use prompt::build_prompt;
pub use parser::{is_placeholder, parse_advisory, parse_response, ParsedAdvisory, BLOCKED_MESSAGE, EMPTY_MESSAGE};
pub use fallback::fallback_advisory;
pub use state::{AdvisoryStage, StageEvent, StageTracker};
pub use cancel::{cancel_pair, CancelHandle, CancelSignal};
pub use orchestrator::{ensure_complete, AdvisoryOrchestrator};
