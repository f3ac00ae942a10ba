//! Medicine knowledge module
//!
//! Best-effort pharmacology augmentation for the advisory prompt.

pub mod lookup;
pub mod rxnav;

// Re-export commonly used types
pub use lookup::{KnowledgeLookup, NoKnowledge, StaticKnowledge, MAX_CONTRAINDICATIONS, MAX_INDICATIONS};
pub use rxnav::{RxNavClient, DEFAULT_RXNAV_URL};
