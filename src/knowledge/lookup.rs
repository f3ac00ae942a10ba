//! Knowledge lookup seam
//!
//! The advisory pipeline treats every lookup as best effort: errors and empty
//! bundles both mean "no knowledge".

use crate::errors::KnowledgeError;
use crate::types::KnowledgeSnippet;
use async_trait::async_trait;
use std::collections::HashMap;

/// Maximum indications kept in a snippet
pub const MAX_INDICATIONS: usize = 5;

/// Maximum contraindications kept in a snippet
pub const MAX_CONTRAINDICATIONS: usize = 4;

/// Source of pharmacology facts for a medicine name
#[async_trait]
pub trait KnowledgeLookup: Send + Sync {
    async fn lookup(&self, medicine_name: &str) -> Result<Option<KnowledgeSnippet>, KnowledgeError>;
}

/// Lookup that never finds anything (knowledge disabled)
#[derive(Debug, Clone, Copy, Default)]
pub struct NoKnowledge;

#[async_trait]
impl KnowledgeLookup for NoKnowledge {
    async fn lookup(&self, _medicine_name: &str) -> Result<Option<KnowledgeSnippet>, KnowledgeError> {
        Ok(None)
    }
}

/// Fixed in-memory knowledge, keyed by lower-cased medicine name
#[derive(Debug, Clone, Default)]
pub struct StaticKnowledge {
    entries: HashMap<String, KnowledgeSnippet>,
}

impl StaticKnowledge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, medicine_name: &str, snippet: KnowledgeSnippet) -> Self {
        self.entries
            .insert(medicine_name.trim().to_lowercase(), snippet);
        self
    }
}

#[async_trait]
impl KnowledgeLookup for StaticKnowledge {
    async fn lookup(&self, medicine_name: &str) -> Result<Option<KnowledgeSnippet>, KnowledgeError> {
        Ok(self
            .entries
            .get(&medicine_name.trim().to_lowercase())
            .cloned())
    }
}
