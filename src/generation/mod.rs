//! Generative text module
//!
//! Provides the generation API client, its wire types, the timeout/retry
//! policy and a scripted generator.

pub mod types;
pub mod client;
pub mod retry;
pub mod mock;

// Re-export commonly used types
pub use types::{GenerationParams, GenerationResponse};
pub use client::{GeminiClient, TextGenerator, DEFAULT_GENERATION_URL, DEFAULT_MODEL};
pub use retry::{RetryPolicy, DEFAULT_ATTEMPT_TIMEOUT, DEFAULT_MAX_RETRIES};
pub use mock::{MockReply, MockTextGenerator};
