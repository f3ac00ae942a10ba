//! Scripted text generator for tests and offline runs

use crate::errors::GenerationError;
use crate::generation::client::TextGenerator;
use crate::generation::types::GenerationResponse;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// One scripted outcome of a `generate` call
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Envelope returned as-is
    Response(GenerationResponse),

    /// Error returned as-is
    Fail(GenerationError),

    /// Never answers within any reasonable deadline
    Hang,
}

impl MockReply {
    /// Successful reply carrying `text`
    pub fn text(text: impl Into<String>) -> Self {
        MockReply::Response(GenerationResponse::from_text(text))
    }
}

/// Generator replaying a fixed script; the last reply repeats once the
/// script is exhausted
#[derive(Debug)]
pub struct MockTextGenerator {
    replies: Mutex<VecDeque<MockReply>>,
    last: Mutex<Option<MockReply>>,
    prompts: Mutex<Vec<String>>,
}

impl MockTextGenerator {
    pub fn new(replies: Vec<MockReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            last: Mutex::new(None),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Generator that always gives the same reply
    pub fn always(reply: MockReply) -> Self {
        Self::new(vec![reply])
    }

    /// Number of `generate` calls so far
    pub fn calls(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or(0)
    }

    /// Prompts received, in call order
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    fn next_reply(&self) -> Option<MockReply> {
        let mut replies = self.replies.lock().ok()?;
        let mut last = self.last.lock().ok()?;

        if let Some(reply) = replies.pop_front() {
            *last = Some(reply.clone());
            return Some(reply);
        }
        last.clone()
    }
}

#[async_trait]
impl TextGenerator for MockTextGenerator {
    async fn generate(&self, prompt: &str) -> Result<GenerationResponse, GenerationError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        match self.next_reply() {
            Some(MockReply::Response(response)) => Ok(response),
            Some(MockReply::Fail(error)) => Err(error),
            Some(MockReply::Hang) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(GenerationError::Transport("mock hang elapsed".to_string()))
            }
            None => Err(GenerationError::Transport("no scripted reply".to_string())),
        }
    }
}
