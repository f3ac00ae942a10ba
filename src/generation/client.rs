//! Generative text client
//!
//! Non-streaming `generateContent` call returning the raw response envelope.
//! Per-attempt deadlines and retries live in [`crate::generation::RetryPolicy`];
//! the HTTP client timeout here is only a backstop.

use crate::errors::GenerationError;
use crate::generation::types::{GenerateContentRequest, GenerationParams, GenerationResponse};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Default generation API endpoint
pub const DEFAULT_GENERATION_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model
pub const DEFAULT_MODEL: &str = "models/gemini-flash-latest";

/// Backstop HTTP timeout (60 seconds)
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Header carrying the API key; keeps it out of URLs and error text
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Sends a prompt and returns the raw envelope
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<GenerationResponse, GenerationError>;
}

/// HTTP client for the `generateContent` endpoint
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
    params: GenerationParams,
}

impl GeminiClient {
    /// Create client with default endpoint and model
    pub fn new(api_key: &str) -> Result<Self, GenerationError> {
        Self::with_config(DEFAULT_GENERATION_URL, DEFAULT_MODEL, api_key, GenerationParams::default())
    }

    /// Create client with custom configuration
    pub fn with_config(
        base_url: &str,
        model: &str,
        api_key: &str,
        params: GenerationParams,
    ) -> Result<Self, GenerationError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
            params,
        })
    }

    /// Endpoint URL without the key
    pub fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", self.base_url, self.model)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn params(&self) -> GenerationParams {
        self.params
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<GenerationResponse, GenerationError> {
        let body = GenerateContentRequest::user_prompt(prompt, self.params);

        let response = self
            .client
            .post(self.endpoint())
            .header(API_KEY_HEADER, self.api_key.as_str())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(GenerationError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: GenerationResponse = response.json().await?;

        Ok(envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_http::serve;

    #[test]
    fn test_client_creation() {
        let client = GeminiClient::new("test-key").unwrap();
        assert_eq!(client.model(), DEFAULT_MODEL);
        assert_eq!(
            client.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-flash-latest:generateContent"
        );
        assert_eq!(client.params(), GenerationParams::default());
    }

    #[test]
    fn test_client_with_config() {
        let client = GeminiClient::with_config(
            "http://localhost:8080/v1/",
            "models/test",
            "k",
            GenerationParams::default(),
        )
        .unwrap();
        assert_eq!(client.endpoint(), "http://localhost:8080/v1/models/test:generateContent");
    }

    fn client_at(base_url: &str, api_key: &str) -> GeminiClient {
        GeminiClient::with_config(base_url, "models/test", api_key, GenerationParams::default()).unwrap()
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        let client = client_at("http://127.0.0.1:9", "SECRETKEY123");

        let err = client.generate("hola").await.unwrap_err();
        assert!(matches!(err, GenerationError::Transport(_)));

        let shown = crate::errors::AdvisoryError::Transport(err).to_string();
        assert!(!shown.contains("SECRETKEY123"), "key leaked: {}", shown);
    }

    #[tokio::test]
    async fn test_key_sent_as_header() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"hola"}]},"finishReason":"STOP"}]}"#;
        let (base_url, server) = serve(vec![(200, body.to_string())]).await;

        let response = client_at(&base_url, "SECRETKEY123").generate("hola").await.unwrap();
        assert_eq!(response.text(), "hola");

        let requests = server.await.unwrap();
        let request_line = requests[0].lines().next().unwrap_or_default();
        assert_eq!(request_line, "POST /models/test:generateContent HTTP/1.1");
        assert!(requests[0].to_lowercase().contains("x-goog-api-key: secretkey123"));
        assert!(requests[0].contains("\"maxOutputTokens\":512"));
    }

    #[tokio::test]
    async fn test_error_status_is_api_error() {
        let (base_url, _server) = serve(vec![(500, r#"{"error":"boom"}"#.to_string())]).await;

        let err = client_at(&base_url, "k").generate("hola").await.unwrap_err();
        match err {
            GenerationError::Api { status, body } => {
                assert_eq!(status, 500);
                assert!(body.contains("boom"));
            }
            other => panic!("expected api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let (base_url, _server) = serve(vec![(200, "{not json".to_string())]).await;

        let err = client_at(&base_url, "SECRETKEY123").generate("hola").await.unwrap_err();
        assert!(matches!(err, GenerationError::Decode(_)));
        assert!(!err.to_string().contains(&base_url));
        assert!(!err.is_timeout());
    }
}
