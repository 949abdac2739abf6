//! Clients for the hosted text and image generation services.

use async_trait::async_trait;
use thiserror::Error;

pub mod huggingface;
pub mod openai;

pub use huggingface::HuggingFaceClient;
pub use openai::OpenAiClient;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Completion returned no content")]
    EmptyResponse,

    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// One chat completion call: an optional system message plus the user prompt
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: Option<String>,
    pub prompt: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub json_response: bool,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            system: None,
            prompt: prompt.into(),
            temperature: None,
            max_tokens: None,
            json_response: false,
        }
    }

    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Ask the model for a JSON object response
    pub fn json(mut self) -> Self {
        self.json_response = true;
        self
    }
}

#[async_trait]
pub trait CompletionClient: Send + Sync + 'static {
    /// Text of the first choice; empty output is an error
    async fn complete(&self, request: CompletionRequest) -> Result<String, LlmError>;

    /// URL of a generated image, if the service returned one
    async fn generate_image(&self, prompt: &str) -> Result<Option<String>, LlmError>;
}

#[async_trait]
pub trait SummarizationClient: Send + Sync + 'static {
    /// `Ok(None)` when the service answered without a summary
    async fn summarize(&self, text: &str) -> Result<Option<String>, LlmError>;
}
