use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

use super::{CompletionClient, CompletionRequest, LlmError};
use crate::config::OpenAiSettings;

const IMAGE_SIZE: &str = "1024x1024";
const IMAGE_QUALITY: &str = "standard";

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    size: &'static str,
    quality: &'static str,
    n: u8,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    #[serde(default)]
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Chat-completions and image-generation client for OpenAI-compatible APIs
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    settings: OpenAiSettings,
}

impl OpenAiClient {
    pub fn new(settings: OpenAiSettings, timeout: Duration) -> Result<Self, LlmError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, settings })
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{path}",
            self.settings.base_url.as_str().trim_end_matches('/')
        )
    }

    async fn post<B: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, LlmError> {
        let response = self
            .client
            .post(self.endpoint(path))
            .bearer_auth(&self.settings.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&text)
                .map(|envelope| envelope.error.message)
                .unwrap_or(text);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<R>()
            .await
            .map_err(|err| LlmError::Malformed(err.to_string()))
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    #[instrument(skip_all, fields(model = %self.settings.model, prompt_len = request.prompt.len(), json = request.json_response))]
    async fn complete(&self, request: CompletionRequest) -> Result<String, LlmError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = request.system.as_deref() {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: &request.prompt,
        });

        let body = ChatRequest {
            model: &self.settings.model,
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format: request
                .json_response
                .then_some(ResponseFormat { kind: "json_object" }),
        };

        let response: ChatResponse = self.post("chat/completions", &body).await?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(LlmError::EmptyResponse)?;

        debug!(content_len = content.len(), "Completion received");
        Ok(content)
    }

    #[instrument(skip_all, fields(model = %self.settings.image_model))]
    async fn generate_image(&self, prompt: &str) -> Result<Option<String>, LlmError> {
        let body = ImageRequest {
            model: &self.settings.image_model,
            prompt,
            size: IMAGE_SIZE,
            quality: IMAGE_QUALITY,
            n: 1,
        };

        let response: ImageResponse = self.post("images/generations", &body).await?;
        Ok(response.data.into_iter().next().and_then(|image| image.url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;
    use url::Url;

    fn client_for(server: &mockito::Server) -> OpenAiClient {
        let settings = OpenAiSettings {
            api_key: "sk-test".to_string(),
            base_url: Url::parse(&server.url()).unwrap(),
            model: "gpt-4o-mini".to_string(),
            image_model: "dall-e-3".to_string(),
        };
        OpenAiClient::new(settings, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_complete_returns_first_choice() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_body(Matcher::PartialJson(json!({
                "model": "gpt-4o-mini",
                "temperature": 0.7,
                "max_tokens": 3000,
                "messages": [{"role": "user", "content": "Write something"}]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "choices": [
                        {"message": {"role": "assistant", "content": "<h1>Done</h1>"}},
                        {"message": {"role": "assistant", "content": "ignored"}}
                    ]
                })
                .to_string(),
            )
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server);
        let content = client
            .complete(
                CompletionRequest::new("Write something")
                    .temperature(0.7)
                    .max_tokens(3000),
            )
            .await
            .unwrap();

        assert_eq!(content, "<h1>Done</h1>");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_complete_sends_system_message_and_json_mode() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_body(Matcher::PartialJson(json!({
                "messages": [
                    {"role": "system", "content": "extract"},
                    {"role": "user", "content": "posting"}
                ],
                "response_format": {"type": "json_object"}
            })))
            .with_status(200)
            .with_body(json!({"choices": [{"message": {"content": "{}"}}]}).to_string())
            .create_async()
            .await;

        let client = client_for(&server);
        let content = client
            .complete(CompletionRequest::new("posting").system("extract").json())
            .await
            .unwrap();

        assert_eq!(content, "{}");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_complete_empty_content_is_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(json!({"choices": [{"message": {"content": "   "}}]}).to_string())
            .create_async()
            .await;

        let client = client_for(&server);
        let result = client.complete(CompletionRequest::new("hi")).await;
        assert!(matches!(result, Err(LlmError::EmptyResponse)));
    }

    #[tokio::test]
    async fn test_complete_surfaces_api_error_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_body(json!({"error": {"message": "Incorrect API key provided"}}).to_string())
            .create_async()
            .await;

        let client = client_for(&server);
        match client.complete(CompletionRequest::new("hi")).await {
            Err(LlmError::Api { status, message }) => {
                assert_eq!(status, 401);
                assert_eq!(message, "Incorrect API key provided");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_generate_image_returns_url() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/images/generations")
            .match_body(Matcher::PartialJson(json!({
                "model": "dall-e-3",
                "size": "1024x1024",
                "quality": "standard",
                "n": 1
            })))
            .with_status(200)
            .with_body(json!({"data": [{"url": "https://images.example.com/1.png"}]}).to_string())
            .create_async()
            .await;

        let client = client_for(&server);
        let url = client.generate_image("a header").await.unwrap();

        assert_eq!(url.as_deref(), Some("https://images.example.com/1.png"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_generate_image_without_data() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/images/generations")
            .with_status(200)
            .with_body(json!({"data": []}).to_string())
            .create_async()
            .await;

        let client = client_for(&server);
        assert_eq!(client.generate_image("a header").await.unwrap(), None);
    }
}
