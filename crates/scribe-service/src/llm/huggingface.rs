use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{instrument, warn};

use super::{LlmError, SummarizationClient};
use crate::config::HuggingFaceSettings;

#[derive(Debug, Deserialize)]
struct SummaryOutput {
    summary_text: Option<String>,
}

/// Summarization through the hosted inference API
#[derive(Debug, Clone)]
pub struct HuggingFaceClient {
    client: Client,
    settings: HuggingFaceSettings,
}

impl HuggingFaceClient {
    pub fn new(settings: HuggingFaceSettings, timeout: Duration) -> Result<Self, LlmError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, settings })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/{}",
            self.settings.base_url.as_str().trim_end_matches('/'),
            self.settings.model
        )
    }
}

#[async_trait]
impl SummarizationClient for HuggingFaceClient {
    #[instrument(skip_all, fields(model = %self.settings.model, input_len = text.len()))]
    async fn summarize(&self, text: &str) -> Result<Option<String>, LlmError> {
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.settings.api_key)
            .json(&json!({ "inputs": text }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(status = status.as_u16(), body = %body, "Summarization request rejected");
            return Ok(None);
        }

        // Success bodies are a one-element array; anything else means no summary
        let summary = serde_json::from_str::<Vec<SummaryOutput>>(&body)
            .ok()
            .and_then(|outputs| outputs.into_iter().next())
            .and_then(|output| output.summary_text)
            .filter(|summary| !summary.trim().is_empty());

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use url::Url;

    fn client_for(server: &mockito::Server) -> HuggingFaceClient {
        let settings = HuggingFaceSettings {
            api_key: "hf-test".to_string(),
            base_url: Url::parse(&server.url()).unwrap(),
            model: "facebook/bart-large-cnn".to_string(),
        };
        HuggingFaceClient::new(settings, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_summarize_returns_summary_text() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/facebook/bart-large-cnn")
            .match_header("authorization", "Bearer hf-test")
            .match_body(Matcher::Json(json!({"inputs": "Title\nBody"})))
            .with_status(200)
            .with_body(json!([{"summary_text": "Short version."}]).to_string())
            .create_async()
            .await;

        let client = client_for(&server);
        let summary = client.summarize("Title\nBody").await.unwrap();

        assert_eq!(summary.as_deref(), Some("Short version."));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_summarize_model_loading_yields_none() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/facebook/bart-large-cnn")
            .with_status(503)
            .with_body(json!({"error": "Model is currently loading"}).to_string())
            .create_async()
            .await;

        let client = client_for(&server);
        assert_eq!(client.summarize("text").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_summarize_unexpected_shape_yields_none() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/facebook/bart-large-cnn")
            .with_status(200)
            .with_body(json!({"generated_text": "wrong task"}).to_string())
            .create_async()
            .await;

        let client = client_for(&server);
        assert_eq!(client.summarize("text").await.unwrap(), None);
    }
}
