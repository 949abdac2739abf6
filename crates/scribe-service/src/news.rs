//! News search client used by the news listing and summarizer pages.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::NewsApiSettings;

pub const DEFAULT_QUERY: &str = "tesla";

#[derive(Error, Debug)]
pub enum NewsError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("News API returned status {status}: {message}")]
    Api { status: u16, message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewsQuery {
    pub q: String,
    pub from: Option<NaiveDate>,
}

impl Default for NewsQuery {
    fn default() -> Self {
        Self {
            q: DEFAULT_QUERY.to_string(),
            from: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsSource {
    pub id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsArticle {
    #[serde(default)]
    pub source: NewsSource,
    pub author: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub url_to_image: Option<String>,
    pub published_at: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsFeed {
    pub status: String,
    #[serde(default)]
    pub total_results: u64,
    #[serde(default)]
    pub articles: Vec<NewsArticle>,
}

#[async_trait]
pub trait NewsClient: Send + Sync + 'static {
    async fn search(&self, query: &NewsQuery) -> Result<NewsFeed, NewsError>;
}

#[derive(Debug, Deserialize)]
struct NewsApiError {
    message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewsApiClient {
    client: Client,
    settings: NewsApiSettings,
}

impl NewsApiClient {
    pub fn new(settings: NewsApiSettings, timeout: Duration) -> Result<Self, NewsError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, settings })
    }
}

#[async_trait]
impl NewsClient for NewsApiClient {
    #[instrument(skip_all, fields(q = %query.q, from = ?query.from))]
    async fn search(&self, query: &NewsQuery) -> Result<NewsFeed, NewsError> {
        let endpoint = format!(
            "{}/everything",
            self.settings.base_url.as_str().trim_end_matches('/')
        );

        let mut params = vec![
            ("q", query.q.clone()),
            ("sortBy", "publishedAt".to_string()),
            ("apiKey", self.settings.api_key.clone()),
        ];
        if let Some(from) = query.from {
            params.push(("from", from.format("%Y-%m-%d").to_string()));
        }

        let response = self.client.get(endpoint).query(&params).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<NewsApiError>(&body)
                .ok()
                .and_then(|err| err.message)
                .unwrap_or(body);
            return Err(NewsError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let feed: NewsFeed = response.json().await?;
        debug!(count = feed.articles.len(), total = feed.total_results, "News fetched");
        Ok(feed)
    }
}
