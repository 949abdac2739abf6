use axum::Router;
use std::sync::Arc;

pub mod config;
pub mod content;
pub mod db;
pub mod errors;
pub mod llm;
pub mod models;
pub mod news;
pub mod prompts;
pub mod repositories;
pub mod routes;
pub mod schema;
pub mod shutdown;
pub mod validation;

use config::Settings;
use llm::{CompletionClient, HuggingFaceClient, OpenAiClient, SummarizationClient};
use news::{NewsApiClient, NewsClient};
use repositories::{
    ArticleRepository, JobRepository, NewsSummaryRepository, SharedConnection,
    SqliteArticleRepository, SqliteJobRepository, SqliteNewsSummaryRepository,
};

/// Everything a handler can reach: repositories, external clients and settings
pub trait AppState: Clone + Send + Sync + 'static {
    type Articles: ArticleRepository;
    type Jobs: JobRepository;
    type Summaries: NewsSummaryRepository;
    type Completions: CompletionClient;
    type Summarizer: SummarizationClient;
    type News: NewsClient;

    fn article_repo(&self) -> Self::Articles;
    fn job_repo(&self) -> Self::Jobs;
    fn summary_repo(&self) -> Self::Summaries;
    fn completions(&self) -> &Self::Completions;
    fn summarizer(&self) -> &Self::Summarizer;
    fn news(&self) -> &Self::News;
    fn settings(&self) -> &Settings;
}

/// sqlite-backed state, generic over the external service clients
pub struct ServiceState<C, H, N> {
    db: SharedConnection,
    completions: Arc<C>,
    summarizer: Arc<H>,
    news: Arc<N>,
    settings: Arc<Settings>,
}

impl<C, H, N> ServiceState<C, H, N> {
    pub fn new(
        db: SharedConnection,
        completions: C,
        summarizer: H,
        news: N,
        settings: Settings,
    ) -> Self {
        Self {
            db,
            completions: Arc::new(completions),
            summarizer: Arc::new(summarizer),
            news: Arc::new(news),
            settings: Arc::new(settings),
        }
    }
}

impl<C, H, N> Clone for ServiceState<C, H, N> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            completions: self.completions.clone(),
            summarizer: self.summarizer.clone(),
            news: self.news.clone(),
            settings: self.settings.clone(),
        }
    }
}

impl<C, H, N> AppState for ServiceState<C, H, N>
where
    C: CompletionClient,
    H: SummarizationClient,
    N: NewsClient,
{
    type Articles = SqliteArticleRepository;
    type Jobs = SqliteJobRepository;
    type Summaries = SqliteNewsSummaryRepository;
    type Completions = C;
    type Summarizer = H;
    type News = N;

    fn article_repo(&self) -> Self::Articles {
        SqliteArticleRepository::new(self.db.clone())
    }

    fn job_repo(&self) -> Self::Jobs {
        SqliteJobRepository::new(self.db.clone())
    }

    fn summary_repo(&self) -> Self::Summaries {
        SqliteNewsSummaryRepository::new(self.db.clone())
    }

    fn completions(&self) -> &Self::Completions {
        &self.completions
    }

    fn summarizer(&self) -> &Self::Summarizer {
        &self.summarizer
    }

    fn news(&self) -> &Self::News {
        &self.news
    }

    fn settings(&self) -> &Settings {
        &self.settings
    }
}

pub type DefaultAppState = ServiceState<OpenAiClient, HuggingFaceClient, NewsApiClient>;

pub fn create_app<S: AppState>(state: S) -> Router {
    routes::create_router().with_state(state)
}
