use axum::{
    Router,
    extract::State,
    response::Json as ResponseJson,
    routing::{get, post},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::errors::ApiError;
use crate::llm::{CompletionClient, CompletionRequest, SummarizationClient};
use crate::models::{NewNewsSummary, NewsSummary};
use crate::news::{NewsClient, NewsFeed, NewsQuery};
use crate::prompts::{self, NewsItem};
use crate::repositories::NewsSummaryRepository;
use crate::routes::extract::{JsonBody, PathParam, QueryParams};
use crate::validation::{ValidationError, optional_text, require_text, validate_http_url};
use crate::{AppState, content};

/// Placeholder for an article the inference API could not summarize
pub const UNSUMMARIZED: &str = "Could not summarize";

#[derive(Debug, Deserialize)]
struct NewsSearchParams {
    q: Option<String>,
    from: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SummarizeRequest {
    #[serde(default)]
    articles: Vec<NewsItem>,
}

#[derive(Debug, Serialize)]
struct DigestResponse {
    summaries: String,
}

#[derive(Debug, Serialize)]
struct PerArticleResponse {
    summaries: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CreateSummaryRequest {
    title: Option<String>,
    description: Option<String>,
    source: Option<String>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SummaryListParams {
    approved: Option<bool>,
}

#[derive(Debug, Serialize)]
struct SummaryData {
    summary: NewsSummary,
}

#[derive(Debug, Serialize)]
struct SummaryResponse {
    success: bool,
    data: SummaryData,
}

#[derive(Debug, Serialize)]
struct SummaryListData {
    summaries: Vec<NewsSummary>,
}

#[derive(Debug, Serialize)]
struct SummaryListResponse {
    success: bool,
    data: SummaryListData,
}

fn parse_from_date(value: Option<&str>) -> Result<Option<NaiveDate>, ApiError> {
    optional_text(value)
        .map(|date| {
            NaiveDate::parse_from_str(&date, "%Y-%m-%d").map_err(|_| {
                ApiError::BadRequest(format!("Invalid from date: {date} (expected YYYY-MM-DD)"))
            })
        })
        .transpose()
}

fn require_articles(articles: &[NewsItem]) -> Result<(), ValidationError> {
    if articles.is_empty() {
        Err(ValidationError::NoArticles)
    } else {
        Ok(())
    }
}

#[instrument(skip_all, fields(q = ?params.q, from = ?params.from))]
async fn search_news<S: AppState>(
    State(state): State<S>,
    QueryParams(params): QueryParams<NewsSearchParams>,
) -> Result<ResponseJson<NewsFeed>, ApiError> {
    let mut query = NewsQuery::default();
    if let Some(q) = optional_text(params.q.as_deref()) {
        query.q = q;
    }
    query.from = parse_from_date(params.from.as_deref())?;

    let feed = state.news().search(&query).await?;

    info!(returned_count = feed.articles.len(), total = feed.total_results, "News fetched");
    Ok(ResponseJson(feed))
}

#[instrument(skip_all, fields(article_count = payload.articles.len()))]
async fn summarize_digest<S: AppState>(
    State(state): State<S>,
    JsonBody(payload): JsonBody<SummarizeRequest>,
) -> Result<ResponseJson<DigestResponse>, ApiError> {
    require_articles(&payload.articles)?;

    let summaries = state
        .completions()
        .complete(CompletionRequest::new(prompts::news_digest(&payload.articles)).temperature(0.5))
        .await?;

    info!(summary_len = summaries.len(), "News digest generated");
    Ok(ResponseJson(DigestResponse { summaries }))
}

#[instrument(skip_all, fields(article_count = payload.articles.len()))]
async fn summarize_each<S: AppState>(
    State(state): State<S>,
    JsonBody(payload): JsonBody<SummarizeRequest>,
) -> Result<ResponseJson<PerArticleResponse>, ApiError> {
    require_articles(&payload.articles)?;

    let summarizer = state.summarizer();
    let mut summaries = Vec::with_capacity(payload.articles.len());
    for item in &payload.articles {
        let summary = summarizer
            .summarize(&prompts::summarization_input(item))
            .await?
            .unwrap_or_else(|| {
                debug!(title = %item.title, "No summary returned");
                UNSUMMARIZED.to_string()
            });
        summaries.push(summary);
    }

    info!(count = summaries.len(), "Per-article summaries generated");
    Ok(ResponseJson(PerArticleResponse { summaries }))
}

#[instrument(skip_all, fields(source = ?payload.source))]
async fn create_summary<S: AppState>(
    State(state): State<S>,
    JsonBody(payload): JsonBody<CreateSummaryRequest>,
) -> Result<ResponseJson<SummaryResponse>, ApiError> {
    let title = require_text("Title", payload.title.as_deref())?;
    let description = optional_text(payload.description.as_deref());
    let url = optional_text(payload.url.as_deref())
        .map(|url| validate_http_url("url", &url))
        .transpose()?;

    let raw = state
        .completions()
        .complete(
            CompletionRequest::new(prompts::news_article_summary(&title, description.as_deref()))
                .temperature(0.5),
        )
        .await?;
    let summary = content::strip_code_fence(&raw).trim().to_string();
    if summary.is_empty() {
        warn!("Completion returned a blank news summary");
        return Err(crate::llm::LlmError::EmptyResponse.into());
    }

    let stored = state
        .summary_repo()
        .create(&NewNewsSummary {
            title,
            source: optional_text(payload.source.as_deref()),
            url,
            summary,
        })
        .await?;

    info!(id = stored.id, "News summary stored");
    Ok(ResponseJson(SummaryResponse {
        success: true,
        data: SummaryData { summary: stored },
    }))
}

#[instrument(skip_all, fields(approved = ?params.approved))]
async fn list_summaries<S: AppState>(
    State(state): State<S>,
    QueryParams(params): QueryParams<SummaryListParams>,
) -> Result<ResponseJson<SummaryListResponse>, ApiError> {
    let summaries = state.summary_repo().list(params.approved).await?;
    debug!(count = summaries.len(), "Listed news summaries");

    Ok(ResponseJson(SummaryListResponse {
        success: true,
        data: SummaryListData { summaries },
    }))
}

#[instrument(skip_all, fields(id = %id))]
async fn approve_summary<S: AppState>(
    State(state): State<S>,
    PathParam(id): PathParam<i32>,
) -> Result<ResponseJson<SummaryResponse>, ApiError> {
    match state.summary_repo().approve(id).await? {
        Some(summary) => {
            info!("News summary approved");
            Ok(ResponseJson(SummaryResponse {
                success: true,
                data: SummaryData { summary },
            }))
        }
        None => Err(ApiError::NotFound("News summary")),
    }
}

pub fn create_news_router<S: AppState>() -> Router<S> {
    Router::new()
        .route("/news", get(search_news::<S>))
        .route("/summarize", post(summarize_digest::<S>))
        .route("/hf-summarize", post(summarize_each::<S>))
        .route(
            "/news/summaries",
            get(list_summaries::<S>).post(create_summary::<S>),
        )
        .route("/news/summaries/{id}/approve", post(approve_summary::<S>))
}
