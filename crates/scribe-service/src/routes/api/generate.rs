use axum::{
    Router,
    extract::State,
    response::Json as ResponseJson,
    routing::post,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::errors::ApiError;
use crate::llm::{CompletionClient, CompletionRequest};
use crate::prompts::{self, Keywords};
use crate::routes::extract::JsonBody;
use crate::validation::require_text;
use crate::{AppState, content};

#[derive(Debug, Deserialize)]
struct GenerateBlogRequest {
    topic: Option<String>,
    keywords: Option<Keywords>,
}

#[derive(Debug, Serialize)]
struct BlogResponse {
    blog: String,
}

#[derive(Debug, Deserialize)]
struct GenerateTweetsRequest {
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct TweetsResponse {
    tweets: Vec<String>,
}

#[instrument(skip_all, fields(has_keywords = payload.keywords.is_some()))]
async fn generate_blog<S: AppState>(
    State(state): State<S>,
    JsonBody(payload): JsonBody<GenerateBlogRequest>,
) -> Result<ResponseJson<BlogResponse>, ApiError> {
    let topic = require_text("Topic", payload.topic.as_deref())?;
    debug!(topic = %topic, "Generating blog post");

    let prompt = prompts::blog_post(&topic, payload.keywords.as_ref());
    let blog = state
        .completions()
        .complete(CompletionRequest::new(prompt).temperature(0.7))
        .await?;

    info!(blog_len = blog.len(), "Blog post generated");
    Ok(ResponseJson(BlogResponse { blog }))
}

#[instrument(skip_all)]
async fn generate_tweets<S: AppState>(
    State(state): State<S>,
    JsonBody(payload): JsonBody<GenerateTweetsRequest>,
) -> Result<ResponseJson<TweetsResponse>, ApiError> {
    let posting = require_text("Content", payload.content.as_deref())?;
    debug!(content_len = posting.len(), "Generating tweets");

    let raw = state
        .completions()
        .complete(
            CompletionRequest::new(prompts::tweets_from_job_posting(&posting))
                .temperature(0.7)
                .max_tokens(500),
        )
        .await?;

    let tweets = content::parse_tweets(&raw);
    info!(count = tweets.len(), "Tweets generated");
    Ok(ResponseJson(TweetsResponse { tweets }))
}

pub fn create_generate_router<S: AppState>() -> Router<S> {
    Router::new()
        .route("/generate", post(generate_blog::<S>))
        .route("/generate-tweet", post(generate_tweets::<S>))
}
