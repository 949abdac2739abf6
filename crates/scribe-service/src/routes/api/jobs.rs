use axum::{
    Router,
    extract::State,
    response::Json as ResponseJson,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::errors::ApiError;
use crate::llm::{CompletionClient, CompletionRequest};
use crate::models::{JobPosting, JobPostingDraft, NewJobPosting};
use crate::repositories::JobRepository;
use crate::routes::extract::{JsonBody, PathParam};
use crate::validation::require_text;
use crate::{AppState, content, prompts};

#[derive(Debug, Deserialize)]
struct GenerateJobPostRequest {
    content: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JobPostResponse {
    tweets: Vec<String>,
    job_data: JobPosting,
}

#[derive(Debug, Serialize)]
struct JobListResponse {
    jobs: Vec<JobPosting>,
}

#[derive(Debug, Serialize)]
struct JobResponse {
    job: JobPosting,
}

fn parse_job_draft(raw: &str) -> Result<JobPostingDraft, ApiError> {
    serde_json::from_str(&content::strip_code_fence(raw)).map_err(|err| {
        warn!(error = %err, "Completion returned malformed job data");
        ApiError::InternalError(format!("malformed job data: {err}"))
    })
}

#[instrument(skip_all)]
async fn generate_job_post<S: AppState>(
    State(state): State<S>,
    JsonBody(payload): JsonBody<GenerateJobPostRequest>,
) -> Result<ResponseJson<JobPostResponse>, ApiError> {
    let posting = require_text("Content", payload.content.as_deref())?;
    debug!(content_len = posting.len(), "Generating job post");

    let completions = state.completions();

    let raw_tweets = completions
        .complete(
            CompletionRequest::new(prompts::job_post_tweets(&posting))
                .system(prompts::JOB_TWEETS_SYSTEM),
        )
        .await?;
    let tweets = content::parse_tweets(&raw_tweets);

    let raw_job = completions
        .complete(
            CompletionRequest::new(prompts::job_extraction(&posting))
                .system(prompts::JOB_EXTRACTION_SYSTEM)
                .json(),
        )
        .await?;
    let draft = parse_job_draft(&raw_job)?;

    let job = state.job_repo().create(&NewJobPosting::from(draft)).await?;

    info!(id = job.id, tweet_count = tweets.len(), "Job posting stored");
    Ok(ResponseJson(JobPostResponse {
        tweets,
        job_data: job,
    }))
}

#[instrument(skip_all)]
async fn list_jobs<S: AppState>(
    State(state): State<S>,
) -> Result<ResponseJson<JobListResponse>, ApiError> {
    let jobs = state.job_repo().list().await?;
    debug!(count = jobs.len(), "Listed job postings");
    Ok(ResponseJson(JobListResponse { jobs }))
}

#[instrument(skip_all, fields(id = %id))]
async fn get_job<S: AppState>(
    State(state): State<S>,
    PathParam(id): PathParam<i32>,
) -> Result<ResponseJson<JobResponse>, ApiError> {
    match state.job_repo().find_by_id(id).await? {
        Some(job) => Ok(ResponseJson(JobResponse { job })),
        None => {
            debug!("Job posting not found");
            Err(ApiError::NotFound("Job posting"))
        }
    }
}

pub fn create_jobs_router<S: AppState>() -> Router<S> {
    Router::new()
        .route("/generate-job-post", post(generate_job_post::<S>))
        .route("/jobs", get(list_jobs::<S>))
        .route("/jobs/{id}", get(get_job::<S>))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_job_draft_accepts_fenced_json() {
        let raw = "```json\n{\"title\": \"SRE\", \"skills\": [\"k8s\"]}\n```";
        let draft = parse_job_draft(raw).unwrap();
        assert_eq!(draft.title.as_deref(), Some("SRE"));
        assert_eq!(draft.skills, vec!["k8s"]);
        assert_eq!(draft.location, None);
    }

    #[test]
    fn test_parse_job_draft_rejects_prose() {
        assert!(matches!(
            parse_job_draft("Sorry, I can't do that."),
            Err(ApiError::InternalError(_))
        ));
    }
}
