use crate::AppState;
use axum::Router;

pub mod articles;
pub mod generate;
pub mod jobs;
pub mod news;

pub fn create_api_router<S: AppState>() -> Router<S> {
    Router::new()
        .merge(generate::create_generate_router())
        .merge(jobs::create_jobs_router())
        .merge(articles::create_articles_router())
        .merge(news::create_news_router())
}
