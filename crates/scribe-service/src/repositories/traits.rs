use crate::errors::ApiError;
use crate::models::{
    Article, ArticleChanges, ArticleSummary, JobPosting, NewArticle, NewJobPosting,
    NewNewsSummary, NewsSummary,
};
use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeMap;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    Title,
    WordCount,
    ReadTimeMinutes,
    PublishDate,
}

impl SortField {
    /// Unknown field names fall back to `created_at`
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("updated_at") => SortField::UpdatedAt,
            Some("title") => SortField::Title,
            Some("word_count") => SortField::WordCount,
            Some("read_time_minutes") => SortField::ReadTimeMinutes,
            Some("publish_date") => SortField::PublishDate,
            _ => SortField::CreatedAt,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(order) if order.eq_ignore_ascii_case("asc") => SortOrder::Asc,
            _ => SortOrder::Desc,
        }
    }
}

/// Filters shared by the listing page and its statistics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArticleFilter {
    pub status: Option<String>,
    pub content_type: Option<String>,
    pub difficulty: Option<String>,
    pub featured_only: bool,
    pub trending_only: bool,
    pub search: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArticleQuery {
    pub filter: ArticleFilter,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
    /// 1-based
    pub page: u32,
    pub limit: u32,
}

impl ArticleQuery {
    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.limit)
    }
}

#[derive(Debug, Clone)]
pub struct ArticlePage {
    pub items: Vec<ArticleSummary>,
    pub total: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleStats {
    pub total: u64,
    pub avg_word_count: i64,
    pub avg_read_time: i64,
    pub content_types: BTreeMap<String, u64>,
    pub difficulty_levels: BTreeMap<String, u64>,
}

#[async_trait]
pub trait ArticleRepository: Clone + Send + Sync + 'static {
    async fn slug_exists(&self, slug: &str) -> Result<bool, ApiError>;
    async fn create(&self, article: &NewArticle) -> Result<Article, ApiError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Article>, ApiError>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Article>, ApiError>;
    async fn update(&self, id: &str, changes: &ArticleChanges) -> Result<Article, ApiError>;
    async fn list(&self, query: &ArticleQuery) -> Result<ArticlePage, ApiError>;
    async fn stats(&self, filter: &ArticleFilter) -> Result<ArticleStats, ApiError>;
}

#[async_trait]
pub trait JobRepository: Clone + Send + Sync + 'static {
    async fn create(&self, job: &NewJobPosting) -> Result<JobPosting, ApiError>;
    async fn find_by_id(&self, id: i32) -> Result<Option<JobPosting>, ApiError>;
    async fn list(&self) -> Result<Vec<JobPosting>, ApiError>;
}

#[async_trait]
pub trait NewsSummaryRepository: Clone + Send + Sync + 'static {
    async fn create(&self, summary: &NewNewsSummary) -> Result<NewsSummary, ApiError>;
    async fn list(&self, approved: Option<bool>) -> Result<Vec<NewsSummary>, ApiError>;
    /// `None` when no summary has this id
    async fn approve(&self, id: i32) -> Result<Option<NewsSummary>, ApiError>;
}
