use axum::{
    Router,
    extract::State,
    response::Json as ResponseJson,
    routing::{get, post, put},
};
use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::content::{self, ContentMeta};
use crate::errors::ApiError;
use crate::llm::{CompletionClient, CompletionRequest, LlmError};
use crate::models::{
    Article, ArticleChanges, ArticleStatus, ArticleSummary, ContentType, DifficultyLevel,
    NewArticle,
};
use crate::prompts::{self, ArticlePrompt, Keywords};
use crate::repositories::{
    ArticleFilter, ArticleQuery, ArticleRepository, ArticleStats, DEFAULT_PAGE_SIZE,
    MAX_PAGE_SIZE, SortField, SortOrder,
};
use crate::routes::extract::{JsonBody, PathParam, QueryParams};
use crate::validation::{optional_text, require_text, validate_http_url};
use crate::AppState;

/// `status` value that lists articles regardless of status
const ANY_STATUS: &str = "all";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateArticleRequest {
    title: Option<String>,
    description: Option<String>,
    keywords: Option<Keywords>,
    content_type: Option<String>,
    difficulty_level: Option<String>,
    #[serde(default)]
    featured: bool,
    #[serde(default)]
    generate_image: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreatedArticle {
    id: String,
    title: String,
    content: String,
    excerpt: String,
    slug: String,
    url: String,
    word_count: i32,
    read_time: i32,
    content_type: String,
    difficulty_level: String,
    image_url: Option<String>,
    featured: bool,
    created_at: NaiveDateTime,
}

impl From<Article> for CreatedArticle {
    fn from(article: Article) -> Self {
        CreatedArticle {
            id: article.id,
            title: article.title,
            content: article.content,
            excerpt: article.excerpt,
            slug: article.slug,
            url: article.url,
            word_count: article.word_count,
            read_time: article.read_time_minutes,
            content_type: article.content_type,
            difficulty_level: article.difficulty_level,
            image_url: article.image_url,
            featured: article.featured,
            created_at: article.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
struct CreateArticleResponse {
    success: bool,
    article: CreatedArticle,
}

#[derive(Debug, Deserialize)]
struct ListArticlesQuery {
    page: Option<String>,
    limit: Option<String>,
    status: Option<String>,
    content_type: Option<String>,
    difficulty: Option<String>,
    featured: Option<String>,
    trending: Option<String>,
    search: Option<String>,
    sort_by: Option<String>,
    sort_order: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Pagination {
    current_page: u32,
    total_pages: u64,
    total_items: u64,
    items_per_page: u32,
    has_next_page: bool,
    has_prev_page: bool,
}

impl Pagination {
    fn new(page: u32, limit: u32, total: u64) -> Self {
        let total_pages = total.div_ceil(u64::from(limit));
        Pagination {
            current_page: page,
            total_pages,
            total_items: total,
            items_per_page: limit,
            has_next_page: u64::from(page) < total_pages,
            has_prev_page: page > 1,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AppliedFilters {
    status: String,
    content_type: Option<String>,
    difficulty: Option<String>,
    featured: bool,
    trending: bool,
    search: Option<String>,
    sort_by: SortField,
    sort_order: SortOrder,
}

#[derive(Debug, Serialize)]
struct ListArticlesData {
    articles: Vec<ArticleSummary>,
    pagination: Pagination,
    stats: ArticleStats,
    filters: AppliedFilters,
}

#[derive(Debug, Serialize)]
struct ListArticlesResponse {
    success: bool,
    data: ListArticlesData,
}

#[derive(Debug, Serialize)]
struct ArticleData {
    article: Article,
}

#[derive(Debug, Serialize)]
struct ArticleResponse {
    success: bool,
    data: ArticleData,
}

impl ArticleResponse {
    fn new(article: Article) -> Self {
        ArticleResponse {
            success: true,
            data: ArticleData { article },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateArticleRequest {
    title: Option<String>,
    description: Option<String>,
    content: Option<String>,
    content_type: Option<String>,
    difficulty_level: Option<String>,
    status: Option<String>,
    featured: Option<bool>,
    trending: Option<bool>,
    image_url: Option<String>,
}

fn to_i32(value: usize) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// Metrics derived from article HTML
struct ContentMetrics {
    word_count: i32,
    read_time_minutes: i32,
    meta: ContentMeta,
}

impl ContentMetrics {
    fn measure(html: &str) -> Self {
        let words = content::count_words(html);
        ContentMetrics {
            word_count: to_i32(words),
            read_time_minutes: to_i32(content::read_time_minutes(words)),
            meta: content::extract_meta(html),
        }
    }
}

/// UUIDs are looked up by id, anything else by slug
async fn find_article<R: ArticleRepository>(
    repo: &R,
    identifier: &str,
) -> Result<Option<Article>, ApiError> {
    if content::is_uuid(identifier) {
        repo.find_by_id(&identifier.to_lowercase()).await
    } else {
        repo.find_by_slug(identifier).await
    }
}

#[instrument(skip_all, fields(content_type = ?payload.content_type, generate_image = payload.generate_image))]
async fn create_article<S: AppState>(
    State(state): State<S>,
    JsonBody(payload): JsonBody<CreateArticleRequest>,
) -> Result<ResponseJson<CreateArticleResponse>, ApiError> {
    let title = require_text("Article title", payload.title.as_deref())?;
    let description = require_text("Article description", payload.description.as_deref())?;
    let content_type: ContentType = match optional_text(payload.content_type.as_deref()) {
        Some(value) => value.parse()?,
        None => ContentType::default(),
    };
    let difficulty: DifficultyLevel = match optional_text(payload.difficulty_level.as_deref()) {
        Some(value) => value.parse()?,
        None => DifficultyLevel::default(),
    };
    debug!(title = %title, "Processing article request");

    let repo = state.article_repo();

    // Best effort: two concurrent requests with the same title can still collide
    let base_slug = content::generate_slug(&title);
    let taken = repo.slug_exists(&base_slug).await?;
    let slug = content::unique_slug(&base_slug, taken, Utc::now().timestamp_millis());
    if taken {
        debug!(base_slug = %base_slug, slug = %slug, "Slug already taken, suffixed");
    }

    let prompt = ArticlePrompt {
        title: &title,
        description: &description,
        keywords: payload.keywords.as_ref(),
        content_type,
        difficulty,
    }
    .render();

    let raw = state
        .completions()
        .complete(
            CompletionRequest::new(prompt)
                .temperature(0.7)
                .max_tokens(3000),
        )
        .await?;
    let html = content::strip_code_fence(&raw);
    if html.trim().is_empty() {
        return Err(LlmError::EmptyResponse.into());
    }

    let metrics = ContentMetrics::measure(&html);
    let meta_title = content::meta_title(&title);
    let url = state.settings().article_url(&slug);

    let image_url = if payload.generate_image {
        match state
            .completions()
            .generate_image(&prompts::article_image(&title))
            .await
        {
            Ok(url) => url,
            Err(err) => {
                warn!(error = %err, "Failed to generate image, saving article without one");
                None
            }
        }
    } else {
        None
    };

    let now = Utc::now().naive_utc();
    let new_article = NewArticle {
        id: Uuid::new_v4().to_string(),
        title,
        url,
        description,
        content: html,
        excerpt: metrics.meta.excerpt,
        image_url,
        word_count: metrics.word_count,
        read_time_minutes: metrics.read_time_minutes,
        content_type: content_type.to_string(),
        difficulty_level: difficulty.to_string(),
        slug,
        meta_title,
        meta_description: metrics.meta.meta_description,
        status: ArticleStatus::Published.to_string(),
        featured: payload.featured,
        trending: false,
        created_at: now,
        updated_at: now,
        publish_date: Some(now),
    };

    let article = repo.create(&new_article).await?;

    info!(
        id = %article.id,
        slug = %article.slug,
        word_count = article.word_count,
        "Successfully created article"
    );

    Ok(ResponseJson(CreateArticleResponse {
        success: true,
        article: CreatedArticle::from(article),
    }))
}

/// Positive integer query value, or `default` when absent or unparseable
fn positive_or(value: Option<&str>, default: u32) -> u32 {
    value
        .and_then(|v| v.trim().parse::<u32>().ok())
        .filter(|&n| n > 0)
        .unwrap_or(default)
}

fn is_true(flag: Option<&str>) -> bool {
    flag == Some("true")
}

#[instrument(skip_all, fields(page = ?query.page, limit = ?query.limit, has_search = query.search.is_some()))]
async fn list_articles<S: AppState>(
    State(state): State<S>,
    QueryParams(query): QueryParams<ListArticlesQuery>,
) -> Result<ResponseJson<ListArticlesResponse>, ApiError> {
    debug!("Processing list articles request");

    let page = positive_or(query.page.as_deref(), 1);
    let limit = positive_or(query.limit.as_deref(), DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE);

    let status = optional_text(query.status.as_deref())
        .unwrap_or_else(|| ArticleStatus::Published.to_string());
    let filter = ArticleFilter {
        status: (status != ANY_STATUS).then(|| status.clone()),
        content_type: optional_text(query.content_type.as_deref()),
        difficulty: optional_text(query.difficulty.as_deref()),
        featured_only: is_true(query.featured.as_deref()),
        trending_only: is_true(query.trending.as_deref()),
        search: optional_text(query.search.as_deref()),
    };

    let article_query = ArticleQuery {
        filter,
        sort_by: SortField::parse(query.sort_by.as_deref()),
        sort_order: SortOrder::parse(query.sort_order.as_deref()),
        page,
        limit,
    };

    let repo = state.article_repo();
    let result = repo.list(&article_query).await?;
    let stats = repo.stats(&article_query.filter).await?;

    let pagination = Pagination::new(page, limit, result.total);
    let ArticleQuery {
        filter,
        sort_by,
        sort_order,
        ..
    } = article_query;

    info!(
        returned_count = result.items.len(),
        total = result.total,
        "Successfully retrieved article list"
    );

    Ok(ResponseJson(ListArticlesResponse {
        success: true,
        data: ListArticlesData {
            articles: result.items,
            pagination,
            stats,
            filters: AppliedFilters {
                status,
                content_type: filter.content_type,
                difficulty: filter.difficulty,
                featured: filter.featured_only,
                trending: filter.trending_only,
                search: filter.search,
                sort_by,
                sort_order,
            },
        },
    }))
}

#[instrument(skip_all, fields(identifier = %identifier))]
async fn get_article<S: AppState>(
    State(state): State<S>,
    PathParam(identifier): PathParam<String>,
) -> Result<ResponseJson<ArticleResponse>, ApiError> {
    debug!("Processing get article request");

    match find_article(&state.article_repo(), &identifier).await? {
        Some(article) => {
            info!(id = %article.id, "Successfully retrieved article");
            Ok(ResponseJson(ArticleResponse::new(article)))
        }
        None => {
            debug!("Article not found");
            Err(ApiError::NotFound("Article"))
        }
    }
}

fn build_changes(
    existing: &Article,
    payload: UpdateArticleRequest,
    now: NaiveDateTime,
) -> Result<ArticleChanges, ApiError> {
    let mut changes = ArticleChanges {
        updated_at: Some(now),
        featured: payload.featured,
        trending: payload.trending,
        ..ArticleChanges::default()
    };

    if let Some(title) = payload.title.as_deref() {
        let title = require_text("Article title", Some(title))?;
        changes.meta_title = Some(content::meta_title(&title));
        changes.title = Some(title);
    }

    if let Some(description) = payload.description.as_deref() {
        changes.description = Some(require_text("Article description", Some(description))?);
    }

    if let Some(html) = payload.content.as_deref() {
        let html = require_text("Article content", Some(html))?;
        let metrics = ContentMetrics::measure(&html);
        changes.word_count = Some(metrics.word_count);
        changes.read_time_minutes = Some(metrics.read_time_minutes);
        changes.excerpt = Some(metrics.meta.excerpt);
        changes.meta_description = Some(metrics.meta.meta_description);
        changes.content = Some(html);
    }

    if let Some(value) = payload.content_type.as_deref() {
        changes.content_type = Some(value.parse::<ContentType>()?.to_string());
    }

    if let Some(value) = payload.difficulty_level.as_deref() {
        changes.difficulty_level = Some(value.parse::<DifficultyLevel>()?.to_string());
    }

    if let Some(value) = payload.status.as_deref() {
        let status: ArticleStatus = value.parse()?;
        if status == ArticleStatus::Published && existing.publish_date.is_none() {
            changes.publish_date = Some(now);
        }
        changes.status = Some(status.to_string());
    }

    if let Some(image_url) = payload.image_url.as_deref() {
        changes.image_url = Some(validate_http_url("imageUrl", image_url)?);
    }

    Ok(changes)
}

#[instrument(skip_all, fields(identifier = %identifier))]
async fn update_article<S: AppState>(
    State(state): State<S>,
    PathParam(identifier): PathParam<String>,
    JsonBody(payload): JsonBody<UpdateArticleRequest>,
) -> Result<ResponseJson<ArticleResponse>, ApiError> {
    debug!("Processing update article request");

    let repo = state.article_repo();
    let existing = find_article(&repo, &identifier)
        .await?
        .ok_or(ApiError::NotFound("Article"))?;

    let changes = build_changes(&existing, payload, Utc::now().naive_utc())?;
    let updated = repo.update(&existing.id, &changes).await?;

    info!(id = %updated.id, "Successfully updated article");
    Ok(ResponseJson(ArticleResponse::new(updated)))
}

pub fn create_articles_router<S: AppState>() -> Router<S> {
    Router::new()
        .route("/article", post(create_article::<S>))
        .route("/article/get", get(list_articles::<S>))
        .route("/article/get/{identifier}", get(get_article::<S>))
        .route("/article/{identifier}", put(update_article::<S>))
}
