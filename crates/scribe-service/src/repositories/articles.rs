use super::traits::{
    ArticleFilter, ArticlePage, ArticleQuery, ArticleRepository, ArticleStats, SortField,
    SortOrder,
};
use super::{SharedConnection, lock};
use crate::db::fold_case;
use crate::errors::ApiError;
use crate::models::{Article, ArticleChanges, ArticleSummary, NewArticle};
use crate::schema::articles;
use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;

#[derive(Clone)]
pub struct SqliteArticleRepository {
    db: SharedConnection,
}

impl SqliteArticleRepository {
    pub fn new(db: SharedConnection) -> Self {
        Self { db }
    }
}

fn filtered(filter: &ArticleFilter) -> articles::BoxedQuery<'_, Sqlite> {
    let mut query = articles::table.into_boxed();

    if let Some(status) = &filter.status {
        query = query.filter(articles::status.eq(status.as_str()));
    }
    if let Some(content_type) = &filter.content_type {
        query = query.filter(articles::content_type.eq(content_type.as_str()));
    }
    if let Some(difficulty) = &filter.difficulty {
        query = query.filter(articles::difficulty_level.eq(difficulty.as_str()));
    }
    if filter.featured_only {
        query = query.filter(articles::featured.eq(true));
    }
    if filter.trending_only {
        query = query.filter(articles::trending.eq(true));
    }
    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", escape_like(&search.to_lowercase()));
        query = query.filter(
            fold_case(articles::title)
                .like(pattern.clone())
                .escape('\\')
                .or(fold_case(articles::description)
                    .like(pattern)
                    .escape('\\')),
        );
    }

    query
}

/// Make `%`, `_` and `\` match themselves in a LIKE pattern escaped with `\`
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

macro_rules! sort_by_column {
    ($query:expr, $column:expr, $order:expr) => {
        match $order {
            SortOrder::Asc => $query.order_by($column.asc()),
            SortOrder::Desc => $query.order_by($column.desc()),
        }
    };
}

fn ordered<'a>(
    query: articles::BoxedQuery<'a, Sqlite>,
    sort_by: SortField,
    order: SortOrder,
) -> articles::BoxedQuery<'a, Sqlite> {
    let query = match sort_by {
        SortField::CreatedAt => sort_by_column!(query, articles::created_at, order),
        SortField::UpdatedAt => sort_by_column!(query, articles::updated_at, order),
        SortField::Title => sort_by_column!(query, articles::title, order),
        SortField::WordCount => sort_by_column!(query, articles::word_count, order),
        SortField::ReadTimeMinutes => sort_by_column!(query, articles::read_time_minutes, order),
        SortField::PublishDate => {
            // unpublished rows go last in either direction
            let query = query.order_by(articles::publish_date.is_null().asc());
            match order {
                SortOrder::Asc => query.then_order_by(articles::publish_date.asc()),
                SortOrder::Desc => query.then_order_by(articles::publish_date.desc()),
            }
        }
    };

    query.then_order_by(articles::id.asc())
}

fn aggregate(rows: Vec<(i32, i32, String, String)>) -> ArticleStats {
    let mut stats = ArticleStats {
        total: rows.len() as u64,
        ..ArticleStats::default()
    };

    if rows.is_empty() {
        return stats;
    }

    let mut word_total = 0i64;
    let mut read_time_total = 0i64;

    for (word_count, read_time, content_type, difficulty) in rows {
        word_total += i64::from(word_count);
        read_time_total += i64::from(read_time);

        if !content_type.is_empty() {
            *stats.content_types.entry(content_type).or_default() += 1;
        }
        if !difficulty.is_empty() {
            *stats.difficulty_levels.entry(difficulty).or_default() += 1;
        }
    }

    let total = stats.total as f64;
    stats.avg_word_count = (word_total as f64 / total).round() as i64;
    stats.avg_read_time = (read_time_total as f64 / total).round() as i64;
    stats
}

#[async_trait]
impl ArticleRepository for SqliteArticleRepository {
    async fn slug_exists(&self, slug: &str) -> Result<bool, ApiError> {
        let mut conn = lock(&self.db)?;
        let count: i64 = articles::table
            .filter(articles::slug.eq(slug))
            .count()
            .get_result(&mut *conn)?;
        Ok(count > 0)
    }

    async fn create(&self, article: &NewArticle) -> Result<Article, ApiError> {
        let mut conn = lock(&self.db)?;
        let result = diesel::insert_into(articles::table)
            .values(article)
            .returning(Article::as_returning())
            .get_result(&mut *conn)?;
        Ok(result)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Article>, ApiError> {
        let mut conn = lock(&self.db)?;
        let result = articles::table
            .find(id)
            .select(Article::as_select())
            .first(&mut *conn)
            .optional()?;
        Ok(result)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Article>, ApiError> {
        let mut conn = lock(&self.db)?;
        let result = articles::table
            .filter(articles::slug.eq(slug))
            .order(articles::created_at.asc())
            .select(Article::as_select())
            .first(&mut *conn)
            .optional()?;
        Ok(result)
    }

    async fn update(&self, id: &str, changes: &ArticleChanges) -> Result<Article, ApiError> {
        let mut conn = lock(&self.db)?;
        let result = diesel::update(articles::table.find(id))
            .set(changes)
            .returning(Article::as_returning())
            .get_result(&mut *conn)?;
        Ok(result)
    }

    async fn list(&self, query: &ArticleQuery) -> Result<ArticlePage, ApiError> {
        let mut conn = lock(&self.db)?;

        let total: i64 = filtered(&query.filter).count().get_result(&mut *conn)?;

        let items = ordered(filtered(&query.filter), query.sort_by, query.sort_order)
            .select(ArticleSummary::as_select())
            .limit(i64::from(query.limit))
            .offset(query.offset())
            .load(&mut *conn)?;

        Ok(ArticlePage {
            items,
            total: total as u64,
        })
    }

    async fn stats(&self, filter: &ArticleFilter) -> Result<ArticleStats, ApiError> {
        let mut conn = lock(&self.db)?;
        let rows = filtered(filter)
            .select((
                articles::word_count,
                articles::read_time_minutes,
                articles::content_type,
                articles::difficulty_level,
            ))
            .load::<(i32, i32, String, String)>(&mut *conn)?;
        Ok(aggregate(rows))
    }
}
