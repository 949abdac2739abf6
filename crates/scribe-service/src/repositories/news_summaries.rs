use super::traits::NewsSummaryRepository;
use super::{SharedConnection, lock};
use crate::errors::ApiError;
use crate::models::{NewNewsSummary, NewsSummary};
use crate::schema::news_summaries;
use async_trait::async_trait;
use diesel::prelude::*;

#[derive(Clone)]
pub struct SqliteNewsSummaryRepository {
    db: SharedConnection,
}

impl SqliteNewsSummaryRepository {
    pub fn new(db: SharedConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl NewsSummaryRepository for SqliteNewsSummaryRepository {
    async fn create(&self, summary: &NewNewsSummary) -> Result<NewsSummary, ApiError> {
        let mut conn = lock(&self.db)?;
        let result = diesel::insert_into(news_summaries::table)
            .values(summary)
            .returning(NewsSummary::as_returning())
            .get_result(&mut *conn)?;
        Ok(result)
    }

    async fn list(&self, approved: Option<bool>) -> Result<Vec<NewsSummary>, ApiError> {
        let mut conn = lock(&self.db)?;
        let mut query = news_summaries::table.into_boxed();
        if let Some(approved) = approved {
            query = query.filter(news_summaries::approved.eq(approved));
        }

        let result = query
            .order((news_summaries::created_at.desc(), news_summaries::id.desc()))
            .select(NewsSummary::as_select())
            .load(&mut *conn)?;
        Ok(result)
    }

    async fn approve(&self, id: i32) -> Result<Option<NewsSummary>, ApiError> {
        let mut conn = lock(&self.db)?;
        let now = chrono::Utc::now().naive_utc();
        let result = diesel::update(news_summaries::table.find(id))
            .set((
                news_summaries::approved.eq(true),
                news_summaries::approved_at.eq(Some(now)),
            ))
            .returning(NewsSummary::as_returning())
            .get_result(&mut *conn)
            .optional()?;
        Ok(result)
    }
}
