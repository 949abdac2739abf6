use super::traits::JobRepository;
use super::{SharedConnection, lock};
use crate::errors::ApiError;
use crate::models::{JobPosting, NewJobPosting};
use crate::schema::job_postings;
use async_trait::async_trait;
use diesel::prelude::*;

#[derive(Clone)]
pub struct SqliteJobRepository {
    db: SharedConnection,
}

impl SqliteJobRepository {
    pub fn new(db: SharedConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl JobRepository for SqliteJobRepository {
    async fn create(&self, job: &NewJobPosting) -> Result<JobPosting, ApiError> {
        let mut conn = lock(&self.db)?;
        let result = diesel::insert_into(job_postings::table)
            .values(job)
            .returning(JobPosting::as_returning())
            .get_result(&mut *conn)?;
        Ok(result)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<JobPosting>, ApiError> {
        let mut conn = lock(&self.db)?;
        let result = job_postings::table
            .find(id)
            .select(JobPosting::as_select())
            .first(&mut *conn)
            .optional()?;
        Ok(result)
    }

    async fn list(&self) -> Result<Vec<JobPosting>, ApiError> {
        let mut conn = lock(&self.db)?;
        let result = job_postings::table
            .order((job_postings::created_at.desc(), job_postings::id.desc()))
            .select(JobPosting::as_select())
            .load(&mut *conn)?;
        Ok(result)
    }
}
