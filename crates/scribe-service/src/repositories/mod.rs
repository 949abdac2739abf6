use diesel::sqlite::SqliteConnection;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::errors::ApiError;

pub mod articles;
pub mod jobs;
pub mod news_summaries;
pub mod traits;

pub use articles::SqliteArticleRepository;
pub use jobs::SqliteJobRepository;
pub use news_summaries::SqliteNewsSummaryRepository;
pub use traits::*;

pub type SharedConnection = Arc<Mutex<SqliteConnection>>;

fn lock(db: &SharedConnection) -> Result<MutexGuard<'_, SqliteConnection>, ApiError> {
    db.lock()
        .map_err(|_| ApiError::InternalError("database connection lock poisoned".to_string()))
}
