use diesel::prelude::*;
use diesel::sql_types::Text;
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use thiserror::Error;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

define_sql_function! {
    /// Unicode lowercase; sqlite's own `lower` and `LIKE` only fold ASCII
    fn fold_case(text: Text) -> Text;
}

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Failed to connect to database: {0}")]
    Connection(#[from] ConnectionError),
    #[error("Failed to run migrations: {0}")]
    Migration(String),
    #[error("Failed to register sql function: {0}")]
    Function(#[from] diesel::result::Error),
}

/// Open a sqlite connection and bring its schema up to date
pub fn establish_connection(database_url: &str) -> Result<SqliteConnection, DbError> {
    let mut connection = SqliteConnection::establish(database_url)?;
    fold_case_utils::register_impl(&mut connection, |text: String| text.to_lowercase())?;

    connection
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| DbError::Migration(err.to_string()))?;

    Ok(connection)
}
