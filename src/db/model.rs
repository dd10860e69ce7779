#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

pub type DbResult<T> = Result<T, DbError>;
