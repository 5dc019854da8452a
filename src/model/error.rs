use thiserror::Error;

pub type DatabaseResult<T> = std::result::Result<T, DatabaseError>;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("sqlx migrate error: {0}")]
    SqlxMigrateError(#[from] sqlx::migrate::MigrateError),
    #[error("sqlx error: {0}")]
    SqlxError(#[from] sqlx::Error),
    #[error("access to this resource is forbidden")]
    Forbidden,
}

impl DatabaseError {
    /// Unique-constraint violation, e.g. a second review for the same course.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Self::SqlxError(sqlx::Error::Database(e)) => e.is_unique_violation(),
            _ => false,
        }
    }
}
