use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum AuthApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("An account for this Telegram id already exists")]
    DuplicateUser,
    #[error("User account not found")]
    UserNotFound,
    #[error("The storage backend timed out")]
    Timeout,
}

impl From<sqlx::Error> for AuthApiError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut => AuthApiError::Timeout,
            sqlx::Error::RowNotFound => AuthApiError::UserNotFound,
            sqlx::Error::Database(de) if de.is_unique_violation() => AuthApiError::DuplicateUser,
            other => AuthApiError::DatabaseError(other.to_string()),
        }
    }
}
