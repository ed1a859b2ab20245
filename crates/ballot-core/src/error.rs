use ballot_db::DbError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("{0}")]
    Validation(String),
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("not found")]
    NotFound,
    #[error("forbidden")]
    Forbidden,
    #[error("poll is not active")]
    InactivePoll,
    #[error("invalid option")]
    InvalidOption,
    #[error("duplicate vote")]
    DuplicateVote,
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("store timed out")]
    Timeout,
    #[error("database error: {0}")]
    Database(DbError),
    #[error("{0}")]
    Internal(String),
}

impl From<DbError> for CoreError {
    fn from(e: DbError) -> Self {
        if e.is_timeout() {
            return CoreError::Timeout;
        }
        match e {
            DbError::NotFound => CoreError::NotFound,
            other => CoreError::Database(other),
        }
    }
}
