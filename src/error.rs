use thiserror::Error;

use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Email is already taken")]
    EmailTaken,

    #[error("Forbidden")]
    Forbidden,

    #[error("Not Found")]
    NotFound,

    #[error("Bad Request {0}")]
    BadRequest(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Serialization error")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal Error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Business conditions the caller renders inline, as opposed to
    /// failures of the persistence layer.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            AppError::InvalidCredentials
                | AppError::EmailTaken
                | AppError::Forbidden
                | AppError::NotFound
                | AppError::BadRequest(_)
        )
    }
}

pub type AppResult<T> = Result<T, AppError>;
