use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("{0}")]
    Resolution(String),
    #[error("{0}")]
    ToolExecution(String),
    #[error("failed to create/update PR comment: {0}")]
    Reconciliation(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
