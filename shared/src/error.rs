//! Errors raised while interpreting OpenScale documents and scoring requests

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Invalid JSON payload.")]
    InvalidJson,

    #[error("{0}")]
    InvalidRequest(String),

    #[error("Invalid subscription payload structure")]
    InvalidSubscription,
}

pub type ModelResult<T> = Result<T, ModelError>;
