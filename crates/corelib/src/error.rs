//! Shared error type (renderer-agnostic).

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid value '{value}' for {flag}")]
    InvalidArgument { flag: &'static str, value: String },
    #[error("unknown model id {0}")]
    UnknownModel(u32),
}

pub type CoreResult<T> = Result<T, CoreError>;
