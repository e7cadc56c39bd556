use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid compile options: {0}")]
    InvalidOptions(String),
}

pub type Result<T> = std::result::Result<T, Error>;
