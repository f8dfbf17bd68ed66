use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No emoji candidates: every selected category pool is empty")]
    EmptyPools,
}

pub type Result<T> = std::result::Result<T, Error>;
