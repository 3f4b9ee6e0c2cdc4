use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid query parameters: {0}")]
    InvalidQuery(String),

    #[error("Index build failed: {0}")]
    IndexBuild(String),
}

pub type Result<T> = std::result::Result<T, Error>;
