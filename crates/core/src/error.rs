use thiserror::Error;

#[derive(Error, Debug)]
pub enum CheckError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("timeout after {0}s")]
    Timeout(u64),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("no login form found at {0}")]
    FormNotFound(String),

    #[error("mail error: {0}")]
    Mail(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}
