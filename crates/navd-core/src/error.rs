use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Tag file error: {0}")]
    Storage(String),

    #[error("Cannot reach daemon: {0}")]
    Transport(String),
}

pub type Result<T> = std::result::Result<T, Error>;
