use thiserror::Error;

pub type Result<T> = std::result::Result<T, IndexerError>;

#[derive(Error, Debug)]
pub enum IndexerError {
    #[error("Path does not exist: {0}")]
    MissingPath(String),

    #[error("Path is not a directory: {0}")]
    NotADirectory(String),

    #[error("Tokenizer load failed: {0}")]
    TokenizerError(String),
}
