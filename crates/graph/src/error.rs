use thiserror::Error;

pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Input directory does not exist: {0}")]
    MissingInputDir(String),

    #[error("Invalid file pattern: {0}")]
    PatternError(#[from] globset::Error),
}
