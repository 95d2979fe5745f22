use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TagError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    LoftyError(#[from] lofty::error::LoftyError),

    #[error(transparent)]
    JoinError(#[from] tokio::task::JoinError),

    #[error("\"{0}\" does not carry an embedded cuesheet")]
    NoEmbeddedCuesheet(PathBuf),

    #[error("\"{0}\" cannot hold tags")]
    NoTag(PathBuf),
}

pub type TagResult<T> = Result<T, TagError>;
