use crate::audio::error::AudioError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CueError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    AudioError(#[from] AudioError),

    #[error("Invalid timecode: {0}")]
    InvalidMSFFormat(String),

    #[error(transparent)]
    ParseIntError(#[from] std::num::ParseIntError),

    #[error("{0}")]
    MissingQuoteError(String),

    #[error("Unknown character set: {0}")]
    UnknownCharmap(String),

    #[error("No track length could be determined, check the FILE references")]
    NoTrackLength,

    #[error("Failed to recognise cuesheet type")]
    UnrecognizedLayout,
}

pub type CueResult<T> = Result<T, CueError>;
