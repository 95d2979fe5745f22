use crate::config::error::ConfigError;
use crate::process::error::ProcessError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    BinRWError(#[from] binrw::Error),

    #[error(transparent)]
    ProcessError(#[from] ProcessError),

    #[error(transparent)]
    ConfigError(#[from] ConfigError),

    #[error("Cannot open \"{path}\" for {mode}: {source}")]
    OpenError {
        path: PathBuf,
        mode: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot open wave file \"{path}\": {reason}")]
    InvalidWave { path: PathBuf, reason: String },

    #[error("Cannot decode \"{path}\": {stderr}")]
    DecodeError { path: PathBuf, stderr: String },

    #[error("Audio stream of \"{path}\" ended {missing} frames early")]
    Truncated { path: PathBuf, missing: u64 },

    #[error("\"{path}\" does not share the sample format of the other files")]
    FormatMismatch { path: PathBuf },
}

pub type AudioResult<T> = Result<T, AudioError>;
