use crate::audio::error::AudioError;
use crate::config::error::ConfigError;
use crate::cue::error::CueError;
use crate::process::error::ProcessError;
use crate::tags::error::TagError;
use std::path::PathBuf;
use std::result;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CueshiftError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    CueError(#[from] CueError),

    #[error(transparent)]
    AudioError(#[from] AudioError),

    #[error(transparent)]
    ConfigError(#[from] ConfigError),

    #[error(transparent)]
    ProcessError(#[from] ProcessError),

    #[error(transparent)]
    TagError(#[from] TagError),

    #[error("Cannot open \"{path}\" for {mode}: {source}")]
    OpenError {
        path: PathBuf,
        mode: &'static str,
        #[source]
        source: std::io::Error,
    },
}

pub type CueshiftResult<T> = result::Result<T, CueshiftError>;
