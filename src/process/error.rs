use std::process::ExitStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error("Empty command line")]
    EmptyCommand,

    #[error("Command line \"{0}\" has no %f placeholder")]
    MissingPlaceholder(String),

    #[error("Could not start \"{program}\": {source}")]
    SpawnError {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Error while running child process \"{program}\" ({status}): {stderr}")]
    ChildFailed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },
}

pub type ProcessResult<T> = Result<T, ProcessError>;
