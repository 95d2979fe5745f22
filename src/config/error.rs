use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error("Config file {path:?}: {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Could not determine the user configuration directory")]
    NoConfigDir,

    #[error("Don't know how to decode \"{0}\" files, please set a decoder in the config file")]
    NoDecoder(String),

    #[error("Don't know how to encode \"{0}\" files, please set an encoder in the config file")]
    NoEncoder(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
