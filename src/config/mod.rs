use crate::config::error::{ConfigError, ConfigResult};
use crate::config::naming::NamingScheme;
use crate::process::CommandTemplate;
use log::{debug, info};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;

pub mod error;
pub mod naming;

/// Raw PCM container read and written without any external program.
pub const NATIVE_FORMAT: &str = "wav";

pub const DEFAULT_CONFIG: &str = r#"# file naming schemes
#   <%field%...>[|<case>]
#
# available fields: albumartist, artist, album, tracknumber, title
# case conversion: lower, upper, swapcase, capitalize, title

[filenames]
mult_files = "%tracknumber% - %title%|lower"
mult_files_va = "%tracknumber% - %artist% - %title%|lower"
single_file = "%albumartist% - %album%|lower"

# decoders and encoders, one table per file extension
# decoders must write a WAV stream to stdout, encoders must read one from stdin
#   decode = "<command line>"   %f is the input file
#   encode = "<command line>"   %f is the output file
#   rg = "<command line>"       format specific replay gain scanner, %f is the file list

[codecs.flac]
decode = "flac -dcs %f"
encode = "flac -fs -o %f -"
rg = "metaflac --add-replay-gain %f"

[codecs.wv]
decode = "wvunpack -q -o - %f"
encode = "wavpack -myiq -o %f -"
rg = "wvgain -aq %f"

[codecs.ape]
decode = "mac %f - -d"
"#;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub filenames: FilenameSchemes,

    #[serde(default)]
    pub codecs: BTreeMap<String, CodecCommands>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FilenameSchemes {
    pub mult_files: NamingScheme,
    pub mult_files_va: NamingScheme,
    pub single_file: NamingScheme,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CodecCommands {
    pub decode: Option<CommandTemplate>,
    pub encode: Option<CommandTemplate>,
    pub rg: Option<CommandTemplate>,
}

impl Config {
    /// Loads `path`, or the per-user config file, writing the defaults there on first run.
    pub async fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let path = Self::default_path()?;
                if !fs::try_exists(&path).await? {
                    Self::write_default(&path).await?;
                }
                path
            }
        };

        debug!("Reading config file: {path:?}");
        let contents = fs::read_to_string(&path).await?;
        Self::from_toml(&contents).map_err(|source| ConfigError::ParseError { path, source })
    }

    pub fn default_path() -> ConfigResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("cueshift").join("config.toml"))
            .ok_or(ConfigError::NoConfigDir)
    }

    async fn write_default(path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(path, DEFAULT_CONFIG).await?;
        info!("Wrote default config file to {path:?}");
        Ok(())
    }

    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    fn codec(&self, extension: &str) -> Option<&CodecCommands> {
        self.codecs.get(&extension.to_lowercase())
    }

    pub fn decoder(&self, extension: &str) -> ConfigResult<&CommandTemplate> {
        self.codec(extension)
            .and_then(|codec| codec.decode.as_ref())
            .ok_or_else(|| ConfigError::NoDecoder(extension.to_string()))
    }

    pub fn encoder(&self, extension: &str) -> ConfigResult<&CommandTemplate> {
        self.codec(extension)
            .and_then(|codec| codec.encode.as_ref())
            .ok_or_else(|| ConfigError::NoEncoder(extension.to_string()))
    }

    pub fn replay_gain(&self, extension: &str) -> Option<&CommandTemplate> {
        self.codec(extension).and_then(|codec| codec.rg.as_ref())
    }
}

#[cfg(test)]
impl Default for Config {
    fn default() -> Self {
        Self::from_toml(DEFAULT_CONFIG).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_parses() {
        let config = Config::from_toml(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.codecs.len(), 3);
        assert_eq!(
            config.decoder("flac").unwrap().to_string(),
            "flac -dcs %f"
        );
        assert!(config.replay_gain("ape").is_none());
    }

    #[test]
    fn extensions_are_case_insensitive() {
        let config = Config::default();
        assert!(config.encoder("FLAC").is_ok());
        assert!(config.decoder("Wv").is_ok());
    }

    #[test]
    fn missing_codec_is_a_configuration_error() {
        let config = Config::default();
        assert!(matches!(config.encoder("ape"), Err(ConfigError::NoEncoder(ext)) if ext == "ape"));
        assert!(matches!(config.decoder("ogg"), Err(ConfigError::NoDecoder(ext)) if ext == "ogg"));
    }

    #[test]
    fn command_without_placeholder_fails_to_load() {
        let contents = DEFAULT_CONFIG.replace("flac -dcs %f", "flac -dcs");
        let err = Config::from_toml(&contents).unwrap_err();
        assert!(err.to_string().contains("%f"));
    }

    #[tokio::test]
    async fn explicit_path_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        tokio::fs::write(
            &path,
            DEFAULT_CONFIG.replace("[codecs.ape]", "[codecs.tta]"),
        )
        .await
        .unwrap();

        let config = Config::load(Some(&path)).await.unwrap();
        assert!(config.decoder("tta").is_ok());
        assert!(config.decoder("ape").is_err());
    }

    #[tokio::test]
    async fn explicit_missing_path_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("nope.toml")))
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
