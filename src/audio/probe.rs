use crate::audio::error::AudioResult;
use crate::audio::source::AudioSource;
use crate::audio::wav::WavParams;
use crate::config::Config;
use std::future::Future;
use std::path::Path;

/// Looks up the sample format and length of a referenced audio file.
pub trait AudioProbe {
    fn probe(&self, path: &Path) -> impl Future<Output = AudioResult<WavParams>>;
}

/// Probes by opening the file through the normal decode path and reading only
/// the WAV header.
pub struct DecoderProbe<'a> {
    config: &'a Config,
}

impl<'a> DecoderProbe<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }
}

impl AudioProbe for DecoderProbe<'_> {
    async fn probe(&self, path: &Path) -> AudioResult<WavParams> {
        let source = AudioSource::open(path, self.config).await?;
        let params = *source.params();
        source.abort().await?;
        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::error::AudioError;
    use crate::audio::wav::WavHeader;

    #[tokio::test]
    async fn probes_wav_length() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.wav");
        let params = WavParams {
            channels: 2,
            sample_width: 2,
            sample_rate: 44_100,
            frames: 588,
        };
        let mut bytes = WavHeader::new(&params, 588).to_bytes().unwrap();
        bytes.resize(bytes.len() + 588 * 4, 0);
        tokio::fs::write(&path, bytes).await.unwrap();

        let config = Config::default();
        assert_eq!(DecoderProbe::new(&config).probe(&path).await.unwrap(), params);
    }

    #[tokio::test]
    async fn garbage_is_not_a_wave_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.wav");
        tokio::fs::write(&path, b"this is not RIFF data").await.unwrap();

        let config = Config::default();
        assert!(matches!(
            DecoderProbe::new(&config).probe(&path).await,
            Err(AudioError::InvalidWave { .. })
        ));
    }
}
