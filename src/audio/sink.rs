use crate::audio::error::{AudioError, AudioResult};
use crate::audio::extension_of;
use crate::audio::wav::{WavHeader, WavParams};
use crate::config::{Config, NATIVE_FORMAT};
use crate::process::ChildProcess;
use crate::process::error::ProcessError;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};

type BoxedWriter = Box<dyn AsyncWrite + Unpin + Send>;

/// Encode side of the engine: a WAV file on disk, the stdin of the configured
/// encoder, or nothing at all for tracks that are decoded only to be dropped.
pub struct AudioSink {
    writer: BoxedWriter,
    encoder: Option<ChildProcess>,
}

impl AudioSink {
    pub async fn create(path: &Path, config: &Config) -> AudioResult<Self> {
        let extension = extension_of(path);
        if extension == NATIVE_FORMAT {
            let file = File::create(path)
                .await
                .map_err(|source| AudioError::OpenError {
                    path: path.to_path_buf(),
                    mode: "writing",
                    source,
                })?;
            return Ok(Self {
                writer: Box::new(BufWriter::new(file)),
                encoder: None,
            });
        }

        let template = config.encoder(&extension)?;
        let (process, stdin) = ChildProcess::spawn_encoder(template, path.as_os_str())?;
        Ok(Self {
            writer: Box::new(stdin),
            encoder: Some(process),
        })
    }

    pub fn discard() -> Self {
        Self {
            writer: Box::new(tokio::io::sink()),
            encoder: None,
        }
    }

    pub async fn write_header(&mut self, params: &WavParams, frames: u64) -> AudioResult<()> {
        let header = WavHeader::new(params, frames).to_bytes()?;
        self.write(&header).await
    }

    pub async fn write(&mut self, data: &[u8]) -> AudioResult<()> {
        match self.writer.write_all(data).await {
            Ok(()) => Ok(()),
            Err(err) => Err(self.encoder_failure(err).await),
        }
    }

    /// A write error on a pipe usually means the encoder died; prefer its diagnostic.
    async fn encoder_failure(&mut self, err: std::io::Error) -> AudioError {
        let Some(encoder) = self.encoder.take() else {
            return err.into();
        };

        drop(std::mem::replace(&mut self.writer, Box::new(tokio::io::sink())));
        match encoder.wait().await {
            Err(failed @ ProcessError::ChildFailed { .. }) => failed.into(),
            _ => err.into(),
        }
    }

    /// Flushes and closes the stream, then waits for the encoder to finish.
    pub async fn finish(self) -> AudioResult<()> {
        let Self {
            mut writer,
            encoder,
        } = self;

        writer.flush().await?;
        writer.shutdown().await?;
        drop(writer);

        if let Some(encoder) = encoder {
            encoder.wait().await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> WavParams {
        WavParams {
            channels: 2,
            sample_width: 2,
            sample_rate: 44_100,
            frames: 0,
        }
    }

    #[tokio::test]
    async fn native_sink_writes_header_and_pcm() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");

        let mut sink = AudioSink::create(&path, &Config::default()).await.unwrap();
        sink.write_header(&params(), 1).await.unwrap();
        sink.write(&[1, 2, 3, 4]).await.unwrap();
        sink.finish().await.unwrap();

        let bytes = tokio::fs::read(&path).await.unwrap();
        assert_eq!(bytes.len(), 48);
        assert_eq!(&bytes[44..], &[1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn discard_sink_accepts_anything() {
        let mut sink = AudioSink::discard();
        sink.write_header(&params(), 10).await.unwrap();
        sink.write(&[0; 40]).await.unwrap();
        sink.finish().await.unwrap();
    }

    #[tokio::test]
    async fn unwritable_path_is_an_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.wav");
        assert!(matches!(
            AudioSink::create(&path, &Config::default()).await,
            Err(AudioError::OpenError { mode: "writing", .. })
        ));
    }

    #[tokio::test]
    async fn format_without_encoder_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            AudioSink::create(&dir.path().join("out.ape"), &Config::default()).await,
            Err(AudioError::ConfigError(_))
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_encoder_is_reported_on_finish() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::from_toml(&crate::config::DEFAULT_CONFIG.replace(
            "[codecs.ape]",
            "[codecs.bad]\nencode = \"ls %f\"\n[codecs.ape]",
        ))
        .unwrap();

        let sink = AudioSink::create(&dir.path().join("nothing.bad"), &config)
            .await
            .unwrap();
        assert!(matches!(
            sink.finish().await,
            Err(AudioError::ProcessError(ProcessError::ChildFailed { .. }))
        ));
    }
}
