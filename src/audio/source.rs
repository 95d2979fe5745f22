use crate::audio::error::{AudioError, AudioResult};
use crate::audio::extension_of;
use crate::audio::wav::{self, HeaderError, WavParams};
use crate::config::{Config, NATIVE_FORMAT};
use crate::process::ChildProcess;
use crate::process::error::ProcessError;
use log::debug;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, BufReader};

type BoxedReader = Box<dyn AsyncRead + Unpin + Send>;

/// Decode side of the engine: a WAV stream read either straight from disk or
/// from the stdout of the decoder configured for the file's extension.
pub struct AudioSource {
    path: PathBuf,
    reader: BoxedReader,
    decoder: Option<ChildProcess>,
    params: WavParams,
}

impl AudioSource {
    pub async fn open(path: &Path, config: &Config) -> AudioResult<Self> {
        let open_error = |source| AudioError::OpenError {
            path: path.to_path_buf(),
            mode: "reading",
            source,
        };

        let extension = extension_of(path);
        let (mut reader, decoder): (BoxedReader, Option<ChildProcess>) =
            if extension == NATIVE_FORMAT {
                let file = File::open(path).await.map_err(open_error)?;
                (Box::new(BufReader::new(file)), None)
            } else {
                let template = config.decoder(&extension)?;
                tokio::fs::metadata(path).await.map_err(open_error)?;
                let (process, stdout) = ChildProcess::spawn_decoder(template, path.as_os_str())?;
                (Box::new(BufReader::new(stdout)), Some(process))
            };

        match wav::read_header(&mut reader).await {
            Ok(params) => {
                debug!("Opened {path:?}: {params:?}");
                Ok(Self {
                    path: path.to_path_buf(),
                    reader,
                    decoder,
                    params,
                })
            }
            Err(err) => {
                drop(reader);
                Err(header_failure(path, err, decoder).await)
            }
        }
    }

    pub fn params(&self) -> &WavParams {
        &self.params
    }

    /// Fills `buffer` completely with PCM bytes.
    pub async fn read_frames(&mut self, buffer: &mut [u8]) -> AudioResult<()> {
        let mut filled = 0;
        while filled < buffer.len() {
            let read = self.reader.read(&mut buffer[filled..]).await?;
            if read == 0 {
                let block_align = self.params.block_align().max(1) as usize;
                return Err(AudioError::Truncated {
                    path: self.path.clone(),
                    missing: ((buffer.len() - filled) / block_align) as u64,
                });
            }
            filled += read;
        }
        Ok(())
    }

    /// Consumes whatever is left of the stream and reaps the decoder.
    pub async fn close(self) -> AudioResult<()> {
        let Self {
            mut reader,
            decoder,
            ..
        } = self;

        tokio::io::copy(&mut reader, &mut tokio::io::sink()).await?;
        drop(reader);

        if let Some(decoder) = decoder {
            decoder.wait().await?;
        }
        Ok(())
    }

    /// Stops reading after the header; used when only the parameters were wanted.
    pub async fn abort(self) -> AudioResult<()> {
        let Self {
            reader, decoder, ..
        } = self;
        drop(reader);

        if let Some(decoder) = decoder {
            decoder.kill().await?;
        }
        Ok(())
    }
}

async fn header_failure(path: &Path, err: HeaderError, decoder: Option<ChildProcess>) -> AudioError {
    match (err, decoder) {
        (HeaderError::Io(io_err), Some(decoder)) => match decoder.wait().await {
            Err(ProcessError::ChildFailed { stderr, .. }) => AudioError::DecodeError {
                path: path.to_path_buf(),
                stderr,
            },
            Err(other) => other.into(),
            Ok(()) => AudioError::DecodeError {
                path: path.to_path_buf(),
                stderr: io_err.to_string(),
            },
        },
        (HeaderError::Io(io_err), None) => AudioError::InvalidWave {
            path: path.to_path_buf(),
            reason: io_err.to_string(),
        },
        (HeaderError::Malformed(reason), decoder) => {
            if let Some(decoder) = decoder {
                let _ = decoder.kill().await;
            }
            AudioError::InvalidWave {
                path: path.to_path_buf(),
                reason,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::wav::WavHeader;

    async fn write_wav(path: &Path, params: &WavParams, pcm: &[u8]) {
        let mut bytes = WavHeader::new(params, params.frames).to_bytes().unwrap();
        bytes.extend_from_slice(pcm);
        tokio::fs::write(path, bytes).await.unwrap();
    }

    fn params(frames: u64) -> WavParams {
        WavParams {
            channels: 1,
            sample_width: 2,
            sample_rate: 8_000,
            frames,
        }
    }

    #[tokio::test]
    async fn reads_native_wav_frames() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        write_wav(&path, &params(4), &[1, 0, 2, 0, 3, 0, 4, 0]).await;

        let config = Config::default();
        let mut source = AudioSource::open(&path, &config).await.unwrap();
        assert_eq!(source.params().frames, 4);

        let mut buffer = [0u8; 6];
        source.read_frames(&mut buffer).await.unwrap();
        assert_eq!(buffer, [1, 0, 2, 0, 3, 0]);
        source.close().await.unwrap();
    }

    #[tokio::test]
    async fn short_stream_is_truncated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.wav");
        write_wav(&path, &params(4), &[1, 0, 2, 0]).await;

        let config = Config::default();
        let mut source = AudioSource::open(&path, &config).await.unwrap();
        let mut buffer = [0u8; 8];
        assert!(matches!(
            source.read_frames(&mut buffer).await,
            Err(AudioError::Truncated { missing: 2, .. })
        ));
    }

    #[tokio::test]
    async fn missing_file_cannot_be_opened() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();

        for name in ["gone.wav", "gone.flac"] {
            let result = AudioSource::open(&dir.path().join(name), &config).await;
            assert!(matches!(result, Err(AudioError::OpenError { .. })), "{name}");
        }
    }

    #[tokio::test]
    async fn unknown_extension_needs_a_decoder() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("track.ogg");
        tokio::fs::write(&path, b"OggS").await.unwrap();

        let result = AudioSource::open(&path, &Config::default()).await;
        assert!(matches!(result, Err(AudioError::ConfigError(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn decoder_stdout_is_read_as_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("piped.raw");
        write_wav(&path, &params(2), &[9, 0, 8, 0]).await;

        let config = Config::from_toml(
            &crate::config::DEFAULT_CONFIG.replace("[codecs.ape]", "[codecs.raw]\ndecode = \"cat %f\"\n[codecs.ape]"),
        )
        .unwrap();

        let mut source = AudioSource::open(&path, &config).await.unwrap();
        let mut buffer = [0u8; 4];
        source.read_frames(&mut buffer).await.unwrap();
        assert_eq!(buffer, [9, 0, 8, 0]);
        source.close().await.unwrap();
    }
}
