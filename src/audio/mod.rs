use crate::audio::error::{AudioError, AudioResult};
use crate::audio::sink::AudioSink;
use crate::audio::source::AudioSource;
use crate::audio::wav::WavParams;
use crate::cd::frames_to_timecode;
use crate::config::Config;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::info;
use std::path::{Path, PathBuf};

pub mod error;
pub mod probe;
pub mod sink;
pub mod source;
pub mod wav;

/// Length of one copy chunk, in seconds of audio.
pub const CHUNK_SECONDS: u64 = 10;

const PROGRESS_TEMPLATE: &str = "{msg:40!} [{bar:30}] {percent:>3}%";

/// Lowercased extension, which selects the codec.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// One output of a split. `path` is `None` for tracks that are decoded and dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitTarget {
    pub path: Option<PathBuf>,
    pub frames: u64,
}

/// Copies PCM frames between decoders and encoders in fixed size chunks.
pub struct FrameEngine<'a> {
    config: &'a Config,
    progress: MultiProgress,
}

impl<'a> FrameEngine<'a> {
    pub fn new(config: &'a Config, progress: MultiProgress) -> Self {
        Self { config, progress }
    }

    /// Concatenates `inputs` into `output`. The header announces `params.frames`
    /// frames, which must be the sum of the inputs' lengths.
    pub async fn merge(&self, inputs: &[PathBuf], output: &Path, params: &WavParams) -> AudioResult<()> {
        let mut sink = AudioSink::create(output, self.config).await?;
        sink.write_header(params, params.frames).await?;

        let mut position = 0;
        for input in inputs {
            let mut source = AudioSource::open(input, self.config).await?;
            let input_params = *source.params();
            if input_params.with_frames(0) != params.with_frames(0) {
                return Err(AudioError::FormatMismatch {
                    path: input.clone(),
                });
            }

            info!(
                "{} >> {} @ {}",
                input.display(),
                output.display(),
                frames_to_timecode(position, params.sample_rate)
            );
            self.copy_frames(&mut source, &mut sink, input_params.frames, input)
                .await?;
            source.close().await?;
            position += input_params.frames;
        }

        sink.finish().await
    }

    /// Opens `input` for cutting into consecutive pieces with [`Splitter::cut`].
    pub async fn split(&self, input: &Path) -> AudioResult<Splitter<'_, 'a>> {
        let source = AudioSource::open(input, self.config).await?;
        Ok(Splitter {
            engine: self,
            input: input.to_path_buf(),
            source,
        })
    }

    async fn copy_frames(
        &self,
        source: &mut AudioSource,
        sink: &mut AudioSink,
        frames: u64,
        label: &Path,
    ) -> AudioResult<()> {
        let params = *source.params();
        let block_align = params.block_align() as usize;
        let step = (params.sample_rate as u64 * CHUNK_SECONDS).max(1);
        let mut buffer = vec![0u8; step.min(frames) as usize * block_align];

        let pb = self.progress.add(ProgressBar::new(frames));
        if let Ok(style) = ProgressStyle::with_template(PROGRESS_TEMPLATE) {
            pb.set_style(style.progress_chars("=> "));
        }
        pb.set_message(
            label
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_else(|| label.display().to_string()),
        );

        let mut remaining = frames;
        while remaining > 0 {
            let chunk = remaining.min(step);
            let bytes = &mut buffer[..chunk as usize * block_align];
            source.read_frames(bytes).await?;
            sink.write(bytes).await?;

            remaining -= chunk;
            pb.inc(chunk);
        }

        pb.finish_and_clear();
        self.progress.remove(&pb);
        Ok(())
    }
}

/// An image being cut into pieces. Each piece is complete on disk, and its
/// encoder has exited, once [`Splitter::cut`] returns.
pub struct Splitter<'e, 'a> {
    engine: &'e FrameEngine<'a>,
    input: PathBuf,
    source: AudioSource,
}

impl Splitter<'_, '_> {
    /// Copies the next `target.frames` frames of the image into `target`.
    pub async fn cut(&mut self, target: &SplitTarget) -> AudioResult<()> {
        let params = *self.source.params();
        let mut sink = match &target.path {
            Some(path) => AudioSink::create(path, self.engine.config).await?,
            None => AudioSink::discard(),
        };
        sink.write_header(&params, target.frames).await?;

        let label = match &target.path {
            Some(path) => path.display().to_string(),
            None => "(discarded)".to_string(),
        };
        info!(
            "{} > {} # {}",
            self.input.display(),
            label,
            frames_to_timecode(target.frames, params.sample_rate)
        );

        self.engine
            .copy_frames(&mut self.source, &mut sink, target.frames, Path::new(&label))
            .await?;
        sink.finish().await
    }

    /// Drains whatever follows the last piece and waits for the decoder.
    pub async fn finish(self) -> AudioResult<()> {
        self.source.close().await
    }
}
