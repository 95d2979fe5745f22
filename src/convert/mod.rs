use crate::audio::probe::DecoderProbe;
use crate::audio::{FrameEngine, SplitTarget, extension_of};
use crate::commands::Cli;
use crate::config::{Config, NATIVE_FORMAT};
use crate::cue::CueParser;
use crate::cue::charset::decode_cuesheet;
use crate::cue::error::CueError;
use crate::cue::layout::layout_report;
use crate::cue::lengths::calculate_lengths;
use crate::cue::models::{CueSheet, Layout};
use crate::cue::names::FileNamer;
use crate::cue::transform::{TargetOptions, transform};
use crate::error::{CueshiftError, CueshiftResult};
use crate::process;
use crate::tags::{ReleaseInfo, TagSet, read_embedded_cuesheet, write_tags};
use indicatif::MultiProgress;
use log::{debug, info, warn};
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::fs;

#[cfg(windows)]
const LINE_TERMINATOR: &str = "\r\n";
#[cfg(not(windows))]
const LINE_TERMINATOR: &str = "\n";

const SCISSORS: &str = "- - - - - - - - - - 8< - - - - - - - - - -";

/// Where the audio named by `FILE` lines lives.
struct Sources {
    base_dir: PathBuf,
    ref_file: Option<PathBuf>,
}

impl Sources {
    fn resolve(&self, name: &str) -> PathBuf {
        match &self.ref_file {
            Some(path) => path.clone(),
            None => self.base_dir.join(name),
        }
    }

    /// Every distinct source file in track order.
    fn distinct(&self, sheet: &CueSheet) -> Vec<PathBuf> {
        let first = if sheet.trackzero_present { 0 } else { 1 };
        let mut paths: Vec<PathBuf> = Vec::new();
        for number in first..=sheet.num_tracks {
            if let Some(name) = &sheet.track(number).name {
                let path = self.resolve(name);
                if !paths.contains(&path) {
                    paths.push(path);
                }
            }
        }
        paths
    }
}

/// The conversion state left behind by parsing and rewriting a sheet.
struct Converted {
    sheet: CueSheet,
    layout: Layout,
    sources: Sources,
    cuesheet: String,
}

pub struct Converter<'a> {
    cli: &'a Cli,
    config: &'a Config,
    progress: MultiProgress,
    formats: Vec<String>,
    options: TargetOptions,
}

impl<'a> Converter<'a> {
    pub fn new(cli: &'a Cli, config: &'a Config, progress: MultiProgress) -> Self {
        Self {
            cli,
            config,
            progress,
            formats: cli.formats(),
            options: TargetOptions::new(cli.compliant, cli.zero_track),
        }
    }

    pub async fn run(&self) -> CueshiftResult<()> {
        let converted = self.convert_cuesheet().await?;
        self.save_cuesheet(&converted.cuesheet).await?;

        if self.cli.write {
            let produced = self.write_files(&converted).await?;
            if self.cli.delete_files {
                delete_sources(&converted, &produced).await?;
            }
        }

        info!("Finished successfully");
        Ok(())
    }

    async fn convert_cuesheet(&self) -> CueshiftResult<Converted> {
        let input = &self.cli.input;
        let base_dir = input
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let (text, ref_file) = if extension_of(input) == "cue" {
            let bytes = fs::read(input)
                .await
                .map_err(|source| CueshiftError::OpenError {
                    path: input.clone(),
                    mode: "reading",
                    source,
                })?;
            (decode_cuesheet(&bytes, self.cli.charmap.as_deref())?, None)
        } else {
            info!("Reading embedded cuesheet from {input:?}");
            (read_embedded_cuesheet(input).await?, Some(input.clone()))
        };

        let probe = DecoderProbe::new(self.config);
        let mut parser = CueParser::new(&probe, &base_dir);
        if let Some(path) = &ref_file {
            parser = parser.with_ref_file(path);
        }
        let mut sheet = parser.parse(&text).await?;

        let layout = sheet.classify()?;
        let namer = FileNamer::new(&self.config.filenames, &self.formats[0]);
        transform(&mut sheet, layout, self.options, &namer);
        if layout == Layout::SingleFile {
            calculate_lengths(&mut sheet, self.options);
        }
        debug!("{}", layout_report(&sheet, layout, self.options));

        let cuesheet = sheet.render(LINE_TERMINATOR);
        Ok(Converted {
            sheet,
            layout,
            sources: Sources { base_dir, ref_file },
            cuesheet,
        })
    }

    async fn save_cuesheet(&self, cuesheet: &str) -> CueshiftResult<()> {
        match &self.cli.output {
            Some(path) => {
                fs::write(path, cuesheet)
                    .await
                    .map_err(|source| CueshiftError::OpenError {
                        path: path.clone(),
                        mode: "writing",
                        source,
                    })?;
                info!("Wrote cuesheet to {path:?}");
            }
            None => {
                debug!("{SCISSORS}");
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(cuesheet.as_bytes())?;
                stdout.flush()?;
                debug!("{SCISSORS}");
            }
        }
        Ok(())
    }

    /// Splits or merges the audio once per requested format and returns every produced file.
    async fn write_files(&self, converted: &Converted) -> CueshiftResult<Vec<PathBuf>> {
        let release = ReleaseInfo {
            year: self.cli.year.clone(),
            discnumber: self.cli.discnumber.clone(),
        };
        let engine = FrameEngine::new(self.config, self.progress.clone());
        let out_dir = &converted.sources.base_dir;
        let sheet = &converted.sheet;

        let mut produced = Vec::new();
        for format in &self.formats {
            info!("Writing {format} files...");
            let namer = FileNamer::new(&self.config.filenames, format);

            let files = if converted.layout == Layout::SingleFile {
                let image = sheet
                    .track(1)
                    .name
                    .as_deref()
                    .map(|name| converted.sources.resolve(name))
                    .ok_or(CueError::NoTrackLength)?;

                let mut splitter = engine.split(&image).await?;
                let mut files = Vec::new();
                for number in sheet.track_numbers() {
                    let frames = sheet.track(number).frames();
                    if frames == 0 {
                        continue;
                    }
                    if self.cli.exclude.contains(&number) {
                        debug!("Discarding track {number}");
                        splitter.cut(&SplitTarget { path: None, frames }).await?;
                        continue;
                    }

                    let path = out_dir.join(namer.track_file(sheet, number));
                    splitter
                        .cut(&SplitTarget {
                            path: Some(path.clone()),
                            frames,
                        })
                        .await?;
                    if format != NATIVE_FORMAT {
                        write_tags(&path, TagSet::for_track(sheet, number, &release)).await?;
                    }
                    files.push(path);
                }
                splitter.finish().await?;
                files
            } else {
                let inputs = converted.sources.distinct(sheet);
                let output = out_dir.join(namer.album_file(sheet));
                let params = sheet.params.with_frames(sheet.duration);
                engine.merge(&inputs, &output, &params).await?;

                if format != NATIVE_FORMAT {
                    let tags = TagSet::for_album(sheet, &converted.cuesheet, &release);
                    write_tags(&output, tags).await?;
                }
                vec![output]
            };

            if self.cli.replay_gain {
                self.apply_replay_gain(format, &files).await;
            }
            produced.extend(files);
        }

        Ok(produced)
    }

    async fn apply_replay_gain(&self, format: &str, files: &[PathBuf]) {
        if format == NATIVE_FORMAT || files.is_empty() {
            return;
        }

        let Some(template) = self.config.replay_gain(format) else {
            warn!("No replay gain command configured for {format}, skipping");
            return;
        };

        info!("Applying replay gain to {} {format} files...", files.len());
        if let Err(err) = process::run(template, files).await {
            warn!("Replay gain failed: {err}");
        }
    }
}

/// Removes the files the sheet was read from, sparing anything just written.
async fn delete_sources(converted: &Converted, produced: &[PathBuf]) -> CueshiftResult<()> {
    let produced: HashSet<&PathBuf> = produced.iter().collect();
    for path in converted.sources.distinct(&converted.sheet) {
        if produced.contains(&path) {
            warn!("Not deleting {path:?}, it was just written");
            continue;
        }

        info!("<<< {}", path.display());
        fs::remove_file(&path)
            .await
            .map_err(|source| CueshiftError::OpenError {
                path: path.clone(),
                mode: "deleting",
                source,
            })?;
    }
    Ok(())
}
