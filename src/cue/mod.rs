use crate::audio::probe::AudioProbe;
use crate::audio::wav::WavParams;
use crate::cd::timecode_to_frames;
use crate::cue::error::{CueError, CueResult};
use crate::cue::models::{CueLine, CueSheet, LineKind};
use log::debug;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub mod charset;
pub mod classify;
pub mod error;
pub mod layout;
pub mod lengths;
pub mod models;
pub mod names;
pub mod transform;

pub struct CueParser<'a, P: AudioProbe> {
    probe: &'a P,
    base_dir: PathBuf,
    ref_file: Option<PathBuf>,
}

impl<'a, P: AudioProbe> CueParser<'a, P> {
    /// `FILE` paths are resolved against `base_dir`.
    pub fn new(probe: &'a P, base_dir: impl AsRef<Path>) -> Self {
        Self {
            probe,
            base_dir: base_dir.as_ref().to_path_buf(),
            ref_file: None,
        }
    }

    /// Probes every `FILE` line against `path`, for sheets embedded in an audio file.
    pub fn with_ref_file(mut self, path: impl AsRef<Path>) -> Self {
        self.ref_file = Some(path.as_ref().to_path_buf());
        self
    }

    pub async fn parse(&self, text: &str) -> CueResult<CueSheet> {
        let mut sheet = CueSheet::default();
        let mut probed: HashMap<PathBuf, WavParams> = HashMap::new();

        let mut trknum: u32 = 1;
        let mut in_tracks = false;
        let mut last_apos: Option<u64> = None;

        for raw in text.lines() {
            let trimmed = raw.trim_start();
            let directive = trimmed
                .split_whitespace()
                .next()
                .unwrap_or_default()
                .to_ascii_uppercase();
            let rest = trimmed[directive.len()..].trim();

            match directive.as_str() {
                "PERFORMER" | "TITLE" => {
                    let value = strip_quotes(rest).to_string();
                    let is_performer = directive == "PERFORMER";
                    if in_tracks {
                        let track = sheet.track_mut(trknum);
                        if is_performer {
                            track.artist = Some(value);
                        } else {
                            track.title = Some(value);
                        }
                    } else if is_performer {
                        sheet.albumartist = value;
                    } else {
                        sheet.album = value;
                    }

                    let kind = if is_performer {
                        LineKind::Performer
                    } else {
                        LineKind::Title
                    };
                    sheet.lines.push(CueLine::new(kind, normalize_quotes(raw)));
                }
                "REM" => {
                    if let Some((key, value)) = rest.split_once(char::is_whitespace) {
                        let comment = (key.to_string(), strip_quotes(value.trim()).to_string());
                        if in_tracks {
                            sheet.track_mut(trknum).comments.push(comment);
                        } else {
                            sheet.comments.push(comment);
                        }
                    }
                    sheet.lines.push(CueLine::new(LineKind::Rem, raw));
                }
                "FILE" => {
                    let name = file_name(rest)?;
                    let path = match &self.ref_file {
                        Some(path) => path.clone(),
                        None => self.base_dir.join(&name),
                    };

                    let params = match probed.get(&path).copied() {
                        Some(params) => params,
                        None => {
                            let params = self.probe.probe(&path).await?;
                            debug!("Probed {path:?}: {params:?}");
                            probed.insert(path, params);
                            params
                        }
                    };
                    sheet.params = params;

                    // Before the first TRACK the file is assumed to hold track 1;
                    // a second FILE inside track 1 turns it into a track 0 file.
                    let targets = if in_tracks { vec![trknum] } else { vec![0, 1] };
                    for number in targets {
                        let track = sheet.track_mut(number);
                        track.name = Some(name.clone());
                        track.length = Some(params.frames);
                    }

                    if trknum == 1 {
                        let zero = sheet.track(0).length;
                        if zero.is_some() && zero != sheet.track(1).length {
                            sheet.trackzero_present = true;
                            sheet.track_mut(0).apos = zero;
                        }
                    }

                    let apos = sheet.track(trknum - 1).end() + params.frames;
                    sheet.track_mut(trknum).apos = Some(apos);
                    last_apos = Some(apos);

                    sheet.lines.push(CueLine::new(LineKind::File, raw));
                }
                "TRACK" => {
                    in_tracks = true;
                    sheet.lines.push(CueLine::new(LineKind::Track, raw));
                }
                "PREGAP" => {
                    sheet.pregap = parse_timecode(rest, sheet.sample_rate())?;
                    sheet.lines.push(CueLine::new(LineKind::Pregap, raw));
                }
                "INDEX" => {
                    let mut fields = rest.split_whitespace();
                    let number: u32 = fields.next().unwrap_or_default().parse()?;
                    let position = parse_timecode(fields.next().unwrap_or_default(), sheet.sample_rate())?;

                    match number {
                        0 => sheet.track_mut(trknum).idx0 = Some(position),
                        1 => sheet.track_mut(trknum).idx1 = Some(position),
                        _ => {}
                    }
                    sheet.lines.push(CueLine::new(LineKind::Index(number), raw));

                    if number == 1 {
                        trknum += 1;
                    }
                }
                _ => sheet.lines.push(CueLine::new(LineKind::Other, raw)),
            }
        }

        sheet.duration = last_apos.ok_or(CueError::NoTrackLength)?;
        if !sheet.trackzero_present {
            let zero = sheet.track_mut(0);
            zero.length = None;
            zero.name = None;
        }
        sheet.num_tracks = trknum - 1;

        debug!(
            "Parsed {} tracks, {} frames at {} Hz",
            sheet.num_tracks,
            sheet.duration,
            sheet.sample_rate()
        );
        Ok(sheet)
    }
}

fn parse_timecode(timecode: &str, sample_rate: u32) -> CueResult<u64> {
    timecode_to_frames(timecode, sample_rate)
        .ok_or_else(|| CueError::InvalidMSFFormat(timecode.to_string()))
}

/// Removes one pair of surrounding double quotes.
pub fn strip_quotes(value: &str) -> &str {
    let value = value.strip_prefix('"').unwrap_or(value);
    value.strip_suffix('"').unwrap_or(value)
}

/// Turns double quotes inside the outermost pair into single quotes, so that
/// a value like `"The "Best" Of"` stays a single quoted field.
pub fn normalize_quotes(line: &str) -> String {
    match (line.find('"'), line.rfind('"')) {
        (Some(start), Some(end)) if start < end => format!(
            "{}\"{}\"{}",
            &line[..start],
            line[start + 1..end].replace('"', "'"),
            &line[end + 1..]
        ),
        _ => line.to_string(),
    }
}

/// The path of a `FILE` directive, quoted or as a bare word.
fn file_name(rest: &str) -> CueResult<String> {
    if let Some(start) = rest.find('"') {
        let end = rest
            .rfind('"')
            .filter(|end| *end > start)
            .ok_or_else(|| CueError::MissingQuoteError(format!("Missing closing quote: {rest}")))?;
        return Ok(rest[start + 1..end].to_string());
    }

    rest.split_whitespace()
        .next()
        .map(str::to_string)
        .ok_or_else(|| CueError::MissingQuoteError("FILE without a file name".to_string()))
}
