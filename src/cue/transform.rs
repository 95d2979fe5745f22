use crate::cd::frames_to_timecode;
use crate::cue::models::{CueLine, CueSheet, Layout, LineKind};
use crate::cue::names::FileNamer;
use crate::cue::normalize_quotes;
use lazy_static::lazy_static;
use regex::{NoExpand, Regex};

/// What the rewritten sheet should look like.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TargetOptions {
    /// Put pre-gaps at the start of the following track's file.
    pub compliant: bool,
    /// Write the pre-gap of track 1 to a file of its own.
    pub track_zero: bool,
}

impl TargetOptions {
    pub fn new(compliant: bool, track_zero: bool) -> Self {
        Self {
            compliant,
            track_zero: track_zero && !compliant,
        }
    }
}

/// Rewrites the sheet's lines into the opposite layout: a single-file sheet
/// becomes one file per track and vice versa.
///
/// Every INDEX line is recomputed from the positions recorded while parsing.
/// The pre-gap worked out at INDEX 00 is kept on the track because the
/// following INDEX 01 and the layout report read it back.
pub fn transform(sheet: &mut CueSheet, layout: Layout, options: TargetOptions, namer: &FileNamer) {
    let rewrite = Rewrite {
        layout,
        non_compliant: !options.compliant,
        no_track_zero: !options.track_zero,
        namer,
    };

    let source = std::mem::take(&mut sheet.lines);
    let mut lines = Vec::with_capacity(source.len() + sheet.num_tracks as usize);
    let mut trknum: u32 = 1;
    let mut gap: u64 = 0;
    let mut file_written = false;

    for line in source {
        match line.kind {
            LineKind::Performer | LineKind::Title => {
                lines.push(CueLine::new(line.kind, normalize_quotes(&line.text)));
            }
            LineKind::File => {
                let name = if layout == Layout::SingleFile {
                    rewrite.file_for_track(sheet, trknum)
                } else if file_written {
                    continue;
                } else {
                    namer.album_file(sheet)
                };
                file_written = true;
                lines.push(CueLine::new(LineKind::File, replace_file_name(&line.text, &name)));
            }
            LineKind::Index(0) => {
                let (position, next_file) = rewrite.index00(sheet, trknum, &mut gap);
                sheet.track_mut(trknum).gap = gap;

                lines.push(match position {
                    Some(position) => replace_timecode(&line, position, sheet.sample_rate()),
                    None => line,
                });
                lines.extend(next_file);
            }
            LineKind::Index(1) => {
                let (position, next_file) = rewrite.index01(sheet, trknum, gap);
                lines.push(replace_timecode(&line, position, sheet.sample_rate()));
                lines.extend(next_file);

                trknum += 1;
                gap = 0;
            }
            _ => lines.push(line),
        }
    }

    sheet.lines = lines;
}

struct Rewrite<'a> {
    layout: Layout,
    non_compliant: bool,
    no_track_zero: bool,
    namer: &'a FileNamer<'a>,
}

impl Rewrite<'_> {
    fn file_for_track(&self, sheet: &CueSheet, trknum: u32) -> String {
        if sheet.track(trknum).has_index1() && self.non_compliant && !self.no_track_zero {
            self.namer.track_file(sheet, trknum - 1)
        } else {
            self.namer.track_file(sheet, trknum)
        }
    }

    fn file_line(&self, sheet: &CueSheet, number: u32) -> CueLine {
        CueLine::file(&self.namer.track_file(sheet, number))
    }

    /// New INDEX 00 position, if the line changes, and a FILE line to insert after it.
    fn index00(&self, sheet: &CueSheet, trknum: u32, gap: &mut u64) -> (Option<u64>, Option<CueLine>) {
        let track = sheet.track(trknum);
        let previous = sheet.track(trknum - 1);

        match self.layout {
            Layout::NonCompliant => {
                *gap = previous.frames().saturating_sub(track.index0());
                (Some(previous.end().saturating_sub(*gap)), None)
            }
            Layout::Compliant | Layout::Gapless => {
                *gap = track.index1();
                let position = if trknum == 1 {
                    track.index0()
                } else {
                    previous.end()
                };
                (Some(position), None)
            }
            Layout::SingleFile => {
                if track.has_index0() || (trknum == 1 && track.has_index1()) {
                    *gap = track.index1().saturating_sub(track.index0());
                }

                if !self.non_compliant {
                    (Some(0), None)
                } else if trknum > 1 || !self.no_track_zero {
                    let previous_file = track.index1().saturating_sub(previous.index1());
                    // Track 1 then starts at zero, so the source position is already right.
                    let position = if trknum == 2 && self.no_track_zero {
                        None
                    } else {
                        Some(previous_file.saturating_sub(*gap))
                    };
                    (position, Some(self.file_line(sheet, trknum)))
                } else {
                    (None, None)
                }
            }
        }
    }

    /// New INDEX 01 position and a FILE line to insert after it.
    fn index01(&self, sheet: &CueSheet, trknum: u32, gap: u64) -> (u64, Option<CueLine>) {
        let track = sheet.track(trknum);
        let previous = sheet.track(trknum - 1);

        match self.layout {
            Layout::SingleFile => {
                let position = if trknum == 1 {
                    if !self.non_compliant || (track.has_index1() && self.no_track_zero) {
                        track.index1()
                    } else {
                        0
                    }
                } else if !self.non_compliant && track.has_index0() {
                    gap
                } else {
                    0
                };

                let next = sheet.track(trknum + 1);
                let next_file = (next.has_index1() && (!self.non_compliant || !next.has_index0()))
                    .then(|| self.file_line(sheet, trknum + 1));
                (position, next_file)
            }
            Layout::NonCompliant if trknum > 1 => (previous.end(), None),
            _ => (previous.end() + track.index1(), None),
        }
    }
}

lazy_static! {
    static ref TIMECODE: Regex = Regex::new(r"\d+:\d+:\d+").unwrap();
    static ref QUOTED: Regex = Regex::new(r#"".*""#).unwrap();
}

fn replace_timecode(line: &CueLine, position: u64, sample_rate: u32) -> CueLine {
    let timecode = frames_to_timecode(position, sample_rate);
    CueLine::new(
        line.kind,
        TIMECODE.replace(&line.text, NoExpand(&timecode)),
    )
}

fn replace_file_name(line: &str, name: &str) -> String {
    let quoted = format!("\"{name}\"");
    if QUOTED.is_match(line) {
        return QUOTED.replace(line, NoExpand(&quoted)).into_owned();
    }

    // bare file name: FILE name.wav WAVE
    let indent = &line[..line.len() - line.trim_start().len()];
    let file_type = line.split_whitespace().nth(2).unwrap_or("WAVE");
    format!("{indent}FILE {quoted} {file_type}")
}
