use crate::audio::wav::WavParams;
use crate::cd::DEFAULT_SAMPLE_RATE;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

pub const UNKNOWN_ARTIST: &str = "unknown";
pub const UNKNOWN_ALBUM: &str = "untitled";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Performer,
    Title,
    Rem,
    File,
    Track,
    Pregap,
    Index(u32),
    Other,
}

/// One line of the sheet, kept in output order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CueLine {
    pub kind: LineKind,
    pub text: String,
}

impl CueLine {
    pub fn new(kind: LineKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    /// A generated `FILE "name" WAVE` line.
    pub fn file(name: &str) -> Self {
        Self::new(LineKind::File, format!("FILE \"{name}\" WAVE"))
    }
}

/// Layout of the source sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// One image file, tracks are only index positions.
    SingleFile,
    /// One file per track, pre-gaps at the start of the following track's file.
    Compliant,
    /// One file per track, pre-gaps at the end of the preceding track's file.
    NonCompliant,
    /// One file per track without any pre-gaps.
    Gapless,
}

impl Display for Layout {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Layout::SingleFile => "single-file",
            Layout::Compliant => "compliant",
            Layout::NonCompliant => "non-compliant",
            Layout::Gapless => "gapless",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Track {
    pub artist: Option<String>,
    pub title: Option<String>,
    /// Track level `REM` entries.
    pub comments: Vec<(String, String)>,
    /// INDEX 00 of the source sheet, in sample frames.
    pub idx0: Option<u64>,
    /// INDEX 01 of the source sheet, in sample frames.
    pub idx1: Option<u64>,
    /// End of this track's file within the concatenated stream.
    pub apos: Option<u64>,
    /// Length of the referenced file, or of the piece cut for this track.
    pub length: Option<u64>,
    pub gap: u64,
    pub name: Option<String>,
}

static EMPTY_TRACK: Track = Track {
    artist: None,
    title: None,
    comments: Vec::new(),
    idx0: None,
    idx1: None,
    apos: None,
    length: None,
    gap: 0,
    name: None,
};

impl Track {
    pub fn index0(&self) -> u64 {
        self.idx0.unwrap_or(0)
    }

    pub fn index1(&self) -> u64 {
        self.idx1.unwrap_or(0)
    }

    /// An INDEX 00 at frame zero marks no pre-gap at all.
    pub fn has_index0(&self) -> bool {
        self.index0() > 0
    }

    pub fn has_index1(&self) -> bool {
        self.index1() > 0
    }

    /// Track level comment, e.g. a per-track `REM GENRE`.
    pub fn comment(&self, key: &str) -> Option<&str> {
        self.comments
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    pub fn end(&self) -> u64 {
        self.apos.unwrap_or(0)
    }

    pub fn frames(&self) -> u64 {
        self.length.unwrap_or(0)
    }
}

#[derive(Debug, Clone)]
pub struct CueSheet {
    pub lines: Vec<CueLine>,
    /// Keyed by track number; track 0 holds audio before track 1.
    pub tracks: BTreeMap<u32, Track>,
    pub albumartist: String,
    pub album: String,
    pub comments: Vec<(String, String)>,
    pub pregap: u64,
    pub duration: u64,
    pub num_tracks: u32,
    /// Format of the last probed file; all timecodes are read with its rate.
    pub params: WavParams,
    pub is_va: bool,
    /// Track 1's pre-gap comes from a file of its own.
    pub trackzero_present: bool,
}

impl Default for CueSheet {
    fn default() -> Self {
        Self {
            lines: Vec::new(),
            tracks: BTreeMap::new(),
            albumartist: UNKNOWN_ARTIST.to_string(),
            album: UNKNOWN_ALBUM.to_string(),
            comments: Vec::new(),
            pregap: 0,
            duration: 0,
            num_tracks: 0,
            params: WavParams {
                channels: 2,
                sample_width: 2,
                sample_rate: DEFAULT_SAMPLE_RATE,
                frames: 0,
            },
            is_va: false,
            trackzero_present: false,
        }
    }
}

impl CueSheet {
    pub fn track(&self, number: u32) -> &Track {
        self.tracks.get(&number).unwrap_or(&EMPTY_TRACK)
    }

    pub fn track_mut(&mut self, number: u32) -> &mut Track {
        self.tracks.entry(number).or_default()
    }

    pub fn sample_rate(&self) -> u32 {
        self.params.sample_rate
    }

    /// Tracks 0..=N, including ones with no data.
    pub fn track_numbers(&self) -> std::ops::RangeInclusive<u32> {
        0..=self.num_tracks
    }

    /// Album level comment, e.g. `REM DATE`.
    pub fn comment(&self, key: &str) -> Option<&str> {
        self.comments
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// The sheet text with `terminator` after every line.
    pub fn render(&self, terminator: &str) -> String {
        let mut text = String::new();
        for line in &self.lines {
            text.push_str(&line.text);
            text.push_str(terminator);
        }
        text
    }
}
