use crate::built_info;
use clap::Parser;
use const_format::concatcp;
use std::path::PathBuf;

pub const DEFAULT_FORMAT: &str = "wav";

const LONG_VERSION: &str = concatcp!(
    built_info::PKG_VERSION,
    " (",
    built_info::TARGET,
    ", ",
    built_info::PROFILE,
    ", ",
    built_info::RUSTC_VERSION,
    ")"
);

/// Converts a cuesheet created with EAC to the other layout. A single-file
/// sheet (a CD image) becomes a multiple-files sheet and vice versa; with
/// --write the referenced audio is split or merged to match.
#[derive(Parser, Debug, Clone, Eq, PartialEq)]
#[command(author, version, long_version = LONG_VERSION, about, long_about = None)]
pub struct Cli {
    /// The cuesheet to process, or an audio file with an embedded CUESHEET tag
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    #[arg(long, short = 'v', help = "print detailed status messages")]
    pub verbose: bool,

    #[arg(
        value_name = "CHARMAP",
        long,
        short = 'm',
        help = "decode the cuesheet from the specified CHARMAP instead of guessing"
    )]
    pub charmap: Option<String>,

    #[arg(
        value_name = "FILE",
        long,
        short = 'o',
        help = "write the resulting cuesheet to FILE instead of stdout"
    )]
    pub output: Option<PathBuf>,

    #[arg(long, short = 'c', help = "output a 'compliant' cuesheet")]
    pub compliant: bool,

    #[arg(
        long = "zero-track",
        short = '0',
        help = "when splitting to a 'non-compliant' cuesheet, write the pre-gap of the first track to a file with track number 00"
    )]
    pub zero_track: bool,

    #[arg(long, short = 'w', help = "additionally write the split or merged audio files")]
    pub write: bool,

    #[arg(
        value_name = "FORMAT",
        long,
        short = 'e',
        value_delimiter = ',',
        default_value = DEFAULT_FORMAT,
        help = "encode audio files to the specified FORMAT(s), separated by commas"
    )]
    pub encode: Vec<String>,

    #[arg(long = "replay-gain", short = 'r', help = "apply replay gain to the encoded files")]
    pub replay_gain: bool,

    #[arg(long = "delete-files", short = 'd', help = "delete the source files after encoding")]
    pub delete_files: bool,

    #[arg(value_name = "YEAR", long, short = 'Y', help = "set the DATE tag")]
    pub year: Option<String>,

    #[arg(value_name = "DISCNUMBER", long, short = 'N', help = "set the DISCNUMBER tag")]
    pub discnumber: Option<String>,

    #[arg(
        value_name = "TRACK",
        long,
        short = 'x',
        value_delimiter = ',',
        help = "decode but discard these tracks when splitting"
    )]
    pub exclude: Vec<u32>,

    #[arg(value_name = "CONFIG", long, help = "read the configuration from CONFIG")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Formats to write, lowercased; the first one names the files in the new sheet.
    pub fn formats(&self) -> Vec<String> {
        let formats: Vec<String> = self
            .encode
            .iter()
            .map(|format| format.trim().trim_start_matches('.').to_lowercase())
            .filter(|format| !format.is_empty())
            .collect();

        if formats.is_empty() {
            vec![DEFAULT_FORMAT.to_string()]
        } else {
            formats
        }
    }
}
