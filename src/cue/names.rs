use crate::config::FilenameSchemes;
use crate::config::naming::{NameFields, UNKNOWN_TITLE};
use crate::cue::models::CueSheet;

/// Generates output file names for one target format.
#[derive(Debug, Clone, Copy)]
pub struct FileNamer<'a> {
    schemes: &'a FilenameSchemes,
    format: &'a str,
}

impl<'a> FileNamer<'a> {
    pub fn new(schemes: &'a FilenameSchemes, format: &'a str) -> Self {
        Self { schemes, format }
    }

    pub fn track_file(&self, sheet: &CueSheet, number: u32) -> String {
        let scheme = if sheet.is_va {
            &self.schemes.mult_files_va
        } else {
            &self.schemes.mult_files
        };
        format!("{}.{}", scheme.render(&fields(sheet, number)), self.format)
    }

    pub fn album_file(&self, sheet: &CueSheet) -> String {
        format!(
            "{}.{}",
            self.schemes.single_file.render(&fields(sheet, 1)),
            self.format
        )
    }
}

fn fields(sheet: &CueSheet, number: u32) -> NameFields<'_> {
    let track = sheet.track(number);
    NameFields {
        albumartist: &sheet.albumartist,
        album: &sheet.album,
        artist: track
            .artist
            .as_deref()
            .filter(|artist| !artist.is_empty())
            .unwrap_or(&sheet.albumartist),
        title: track
            .title
            .as_deref()
            .filter(|title| !title.is_empty())
            .unwrap_or(UNKNOWN_TITLE),
        tracknumber: number,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::cue::tests::{IMAGE_CUE, SECOND, parse};

    #[tokio::test]
    async fn names_follow_the_configured_schemes() {
        let config = Config::default();
        let mut sheet = parse(IMAGE_CUE, &[("image.flac", 180 * SECOND)]).await;
        let namer = FileNamer::new(&config.filenames, "flac");

        assert_eq!(namer.track_file(&sheet, 2), "02 - song.flac");
        assert_eq!(namer.album_file(&sheet), "the band - live _at_ home.flac");

        sheet.is_va = true;
        assert_eq!(namer.track_file(&sheet, 2), "02 - guest - song.flac");
        assert_eq!(namer.track_file(&sheet, 1), "01 - the band - intro.flac");
        assert_eq!(namer.track_file(&sheet, 0), "00 - the band - untitled.flac");
    }
}
