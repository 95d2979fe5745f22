use crate::cue::error::{CueError, CueResult};
use crate::cue::models::{CueSheet, Layout};
use log::debug;

impl CueSheet {
    /// Decides the layout of the sheet and sets the various-artists flag.
    pub fn classify(&mut self) -> CueResult<Layout> {
        let layout = if self.track(2).name.is_none() {
            Layout::SingleFile
        } else {
            let mut compliant = false;
            let mut non_compliant = false;
            for number in 2..=self.num_tracks {
                let track = self.track(number);
                if track.has_index0() {
                    non_compliant = true;
                } else if track.has_index1() {
                    compliant = true;
                }
            }

            match (compliant, non_compliant) {
                (true, true) => return Err(CueError::UnrecognizedLayout),
                (true, false) => Layout::Compliant,
                (false, true) => Layout::NonCompliant,
                (false, false) => Layout::Gapless,
            }
        };

        let is_va = self.tracks.values().any(|track| {
            track
                .artist
                .as_ref()
                .is_some_and(|artist| *artist != self.albumartist)
        });
        self.is_va = is_va;

        debug!("Detected {layout} layout, various artists: {is_va}");
        Ok(layout)
    }
}

#[cfg(test)]
mod tests {
    use crate::cue::error::CueError;
    use crate::cue::models::Layout;
    use crate::cue::tests::{IMAGE_CUE, SECOND, parse};

    const FILES: &[(&str, u64)] = &[
        ("01.wav", 60 * SECOND),
        ("02.wav", 60 * SECOND),
        ("03.wav", 60 * SECOND),
    ];

    #[tokio::test]
    async fn image_is_single_file() {
        let mut sheet = parse(IMAGE_CUE, &[("image.flac", 180 * SECOND)]).await;
        assert_eq!(sheet.classify().unwrap(), Layout::SingleFile);
        assert!(sheet.is_va);
    }

    #[tokio::test]
    async fn pregap_at_end_of_previous_file_is_non_compliant() {
        let text = r#"PERFORMER "A"
FILE "01.wav" WAVE
  TRACK 01 AUDIO
    INDEX 01 00:00:00
  TRACK 02 AUDIO
    INDEX 00 00:58:00
FILE "02.wav" WAVE
    INDEX 01 00:00:00
  TRACK 03 AUDIO
    PERFORMER "A"
FILE "03.wav" WAVE
    INDEX 01 00:00:00
"#;
        let mut sheet = parse(text, FILES).await;
        assert_eq!(sheet.classify().unwrap(), Layout::NonCompliant);
        assert!(!sheet.is_va);
    }

    #[tokio::test]
    async fn pregap_at_start_of_own_file_is_compliant() {
        let text = r#"FILE "01.wav" WAVE
  TRACK 01 AUDIO
    INDEX 01 00:00:00
FILE "02.wav" WAVE
  TRACK 02 AUDIO
    INDEX 00 00:00:00
    INDEX 01 00:02:00
FILE "03.wav" WAVE
  TRACK 03 AUDIO
    INDEX 01 00:00:00
"#;
        let mut sheet = parse(text, FILES).await;
        assert_eq!(sheet.classify().unwrap(), Layout::Compliant);
    }

    #[tokio::test]
    async fn no_pregaps_is_gapless() {
        let text = r#"FILE "01.wav" WAVE
  TRACK 01 AUDIO
    INDEX 01 00:00:00
FILE "02.wav" WAVE
  TRACK 02 AUDIO
    INDEX 01 00:00:00
"#;
        let mut sheet = parse(text, FILES).await;
        assert_eq!(sheet.classify().unwrap(), Layout::Gapless);
    }

    #[tokio::test]
    async fn mixed_pregap_styles_are_rejected() {
        let text = r#"FILE "01.wav" WAVE
  TRACK 01 AUDIO
    INDEX 01 00:00:00
  TRACK 02 AUDIO
    INDEX 00 00:58:00
FILE "02.wav" WAVE
    INDEX 01 00:00:00
FILE "03.wav" WAVE
  TRACK 03 AUDIO
    INDEX 00 00:00:00
    INDEX 01 00:02:00
"#;
        let mut sheet = parse(text, FILES).await;
        assert!(matches!(sheet.classify(), Err(CueError::UnrecognizedLayout)));
    }
}
