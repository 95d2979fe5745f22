use crate::cd::frames_to_timecode;
use crate::cue::models::{CueSheet, Layout};
use crate::cue::transform::TargetOptions;
use std::fmt::Write;

/// Human readable summary of the detected type and the resulting CD layout.
pub fn layout_report(sheet: &CueSheet, layout: Layout, options: TargetOptions) -> String {
    let rate = sheet.sample_rate();
    let mut report = format!("This cuesheet appears to be of '{layout}' type");
    if sheet.is_va {
        report.push_str(", 'various artists'");
    }
    report.push_str("...\n\nCD Layout:\n\n");

    // gaps lead the content when pre-gaps sit at the start of a track's file
    let gap_first = layout == Layout::Compliant || (layout == Layout::SingleFile && options.compliant);

    for number in sheet.track_numbers() {
        let gap = if gap_first {
            sheet.track(number).gap
        } else {
            sheet.track(number + 1).gap
        };

        if number == 1 && sheet.pregap > 0 {
            let _ = writeln!(report, "Pregap   ({})", frames_to_timecode(sheet.pregap, rate));
        }

        let length = sheet.track(number).frames();
        let mut content = String::new();
        if length > 0 {
            let _ = writeln!(report, "Track {number:02} ({})", frames_to_timecode(length, rate));
            content = format!(
                " content: {}\n",
                frames_to_timecode(length.saturating_sub(gap), rate)
            );
        }

        if gap > 0 {
            let gap = format!("     gap: {}\n", frames_to_timecode(gap, rate));
            if gap_first {
                report.push_str(&gap);
                report.push_str(&content);
            } else {
                report.push_str(&content);
                report.push_str(&gap);
            }
        }
    }

    let _ = write!(report, "\nLength   ({})", frames_to_timecode(sheet.duration, rate));
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::cue::lengths::calculate_lengths;
    use crate::cue::names::FileNamer;
    use crate::cue::tests::{IMAGE_CUE, SECOND, parse};
    use crate::cue::transform::transform;

    #[tokio::test]
    async fn reports_tracks_and_gaps() {
        let config = Config::default();
        let options = TargetOptions::new(false, false);
        let mut sheet = parse(IMAGE_CUE, &[("image.flac", 180 * SECOND)]).await;
        let layout = sheet.classify().unwrap();
        transform(&mut sheet, layout, options, &FileNamer::new(&config.filenames, "wav"));
        calculate_lengths(&mut sheet, options);

        let report = layout_report(&sheet, layout, options);
        assert!(report.starts_with("This cuesheet appears to be of 'single-file' type, 'various artists'"));
        assert!(report.contains("Track 01 (01:00:00)\n content: 00:58:00\n     gap: 00:02:00\n"));
        assert!(report.contains("Track 03 (01:00:00)\n"));
        assert!(report.ends_with("Length   (03:00:00)"));
    }
}
