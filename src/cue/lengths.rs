use crate::cue::models::CueSheet;
use crate::cue::transform::TargetOptions;

/// Works out how long every track's piece of a single-file image is. The
/// pieces are contiguous and cover the whole image.
pub fn calculate_lengths(sheet: &mut CueSheet, options: TargetOptions) {
    let first = if sheet.trackzero_present { 0 } else { 1 };

    for number in first..=sheet.num_tracks {
        let track = sheet.track(number);
        let next = sheet.track(number + 1);

        let (start, end) = if options.compliant {
            // the first piece also carries any audio before track 1's INDEX 00
            let start = if number == first {
                0
            } else if !track.has_index0() {
                track.index1()
            } else {
                track.index0()
            };
            let end = if !next.has_index1() {
                sheet.duration
            } else if !next.has_index0() {
                next.index1()
            } else {
                next.index0()
            };
            (start, end)
        } else {
            let mut start = track.index1();
            let end = if next.has_index1() {
                next.index1()
            } else {
                sheet.duration
            };

            if number == 1 && track.has_index1() {
                if options.track_zero {
                    sheet.track_mut(0).length = Some(start);
                } else {
                    start = 0;
                }
            }
            (start, end)
        };

        sheet.track_mut(number).length = Some(end.saturating_sub(start));
    }
}
