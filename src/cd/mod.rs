// All positions inside the crate are sample frames of the referenced audio. Cue
// timecodes (MM:SS:FF) count CD frames, 75 per second regardless of sample rate,
// so this is the only place the sample rate enters the arithmetic.

pub const CD_FRAMES_PER_SECOND: u64 = 75;
pub const SECONDS_PER_MINUTE: u64 = 60;
/// Red Book sample rate, assumed until a referenced file has been probed.
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Number of sample frames making up one CD frame at `sample_rate`.
pub fn samples_per_cd_frame(sample_rate: u32) -> u64 {
    (sample_rate as u64 / CD_FRAMES_PER_SECOND).max(1)
}

/// Renders a sample frame position as `MM:SS:FF`, truncating to CD frame granularity.
pub fn frames_to_timecode(frames: u64, sample_rate: u32) -> String {
    let rate = (sample_rate as u64).max(1);
    let (total_seconds, remainder) = (frames / rate, frames % rate);
    let (minutes, seconds) = (
        total_seconds / SECONDS_PER_MINUTE,
        total_seconds % SECONDS_PER_MINUTE,
    );
    let cd_frames = remainder / samples_per_cd_frame(sample_rate);

    format!("{minutes:02}:{seconds:02}:{cd_frames:02}")
}

/// Parses `MM:SS:FF` into a sample frame position.
///
/// Only the last two digits of every field are significant, which keeps
/// three-digit minute fields written by some rippers from overflowing the
/// position. Returns `None` for anything that is not three numeric fields.
pub fn timecode_to_frames(timecode: &str, sample_rate: u32) -> Option<u64> {
    let fields: Vec<&str> = timecode.trim().split(':').collect();
    if fields.len() != 3 {
        return None;
    }

    let mut parsed = [0u64; 3];
    for (slot, field) in parsed.iter_mut().zip(&fields) {
        if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let tail = &field[field.len().saturating_sub(2)..];
        *slot = tail.parse().ok()?;
    }
    let [minutes, seconds, cd_frames] = parsed;

    Some(
        (minutes * SECONDS_PER_MINUTE + seconds) * sample_rate as u64
            + cd_frames * samples_per_cd_frame(sample_rate),
    )
}
