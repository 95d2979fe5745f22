use crate::cue::error::{CueError, CueResult};
use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use log::{debug, warn};

/// Decodes raw cuesheet bytes, using `charmap` when given and guessing otherwise.
/// A byte order mark always takes precedence.
pub fn decode_cuesheet(bytes: &[u8], charmap: Option<&str>) -> CueResult<String> {
    let encoding = match charmap {
        Some(label) => Encoding::for_label(label.trim().as_bytes())
            .ok_or_else(|| CueError::UnknownCharmap(label.to_string()))?,
        None => {
            let mut detector = EncodingDetector::new();
            detector.feed(bytes, true);
            detector.guess(None, true)
        }
    };

    let (text, used, had_errors) = encoding.decode(bytes);
    debug!("Decoding cuesheet as {}", used.name());
    if had_errors {
        warn!("Cuesheet is not valid {}, some characters were replaced", used.name());
    }
    Ok(text.into_owned())
}
