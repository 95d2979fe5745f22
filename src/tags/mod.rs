use crate::config::naming::UNKNOWN_TITLE;
use crate::cue::models::{CueSheet, Track};
use crate::tags::error::{TagError, TagResult};
use lofty::config::WriteOptions;
use lofty::file::TaggedFileExt;
use lofty::prelude::*;
use lofty::probe::Probe;
use lofty::tag::{ItemKey, ItemValue, Tag};
use log::debug;
use std::path::{Path, PathBuf};
use tokio::task;

pub mod error;

const CUESHEET_KEY: &str = "CUESHEET";

/// Values given on the command line that end up in every tag.
#[derive(Debug, Clone, Default)]
pub struct ReleaseInfo {
    pub year: Option<String>,
    pub discnumber: Option<String>,
}

/// Tag items for one produced file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    items: Vec<(ItemKey, String)>,
}

impl TagSet {
    fn push(&mut self, key: ItemKey, value: impl Into<String>) {
        self.items.push((key, value.into()));
    }

    /// Items shared by every file. `REM` entries of `track` win over the album's.
    fn common(sheet: &CueSheet, track: Option<&Track>, release: &ReleaseInfo) -> Self {
        let comment = |key: &str| {
            track
                .and_then(|track| track.comment(key))
                .or_else(|| sheet.comment(key))
        };

        let mut tags = Self::default();
        if sheet.is_va {
            tags.push(ItemKey::AlbumArtist, &sheet.albumartist);
        }
        tags.push(ItemKey::AlbumTitle, &sheet.album);

        if let Some(date) = release.year.as_deref().or_else(|| comment("DATE")) {
            tags.push(ItemKey::RecordingDate, date);
        }
        if let Some(genre) = comment("GENRE") {
            tags.push(ItemKey::Genre, genre);
        }
        if let Some(discnumber) = &release.discnumber {
            tags.push(ItemKey::DiscNumber, discnumber);
        }
        tags
    }

    /// Tags of one file cut from an image.
    pub fn for_track(sheet: &CueSheet, number: u32, release: &ReleaseInfo) -> Self {
        let track = sheet.track(number);
        let mut tags = Self::common(sheet, Some(track), release);
        tags.push(
            ItemKey::TrackArtist,
            track.artist.as_deref().unwrap_or(&sheet.albumartist),
        );
        tags.push(
            ItemKey::TrackTitle,
            track.title.as_deref().unwrap_or(UNKNOWN_TITLE),
        );
        tags.push(ItemKey::TrackNumber, number.to_string());
        tags
    }

    /// Tags of a merged image, which carries its own cuesheet.
    pub fn for_album(sheet: &CueSheet, cuesheet: &str, release: &ReleaseInfo) -> Self {
        let mut tags = Self::common(sheet, None, release);
        tags.push(ItemKey::TrackArtist, &sheet.albumartist);
        tags.push(ItemKey::Unknown(CUESHEET_KEY.to_string()), cuesheet);
        tags
    }
}

#[cfg(test)]
impl TagSet {
    pub fn get(&self, key: &ItemKey) -> Option<&str> {
        self.items
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Writes `tags` into the primary tag of `path`, creating the tag if needed.
/// Containers the tag library does not know are left untouched.
pub async fn write_tags(path: &Path, tags: TagSet) -> TagResult<()> {
    let path = path.to_path_buf();
    task::spawn_blocking(move || -> TagResult<()> {
        let probe = Probe::open(&path)?.guess_file_type()?;
        if probe.file_type().is_none() {
            debug!("Not tagging {path:?}: unknown container");
            return Ok(());
        }

        let mut tagged_file = probe.read()?;
        if tagged_file.primary_tag().is_none() {
            let tag_type = tagged_file.primary_tag_type();
            tagged_file.insert_tag(Tag::new(tag_type));
        }

        let tag = tagged_file
            .primary_tag_mut()
            .ok_or_else(|| TagError::NoTag(path.clone()))?;
        for (key, value) in tags.items {
            tag.insert_text(key, value);
        }

        tagged_file.save_to_path(&path, WriteOptions::default())?;
        debug!("Tagged {path:?}");
        Ok(())
    })
    .await?
}

/// Reads the `CUESHEET` item of an audio file's tags.
pub async fn read_embedded_cuesheet(path: &Path) -> TagResult<String> {
    let path: PathBuf = path.to_path_buf();
    task::spawn_blocking(move || -> TagResult<String> {
        let tagged_file = Probe::open(&path)?.read()?;
        tagged_file
            .tags()
            .iter()
            .flat_map(|tag| tag.items())
            .find_map(|item| match (item.key(), item.value()) {
                (ItemKey::Unknown(key), ItemValue::Text(text))
                    if key.eq_ignore_ascii_case(CUESHEET_KEY) =>
                {
                    Some(text.clone())
                }
                _ => None,
            })
            .ok_or(TagError::NoEmbeddedCuesheet(path))
    })
    .await?
}
