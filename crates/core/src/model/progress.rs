use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{Chapter, ChapterId, StoryId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("progress must be between 0 and 100, got {0}")]
    OutOfRange(u32),

    #[error("chapter has no scenes")]
    NoScenes,

    #[error("scene index {index} is outside a chapter of {total} scenes")]
    SceneOutOfRange { index: usize, total: usize },
}

/// Whole-number reading percentage, always within `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct ProgressPercent(u8);

impl ProgressPercent {
    pub const COMPLETE: Self = Self(100);

    /// # Errors
    ///
    /// Returns `ProgressError::OutOfRange` for values above 100.
    pub fn new(value: u32) -> Result<Self, ProgressError> {
        u8::try_from(value)
            .ok()
            .filter(|v| *v <= 100)
            .map(Self)
            .ok_or(ProgressError::OutOfRange(value))
    }

    /// Percentage reached once the scene at `index` (zero-based) is active,
    /// `round(100 * (index + 1) / total)` with halves rounded up.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::NoScenes` when `total` is zero and
    /// `ProgressError::SceneOutOfRange` when `index >= total`.
    pub fn for_scene(index: usize, total: usize) -> Result<Self, ProgressError> {
        if total == 0 {
            return Err(ProgressError::NoScenes);
        }
        if index >= total {
            return Err(ProgressError::SceneOutOfRange { index, total });
        }
        let reached = index as u64 + 1;
        let total = total as u64;
        let rounded = (200 * reached + total) / (2 * total);
        // reached <= total keeps this at or below 100
        Ok(Self(rounded as u8))
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u32> for ProgressPercent {
    type Error = ProgressError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ProgressPercent> for u32 {
    fn from(value: ProgressPercent) -> Self {
        u32::from(value.0)
    }
}

impl std::fmt::Display for ProgressPercent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Furthest known reading position within one chapter on this device.
///
/// Titles and cover are copied from the backend when the entry is written and
/// are not refreshed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingProgressEntry {
    pub story_id: StoryId,
    pub story_title: String,
    pub chapter_id: ChapterId,
    pub chapter_title: String,
    pub chapter_index: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image_url: Option<String>,
    pub progress: ProgressPercent,
    pub last_read: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene_index: Option<usize>,
}

impl ReadingProgressEntry {
    /// Build the entry recorded when scene `scene_index` of `chapter` becomes active.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError` if the scene position is not inside the chapter.
    pub fn for_scene(
        chapter: &Chapter,
        scene_index: usize,
        total_scenes: usize,
        now: DateTime<Utc>,
    ) -> Result<Self, ProgressError> {
        let progress = ProgressPercent::for_scene(scene_index, total_scenes)?;
        Ok(Self {
            story_id: chapter.story_id,
            story_title: story_title_from_chapter_title(&chapter.title).to_owned(),
            chapter_id: chapter.id,
            chapter_title: chapter.title.clone(),
            chapter_index: chapter.index,
            cover_image_url: chapter.cover_image_url.clone(),
            progress,
            last_read: now,
            scene_index: Some(scene_index),
        })
    }
}

/// Chapter titles are formatted `"<story>: <chapter>"`; the story name is the
/// part before the first colon, or the whole title when there is none.
#[must_use]
pub fn story_title_from_chapter_title(title: &str) -> &str {
    title.split(':').next().unwrap_or(title)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn chapter() -> Chapter {
        Chapter {
            id: ChapterId::new(5),
            story_id: StoryId::new(2),
            index: 3,
            title: "Ramayana: The Exile".into(),
            next_chapter_id: None,
            short_summary: None,
            cover_image_url: Some("/static/covers/exile.png".into()),
            scenes: None,
        }
    }

    #[test]
    fn percent_rounds_like_the_reader_bar() {
        assert_eq!(ProgressPercent::for_scene(0, 3).unwrap().value(), 33);
        assert_eq!(ProgressPercent::for_scene(1, 3).unwrap().value(), 67);
        assert_eq!(ProgressPercent::for_scene(2, 3).unwrap().value(), 100);
        assert_eq!(ProgressPercent::for_scene(0, 8).unwrap().value(), 13);
        assert_eq!(ProgressPercent::for_scene(0, 1).unwrap(), ProgressPercent::COMPLETE);
    }

    #[test]
    fn percent_rejects_bad_positions() {
        assert_eq!(ProgressPercent::for_scene(0, 0), Err(ProgressError::NoScenes));
        assert_eq!(
            ProgressPercent::for_scene(4, 4),
            Err(ProgressError::SceneOutOfRange { index: 4, total: 4 })
        );
        assert_eq!(ProgressPercent::new(101), Err(ProgressError::OutOfRange(101)));
    }

    #[test]
    fn entry_denormalizes_chapter_metadata() {
        let entry = ReadingProgressEntry::for_scene(&chapter(), 1, 4, fixed_now()).unwrap();
        assert_eq!(entry.story_title, "Ramayana");
        assert_eq!(entry.chapter_title, "Ramayana: The Exile");
        assert_eq!(entry.chapter_index, 3);
        assert_eq!(entry.progress.value(), 50);
        assert_eq!(entry.scene_index, Some(1));
    }

    #[test]
    fn entry_uses_camel_case_layout() {
        let entry = ReadingProgressEntry::for_scene(&chapter(), 0, 2, fixed_now()).unwrap();
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["chapterId"], 5);
        assert_eq!(json["storyTitle"], "Ramayana");
        assert_eq!(json["progress"], 50);
        assert_eq!(json["lastRead"], "2023-11-14T22:13:20Z");
    }

    #[test]
    fn entry_rejects_out_of_range_progress() {
        let raw = r#"{"storyId":1,"storyTitle":"S","chapterId":2,"chapterTitle":"C",
            "chapterIndex":0,"progress":140,"lastRead":"2024-01-01T00:00:00.000Z"}"#;
        assert!(serde_json::from_str::<ReadingProgressEntry>(raw).is_err());
    }

    #[test]
    fn story_title_without_colon_is_whole_title() {
        assert_eq!(story_title_from_chapter_title("Mahabharata"), "Mahabharata");
    }
}
