//! Read-only catalog records as served by the backend.

use serde::{Deserialize, Serialize};

use crate::model::{ChapterId, LocationId, SceneId, StoryId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    pub id: StoryId,
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub cover_image_url: Option<String>,
    #[serde(default)]
    pub total_chapters: Option<u32>,
    #[serde(default)]
    pub total_scenes: Option<u32>,
    #[serde(default)]
    pub chapters: Option<Vec<Chapter>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: ChapterId,
    pub story_id: StoryId,
    pub index: u32,
    pub title: String,
    #[serde(default)]
    pub next_chapter_id: Option<ChapterId>,
    #[serde(default)]
    pub short_summary: Option<String>,
    #[serde(default)]
    pub cover_image_url: Option<String>,
    #[serde(default)]
    pub scenes: Option<Vec<Scene>>,
}

/// Smallest narrative unit of a chapter.
///
/// The backend reports completion as `completed`; older payloads use
/// `is_completed`. Both land in [`Scene::is_completed`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub id: SceneId,
    pub chapter_id: ChapterId,
    pub index: u32,
    pub raw_text: String,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub symbolism: Option<String>,
    #[serde(default)]
    pub emotion: Option<String>,
    #[serde(default)]
    pub music_tag: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub ai_image_url: Option<String>,
    #[serde(default)]
    pub ai_video_url: Option<String>,
    #[serde(default)]
    pub ai_audio_url: Option<String>,
    #[serde(default)]
    pub audio_url: Option<String>,
    #[serde(default, alias = "completed")]
    pub is_completed: bool,
    #[serde(default)]
    pub next_scene_id: Option<SceneId>,
}

impl Scene {
    #[must_use]
    pub fn original_text(&self) -> &str {
        &self.raw_text
    }

    #[must_use]
    pub fn order(&self) -> u32 {
        self.index
    }

    /// Best narration track available: generated audio first, then the uploaded one.
    #[must_use]
    pub fn narration_url(&self) -> Option<&str> {
        self.ai_audio_url
            .as_deref()
            .or(self.audio_url.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub epoch: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub era: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_reads_backend_completed_flag() {
        let raw = r#"{"id":9,"chapter_id":2,"index":4,"raw_text":"Sita waits.","completed":true}"#;
        let scene: Scene = serde_json::from_str(raw).unwrap();
        assert!(scene.is_completed);
        assert_eq!(scene.order(), 4);
        assert_eq!(scene.original_text(), "Sita waits.");
    }

    #[test]
    fn scene_defaults_to_not_completed() {
        let raw = r#"{"id":9,"chapter_id":2,"index":0,"raw_text":""}"#;
        let scene: Scene = serde_json::from_str(raw).unwrap();
        assert!(!scene.is_completed);
        assert_eq!(scene.narration_url(), None);
    }
}
