//! Generation endpoints. Their responses are job descriptions whose shape
//! varies with the backend's provider, so they are returned as raw JSON.

use katha_core::model::{ChapterId, SceneId};
use serde::Serialize;
use serde_json::Value;

use super::ApiClient;
use crate::error::ApiError;

#[derive(Debug, Clone, Serialize)]
pub struct PromptRequest {
    pub scene_id: SceneId,
    pub prompt: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NarrationRequest {
    pub scene_id: SceneId,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emotion: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineRequest {
    pub scene_id: SceneId,
    pub prompt: String,
    pub narration: String,
}

/// A question for the Rishi guide, with the passage the reader is looking at.
#[derive(Debug, Clone, Serialize)]
pub struct RishiQuestion {
    pub question: String,
    pub context: String,
}

impl ApiClient {
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    pub async fn generate_image(&self, request: &PromptRequest) -> Result<Value, ApiError> {
        self.post_json("/ai/image/generate/", request).await
    }

    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    pub async fn generate_voice(&self, request: &NarrationRequest) -> Result<Value, ApiError> {
        self.post_json("/ai/voice/generate/", request).await
    }

    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    pub async fn generate_video(&self, request: &PromptRequest) -> Result<Value, ApiError> {
        self.post_json("/ai/video/generate/", request).await
    }

    /// Image, voice and video for one scene in a single backend job.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    pub async fn generate_all_assets(&self, request: &PipelineRequest) -> Result<Value, ApiError> {
        self.post_json("/ai/pipeline/generate-all/", request).await
    }

    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    pub async fn generate_chapter_reel(&self, chapter: ChapterId) -> Result<Value, ApiError> {
        self.post_empty(&format!("/ai/reel/chapter/{chapter}")).await
    }

    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    pub async fn ask_rishi(&self, question: &RishiQuestion) -> Result<Value, ApiError> {
        self.post_json("/ai/rishi/ask", question).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narration_without_emotion_omits_field() {
        let request = NarrationRequest {
            scene_id: SceneId::new(5),
            text: "Hanuman leaps.".into(),
            emotion: None,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({"scene_id": 5, "text": "Hanuman leaps."})
        );
    }
}
