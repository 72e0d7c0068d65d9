use katha_core::model::{Scene, SceneCompleteResponse, SceneId, UserId};

use super::ApiClient;
use crate::error::ApiError;

impl ApiClient {
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    pub async fn get_scene(&self, id: SceneId) -> Result<Scene, ApiError> {
        self.get_json(&format!("/scenes/{id}/")).await
    }

    /// Run media generation for a scene. The returned scene is never marked
    /// completed, whatever the backend reports.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    pub async fn generate_scene_content(&self, id: SceneId) -> Result<Scene, ApiError> {
        let mut scene: Scene = self.post_empty(&format!("/scenes/{id}/generate")).await?;
        scene.is_completed = false;
        Ok(scene)
    }

    /// Scenes that have a generated video.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    pub async fn get_reels(&self) -> Result<Vec<Scene>, ApiError> {
        self.get_json_with("/scenes/", &[("has_video", "true")])
            .await
    }

    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    pub async fn complete_scene(
        &self,
        scene: SceneId,
        user: UserId,
    ) -> Result<SceneCompleteResponse, ApiError> {
        self.post_empty_with(
            &format!("/scenes/{scene}/complete"),
            &[("user_id", user.value())],
        )
        .await
    }
}
