use katha_core::model::{Achievements, Archetype, FavoriteToggle, Story, StoryId, User, UserId};
use serde::Serialize;
use tracing::info;

use super::ApiClient;
use crate::error::ApiError;

#[derive(Debug, Serialize)]
struct ArchetypeUpdate {
    archetype: Archetype,
}

impl ApiClient {
    /// Stories the user has started.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    pub async fn get_user_progress(&self, user: UserId) -> Result<Vec<Story>, ApiError> {
        self.get_json(&format!("/users/{user}/progress")).await
    }

    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    pub async fn get_user_favorites(&self, user: UserId) -> Result<Vec<Story>, ApiError> {
        self.get_json(&format!("/users/{user}/favorites")).await
    }

    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    pub async fn toggle_favorite(
        &self,
        user: UserId,
        story: StoryId,
    ) -> Result<FavoriteToggle, ApiError> {
        self.post_empty(&format!("/users/{user}/favorites/{story}"))
            .await
    }

    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    pub async fn get_user_completed(&self, user: UserId) -> Result<Vec<Story>, ApiError> {
        self.get_json(&format!("/users/{user}/completed")).await
    }

    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    pub async fn get_user_profile(&self, user: UserId) -> Result<User, ApiError> {
        self.get_json(&format!("/users/{user}")).await
    }

    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    pub async fn get_achievements(&self, user: UserId) -> Result<Achievements, ApiError> {
        self.get_json(&format!("/user/{user}/achievements")).await
    }

    /// Store the reader's archetype. When `user` is the signed-in reader the
    /// cached profile picks up the change too.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the profile cannot be cached.
    pub async fn save_archetype(
        &self,
        user: UserId,
        archetype: Archetype,
    ) -> Result<User, ApiError> {
        let mut updated: User = self
            .put_json(&format!("/users/{user}"), &ArchetypeUpdate { archetype })
            .await?;
        // older servers echo the profile without the new field
        if updated.archetype.is_none() {
            updated.archetype = Some(archetype);
        }

        let is_current = self
            .session
            .current_user()
            .is_some_and(|current| current.id == user);
        if is_current {
            self.session.update_user(&updated).await?;
        }
        info!(user_id = %user, %archetype, "saved archetype");
        Ok(updated)
    }
}
