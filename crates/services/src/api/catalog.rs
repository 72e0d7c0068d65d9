use katha_core::model::{Chapter, ChapterId, Location, Scene, Story, StoryId};

use super::ApiClient;
use crate::error::ApiError;

/// Category label meaning "no category filter".
pub const ALL_CATEGORIES: &str = "All";

/// Query parameters for `GET /stories/`; empty or catch-all values are dropped.
fn story_filters<'a>(
    category: Option<&'a str>,
    query: Option<&'a str>,
) -> Vec<(&'static str, &'a str)> {
    let mut params = Vec::with_capacity(2);
    if let Some(category) = category.filter(|c| !c.is_empty() && *c != ALL_CATEGORIES) {
        params.push(("category", category));
    }
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        params.push(("q", query));
    }
    params
}

impl ApiClient {
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    pub async fn get_stories(
        &self,
        category: Option<&str>,
        query: Option<&str>,
    ) -> Result<Vec<Story>, ApiError> {
        self.get_json_with("/stories/", &story_filters(category, query))
            .await
    }

    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    pub async fn get_story(&self, id: StoryId) -> Result<Story, ApiError> {
        self.get_json(&format!("/stories/{id}")).await
    }

    /// Story detail with its chapter list populated.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    pub async fn get_story_with_chapters(&self, id: StoryId) -> Result<Story, ApiError> {
        self.get_json_with(&format!("/stories/{id}"), &[("include_chapters", "true")])
            .await
    }

    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    pub async fn get_chapter(&self, id: ChapterId) -> Result<Chapter, ApiError> {
        self.get_json(&format!("/chapters/{id}")).await
    }

    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    pub async fn get_chapter_scenes(&self, id: ChapterId) -> Result<Vec<Scene>, ApiError> {
        self.get_json(&format!("/chapters/{id}/scenes")).await
    }

    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    pub async fn get_locations(&self) -> Result<Vec<Location>, ApiError> {
        self.get_json("/locations/").await
    }

    /// Ask a development backend to load its demo catalog.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    pub async fn seed_data(&self) -> Result<serde_json::Value, ApiError> {
        self.post_empty("/debug/seed-data").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_category_is_not_sent() {
        assert!(story_filters(Some("All"), None).is_empty());
        assert!(story_filters(Some(""), Some("")).is_empty());
        assert_eq!(
            story_filters(Some("Epic"), Some("rama")),
            vec![("category", "Epic"), ("q", "rama")]
        );
        assert_eq!(story_filters(None, Some("sita")), vec![("q", "sita")]);
    }
}
