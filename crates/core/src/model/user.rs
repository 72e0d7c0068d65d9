use serde::{Deserialize, Serialize};

use crate::model::archetype::lenient_archetype;
use crate::model::{Archetype, UserId};

/// Profile of the signed-in reader, also cached locally for offline display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub total_xp: u64,
    #[serde(default)]
    pub current_streak_days: u32,
    #[serde(default)]
    pub longest_streak_days: u32,
    #[serde(default)]
    pub stories_read: u32,
    #[serde(
        default,
        deserialize_with = "lenient_archetype",
        skip_serializing_if = "Option::is_none"
    )]
    pub archetype: Option<Archetype>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Fields accepted by `PUT /users/me`; unset fields are left untouched server-side.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archetype: Option<Archetype>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badge {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon_url: Option<String>,
    #[serde(default)]
    pub earned_at: Option<String>,
}

/// Result of marking a scene complete. Older servers name the fields
/// `xp_added` / `current_streak_days`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneCompleteResponse {
    #[serde(default, alias = "xp_added")]
    pub xp_earned: u64,
    #[serde(default)]
    pub total_xp: u64,
    #[serde(default, alias = "current_streak_days")]
    pub current_streak: u32,
    #[serde(default)]
    pub new_badges: Vec<Badge>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievements {
    pub total_xp: u64,
    pub current_streak_days: u32,
    pub longest_streak_days: u32,
    #[serde(default)]
    pub earned_badges: Vec<Badge>,
    #[serde(default)]
    pub locked_badges: Vec<Badge>,
}

/// Outcome of toggling a favorite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteToggle {
    pub status: String,
    pub message: String,
}

impl FavoriteToggle {
    #[must_use]
    pub fn is_favorited(&self) -> bool {
        self.status == "favorited"
    }
}
