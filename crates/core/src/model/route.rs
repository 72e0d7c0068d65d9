use std::fmt;

use crate::model::{ChapterId, SceneId, StoryId};

/// Views the client can be showing. Only the distinction between entry points
/// and everything else matters outside the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Route {
    #[default]
    Home,
    Login,
    Register,
    Onboarding,
    ArchetypeQuiz,
    Explore,
    Library,
    Map,
    Reels,
    Achievements,
    Profile,
    Story(StoryId),
    Chapter(ChapterId),
    Scene(SceneId),
}

impl Route {
    /// Views reachable without a session; the 401 policy never redirects away from these.
    #[must_use]
    pub fn is_unauthenticated_entry(self) -> bool {
        matches!(self, Route::Login | Route::Register | Route::Onboarding)
    }

    #[must_use]
    pub fn path(self) -> String {
        match self {
            Route::Home => "/".to_owned(),
            Route::Login => "/login".to_owned(),
            Route::Register => "/register".to_owned(),
            Route::Onboarding => "/onboarding".to_owned(),
            Route::ArchetypeQuiz => "/quiz".to_owned(),
            Route::Explore => "/explore".to_owned(),
            Route::Library => "/library".to_owned(),
            Route::Map => "/map".to_owned(),
            Route::Reels => "/reels".to_owned(),
            Route::Achievements => "/achievements".to_owned(),
            Route::Profile => "/profile".to_owned(),
            Route::Story(id) => format!("/story/{id}"),
            Route::Chapter(id) => format!("/chapter/{id}"),
            Route::Scene(id) => format!("/scene/{id}"),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_auth_screens_are_entry_points() {
        assert!(Route::Login.is_unauthenticated_entry());
        assert!(Route::Register.is_unauthenticated_entry());
        assert!(Route::Onboarding.is_unauthenticated_entry());
        assert!(!Route::Home.is_unauthenticated_entry());
        assert!(!Route::Chapter(ChapterId::new(3)).is_unauthenticated_entry());
    }

    #[test]
    fn paths_embed_ids() {
        assert_eq!(Route::Chapter(ChapterId::new(12)).path(), "/chapter/12");
    }
}
