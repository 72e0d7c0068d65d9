pub mod archetype;
mod catalog;
mod ids;
mod progress;
mod route;
mod user;

pub use archetype::{
    Archetype, ArchetypeQuiz, QUESTIONS, QuizError, QuizOption, QuizQuestion, QuizStep,
};
pub use catalog::{Chapter, Location, Scene, Story};
pub use ids::{ChapterId, LocationId, ParseIdError, SceneId, StoryId, UserId};
pub use progress::{
    ProgressError, ProgressPercent, ReadingProgressEntry, story_title_from_chapter_title,
};
pub use route::Route;
pub use user::{
    Achievements, AuthResponse, Badge, FavoriteToggle, ProfileUpdate, SceneCompleteResponse, User,
};
