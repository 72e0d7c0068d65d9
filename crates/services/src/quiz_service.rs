use katha_core::model::{Archetype, ArchetypeQuiz, QuizQuestion, QuizStep, User};

use crate::api::ApiClient;
use crate::error::{ApiError, QuizServiceError};

/// Onboarding quiz bound to the signed-in reader.
pub struct QuizService {
    api: ApiClient,
    quiz: ArchetypeQuiz,
}

impl QuizService {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            quiz: ArchetypeQuiz::new(),
        }
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&'static QuizQuestion> {
        self.quiz.current_question()
    }

    #[must_use]
    pub fn result(&self) -> Option<Archetype> {
        self.quiz.result()
    }

    /// # Errors
    ///
    /// Returns `QuizServiceError::Quiz` for an unknown option or a finished quiz.
    pub fn answer_option(&mut self, option: usize) -> Result<QuizStep, QuizServiceError> {
        Ok(self.quiz.answer_option(option)?)
    }

    /// Start over, e.g. when the reader retakes the quiz from their profile.
    pub fn restart(&mut self) {
        self.quiz = ArchetypeQuiz::new();
    }

    /// Save the result on the reader's profile.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Unfinished` before the last answer,
    /// `ApiError::NotSignedIn` without a cached user, and `ApiError` when the
    /// save fails.
    pub async fn submit(&self) -> Result<User, QuizServiceError> {
        let archetype = self.quiz.result().ok_or(QuizServiceError::Unfinished)?;
        let user = self
            .api
            .session()
            .current_user()
            .ok_or(ApiError::NotSignedIn)?;
        Ok(self.api.save_archetype(user.id, archetype).await?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::ApiConfig;
    use crate::navigation::Navigator;
    use crate::session::SessionContext;
    use katha_core::model::QUESTIONS;
    use storage::InMemoryRepository;

    fn service() -> QuizService {
        let session = SessionContext::new(Arc::new(InMemoryRepository::new()));
        let api = ApiClient::new(ApiConfig::default(), session, Navigator::default()).unwrap();
        QuizService::new(api)
    }

    #[tokio::test]
    async fn submit_requires_a_finished_quiz() {
        let mut quiz = service();
        quiz.answer_option(1).unwrap();
        assert!(matches!(
            quiz.submit().await,
            Err(QuizServiceError::Unfinished)
        ));
    }

    #[tokio::test]
    async fn submit_requires_a_signed_in_reader() {
        let mut quiz = service();
        for _ in 0..QUESTIONS.len() {
            quiz.answer_option(1).unwrap();
        }
        assert_eq!(quiz.result(), Some(Archetype::Sage));
        assert!(matches!(
            quiz.submit().await,
            Err(QuizServiceError::Api(ApiError::NotSignedIn))
        ));
    }

    #[test]
    fn restart_clears_answers() {
        let mut quiz = service();
        for _ in 0..QUESTIONS.len() {
            quiz.answer_option(3).unwrap();
        }
        assert!(quiz.answer_option(0).is_err());

        quiz.restart();
        assert!(quiz.result().is_none());
        assert!(quiz.current_question().is_some());
    }
}
