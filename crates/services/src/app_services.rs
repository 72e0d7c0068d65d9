use std::sync::Arc;

use katha_core::model::{ChapterId, Route};
use storage::Storage;

use crate::Clock;
use crate::api::ApiClient;
use crate::config::{ApiConfig, ReaderConfig};
use crate::error::{AppServicesError, ReaderError};
use crate::navigation::Navigator;
use crate::notifier::SceneCompletionNotifier;
use crate::progress_store::ProgressStore;
use crate::quiz_service::QuizService;
use crate::reader::{ChapterReader, ReadingContext};
use crate::session::SessionContext;

/// Assembles app-facing services over one storage backend and restores any
/// persisted session.
#[derive(Clone)]
pub struct AppServices {
    api: ApiClient,
    progress: ProgressStore,
    reading: ReadingContext,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization, session restore,
    /// or HTTP client setup fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        api_config: ApiConfig,
        reader_config: ReaderConfig,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Self::from_storage(storage, clock, api_config, reader_config).await
    }

    /// # Errors
    ///
    /// Returns `AppServicesError` if session restore or HTTP client setup fails.
    pub async fn from_storage(
        storage: Storage,
        clock: Clock,
        api_config: ApiConfig,
        reader_config: ReaderConfig,
    ) -> Result<Self, AppServicesError> {
        let session = SessionContext::new(Arc::clone(&storage.kv));
        session.init_session().await?;

        let start = if session.is_authenticated() {
            Route::Home
        } else {
            Route::Login
        };
        let navigator = Navigator::new(start);
        let api = ApiClient::new(api_config, session.clone(), navigator)?;

        let progress = ProgressStore::new(clock, Arc::clone(&storage.kv))
            .with_capacity(reader_config.progress_capacity);
        let notifier = SceneCompletionNotifier::new(Arc::new(api.clone()));
        let reading = ReadingContext {
            session,
            progress: progress.clone(),
            notifier,
            config: reader_config,
        };

        Ok(Self {
            api,
            progress,
            reading,
        })
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    #[must_use]
    pub fn session(&self) -> &SessionContext {
        self.api.session()
    }

    #[must_use]
    pub fn navigator(&self) -> &Navigator {
        self.api.navigator()
    }

    #[must_use]
    pub fn progress(&self) -> &ProgressStore {
        &self.progress
    }

    #[must_use]
    pub fn quiz(&self) -> QuizService {
        QuizService::new(self.api.clone())
    }

    /// # Errors
    ///
    /// Returns `ReaderError` if the chapter cannot be loaded or has no scenes.
    pub async fn open_chapter(&self, chapter_id: ChapterId) -> Result<ChapterReader, ReaderError> {
        ChapterReader::open(&self.reading, &self.api, chapter_id).await
    }

    /// Wait for background work, such as scene completions, to finish. Call
    /// before the runtime shuts down.
    pub async fn shutdown(&self) {
        self.reading.notifier.drain().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use katha_core::time::fixed_clock;
    use storage::{KeyValueStore, keys};

    #[tokio::test]
    async fn restores_persisted_session() {
        let storage = Storage::in_memory();
        storage.kv.set(keys::AUTH_TOKEN, "tok").await.unwrap();
        storage
            .kv
            .set(keys::CURRENT_USER, r#"{"id":5,"name":"Sita"}"#)
            .await
            .unwrap();

        let app = AppServices::from_storage(
            storage,
            fixed_clock(),
            ApiConfig::default(),
            ReaderConfig::default(),
        )
        .await
        .unwrap();

        assert!(app.session().is_authenticated());
        assert_eq!(app.session().current_user().unwrap().name, "Sita");
        assert_eq!(app.navigator().current(), Route::Home);
    }

    #[tokio::test]
    async fn starts_on_login_without_session() {
        let app = AppServices::from_storage(
            Storage::in_memory(),
            fixed_clock(),
            ApiConfig::default(),
            ReaderConfig::default(),
        )
        .await
        .unwrap();

        assert!(!app.session().is_authenticated());
        assert_eq!(app.navigator().current(), Route::Login);
        assert!(app.progress().get_all().await.is_empty());
        // nothing spawned, so this returns straight away
        app.shutdown().await;
    }
}
