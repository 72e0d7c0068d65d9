use std::time::Instant;

use katha_core::model::{Chapter, ChapterId, ReadingProgressEntry, Scene};
use katha_core::scroll::{SceneRegion, Viewport};
use tracing::{debug, info};

use crate::api::ApiClient;
use crate::config::ReaderConfig;
use crate::error::ReaderError;
use crate::notifier::SceneCompletionNotifier;
use crate::progress_store::ProgressStore;
use crate::session::SessionContext;
use crate::tracker::{SceneTransition, ScrollPositionTracker};

/// Everything a reader needs besides the chapter itself.
#[derive(Clone)]
pub struct ReadingContext {
    pub session: SessionContext,
    pub progress: ProgressStore,
    pub notifier: SceneCompletionNotifier,
    pub config: ReaderConfig,
}

/// One open chapter. Scroll observations go in; scene completions and
/// progress entries come out as side effects.
pub struct ChapterReader {
    ctx: ReadingContext,
    chapter: Chapter,
    scenes: Vec<Scene>,
    tracker: ScrollPositionTracker,
}

impl ChapterReader {
    /// Fetch chapter detail and scenes concurrently and open the chapter.
    ///
    /// # Errors
    ///
    /// Returns `ReaderError::Api` if either request fails and
    /// `ReaderError::EmptyChapter` if the chapter has no scenes.
    pub async fn open(
        ctx: &ReadingContext,
        api: &ApiClient,
        chapter_id: ChapterId,
    ) -> Result<Self, ReaderError> {
        let (chapter, scenes) = tokio::join!(
            api.get_chapter(chapter_id),
            api.get_chapter_scenes(chapter_id)
        );
        Self::new(ctx.clone(), chapter?, scenes?)
    }

    /// # Errors
    ///
    /// Returns `ReaderError::EmptyChapter` if `scenes` is empty.
    pub fn new(
        ctx: ReadingContext,
        chapter: Chapter,
        mut scenes: Vec<Scene>,
    ) -> Result<Self, ReaderError> {
        if scenes.is_empty() {
            return Err(ReaderError::EmptyChapter);
        }
        scenes.sort_by_key(Scene::order);
        let tracker = ScrollPositionTracker::new(scenes.len(), ctx.config.sample_interval);
        info!(chapter_id = %chapter.id, scenes = scenes.len(), "opened chapter");
        Ok(Self {
            ctx,
            chapter,
            scenes,
            tracker,
        })
    }

    #[must_use]
    pub fn chapter(&self) -> &Chapter {
        &self.chapter
    }

    /// Scenes in reading order.
    #[must_use]
    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }

    #[must_use]
    pub fn active_scene(&self) -> Option<&Scene> {
        self.tracker.active().and_then(|index| self.scenes.get(index))
    }

    /// Scene index saved the last time this chapter was read on this device.
    pub async fn resume_index(&self) -> Option<usize> {
        self.ctx
            .progress
            .get_for_chapter(self.chapter.id)
            .await
            .and_then(|entry| entry.scene_index)
            .filter(|index| *index < self.scenes.len())
    }

    /// Feed a layout observation. A change of active scene is recorded and
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns `ReaderError::Progress` if the active region lies past the
    /// chapter's last scene. Nothing is recorded in that case.
    pub async fn on_scroll(
        &mut self,
        viewport: Viewport,
        regions: &[SceneRegion],
        at: Instant,
    ) -> Result<Option<SceneTransition>, ReaderError> {
        match self.tracker.observe(viewport, regions, at)? {
            Some(transition) => self.record(transition).await.map(Some),
            None => Ok(None),
        }
    }

    /// Evaluate a deferred observation, typically once scrolling stops or the
    /// chapter is closed.
    ///
    /// # Errors
    ///
    /// Same as [`ChapterReader::on_scroll`].
    pub async fn flush(&mut self) -> Result<Option<SceneTransition>, ReaderError> {
        match self.tracker.flush()? {
            Some(transition) => self.record(transition).await.map(Some),
            None => Ok(None),
        }
    }

    async fn record(&self, transition: SceneTransition) -> Result<SceneTransition, ReaderError> {
        let entry = ReadingProgressEntry::for_scene(
            &self.chapter,
            transition.index,
            self.scenes.len(),
            self.ctx.progress.clock().now(),
        )?;
        let scene = &self.scenes[transition.index];

        match self.ctx.session.current_user() {
            // runs in the background; `SceneCompletionNotifier::drain` awaits it
            Some(user) => self.ctx.notifier.notify(scene.id, user.id),
            None => debug!(scene_id = %scene.id, "not signed in; skipping scene completion"),
        }

        debug!(
            chapter_id = %self.chapter.id,
            scene = transition.index,
            progress = %entry.progress,
            "active scene changed"
        );
        self.ctx.progress.save(entry).await;
        Ok(transition)
    }
}
