use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use katha_core::model::{SceneCompleteResponse, SceneId, UserId};
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::api::ApiClient;
use crate::error::ApiError;

/// Backend call that records a finished scene.
#[async_trait]
pub trait SceneCompletionSink: Send + Sync {
    async fn complete_scene(
        &self,
        scene: SceneId,
        user: UserId,
    ) -> Result<SceneCompleteResponse, ApiError>;
}

#[async_trait]
impl SceneCompletionSink for ApiClient {
    async fn complete_scene(
        &self,
        scene: SceneId,
        user: UserId,
    ) -> Result<SceneCompleteResponse, ApiError> {
        ApiClient::complete_scene(self, scene, user).await
    }
}

/// Fire-and-forget scene completion. Delivery is attempted once; a lost
/// completion only costs the reader some XP, so failures are logged and
/// dropped.
///
/// Spawned calls are tracked. Await [`SceneCompletionNotifier::drain`] before
/// the runtime shuts down or pending calls are cancelled.
#[derive(Clone)]
pub struct SceneCompletionNotifier {
    sink: Arc<dyn SceneCompletionSink>,
    tasks: Arc<Mutex<JoinSet<()>>>,
}

impl SceneCompletionNotifier {
    #[must_use]
    pub fn new(sink: Arc<dyn SceneCompletionSink>) -> Self {
        Self {
            sink,
            tasks: Arc::new(Mutex::new(JoinSet::new())),
        }
    }

    /// Spawn the completion call and return without waiting for it. Must be
    /// called from within a tokio runtime.
    pub fn notify(&self, scene: SceneId, user: UserId) {
        let sink = Arc::clone(&self.sink);
        let mut tasks = self.tasks();
        // reap calls that already finished
        while tasks.try_join_next().is_some() {}
        tasks.spawn(async move {
            match sink.complete_scene(scene, user).await {
                Ok(resp) => debug!(
                    %scene,
                    xp_earned = resp.xp_earned,
                    total_xp = resp.total_xp,
                    streak = resp.current_streak,
                    new_badges = resp.new_badges.len(),
                    "scene completed"
                ),
                Err(err) => warn!(%scene, %user, "failed to mark scene complete: {err}"),
            }
        });
    }

    /// Number of completion calls spawned and not yet drained.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.tasks().len()
    }

    /// Wait for every completion call spawned so far.
    pub async fn drain(&self) {
        let mut tasks = std::mem::take(&mut *self.tasks());
        if !tasks.is_empty() {
            debug!(pending = tasks.len(), "waiting for scene completions");
        }
        while let Some(result) = tasks.join_next().await {
            if let Err(err) = result {
                warn!("scene completion task failed: {err}");
            }
        }
    }

    fn tasks(&self) -> MutexGuard<'_, JoinSet<()>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
