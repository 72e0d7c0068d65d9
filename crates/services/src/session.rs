//! Explicit session state: bearer token plus the cached profile of the
//! signed-in user, mirrored to local storage so it survives restarts.

use std::sync::{Arc, PoisonError, RwLock};

use katha_core::model::{AuthResponse, User};
use storage::{KeyValueStore, keys};
use tracing::{debug, info, warn};

use crate::error::SessionError;

#[derive(Debug, Clone, Default)]
struct SessionState {
    token: Option<String>,
    user: Option<User>,
}

/// Shared handle; clones see the same session.
#[derive(Clone)]
pub struct SessionContext {
    kv: Arc<dyn KeyValueStore>,
    state: Arc<RwLock<SessionState>>,
}

impl SessionContext {
    /// An empty session over `kv`. Call [`SessionContext::init_session`] to
    /// pick up a session persisted by an earlier run.
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            kv,
            state: Arc::new(RwLock::new(SessionState::default())),
        }
    }

    /// Load the persisted token and profile. An unreadable profile is
    /// treated as absent; the token is kept either way.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if storage cannot be read.
    pub async fn init_session(&self) -> Result<Option<User>, SessionError> {
        let token = self
            .kv
            .get(keys::AUTH_TOKEN)
            .await?
            .filter(|token| !token.is_empty());
        let user = match self.kv.get(keys::CURRENT_USER).await? {
            Some(raw) => match serde_json::from_str::<User>(&raw) {
                Ok(user) => Some(user),
                Err(err) => {
                    warn!("ignoring unparsable stored user: {err}");
                    None
                }
            },
            None => None,
        };

        debug!(
            has_token = token.is_some(),
            user_id = user.as_ref().map(|u| u.id.value()),
            "restored session"
        );
        let mut state = self.write_state();
        state.token = token;
        state.user = user.clone();
        Ok(user)
    }

    /// Adopt the token and profile returned by login or registration.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the session cannot be persisted.
    pub async fn start_session(&self, auth: &AuthResponse) -> Result<(), SessionError> {
        let encoded = serde_json::to_string(&auth.user)?;
        self.kv.set(keys::AUTH_TOKEN, &auth.access_token).await?;
        self.kv.set(keys::CURRENT_USER, &encoded).await?;

        let mut state = self.write_state();
        state.token = Some(auth.access_token.clone());
        state.user = Some(auth.user.clone());
        info!(user_id = %auth.user.id, "session started");
        Ok(())
    }

    /// Replace the cached profile, e.g. after a profile fetch or edit.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the profile cannot be persisted.
    pub async fn update_user(&self, user: &User) -> Result<(), SessionError> {
        let encoded = serde_json::to_string(user)?;
        self.kv.set(keys::CURRENT_USER, &encoded).await?;
        self.write_state().user = Some(user.clone());
        Ok(())
    }

    /// Forget the token and profile, in memory and in storage. The in-memory
    /// session is cleared even when storage fails.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if a storage key could not be removed.
    pub async fn clear_session(&self) -> Result<(), SessionError> {
        {
            let mut state = self.write_state();
            state.token = None;
            state.user = None;
        }
        let token = self.kv.remove(keys::AUTH_TOKEN).await;
        let user = self.kv.remove(keys::CURRENT_USER).await;
        info!("session cleared");
        token?;
        user?;
        Ok(())
    }

    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.read_state().token.clone()
    }

    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.read_state().user.clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.read_state().token.is_some()
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
