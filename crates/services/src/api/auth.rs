use katha_core::model::{AuthResponse, ProfileUpdate, Route, User};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::ApiClient;
use crate::error::ApiError;

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct Registration<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct ProfileUpdated {
    user: User,
}

impl ApiClient {
    /// Create an account and start a session for it.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the session cannot be stored.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, ApiError> {
        let auth: AuthResponse = self
            .post_json(
                "/users/register",
                &Registration {
                    name,
                    email,
                    password,
                },
            )
            .await?;
        self.session.start_session(&auth).await?;
        info!(user_id = %auth.user.id, "registered");
        Ok(auth)
    }

    /// # Errors
    ///
    /// Returns `ApiError` if the credentials are rejected, the request fails,
    /// or the session cannot be stored.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let auth: AuthResponse = self
            .post_json("/users/login", &Credentials { email, password })
            .await?;
        self.session.start_session(&auth).await?;
        info!(user_id = %auth.user.id, "logged in");
        Ok(auth)
    }

    /// Fetch the signed-in profile and refresh the cached copy.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the profile cannot be cached.
    pub async fn get_current_user(&self) -> Result<User, ApiError> {
        let user: User = self.get_json("/users/me").await?;
        self.session.update_user(&user).await?;
        Ok(user)
    }

    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the profile cannot be cached.
    pub async fn update_current_user(&self, update: &ProfileUpdate) -> Result<User, ApiError> {
        let ProfileUpdated { user } = self.put_json("/users/me", update).await?;
        self.session.update_user(&user).await?;
        Ok(user)
    }

    /// End the session locally and return to the login screen. The backend
    /// keeps no session state, so nothing is sent.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Session` if persisted credentials could not be removed.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let cleared = self.session.clear_session().await;
        self.navigator.navigate(Route::Login);
        cleared?;
        Ok(())
    }
}
