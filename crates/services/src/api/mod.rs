//! HTTP client for the Katha backend.
//!
//! Every request carries the session's bearer token when one exists. A 401
//! from any endpoint ends the session: the token and cached profile are
//! dropped and the reader is sent to the login screen, unless they are
//! already on a screen that does not need a session.

mod ai;
mod auth;
mod catalog;
mod scenes;
mod users;

use katha_core::model::Route;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::navigation::Navigator;
use crate::session::SessionContext;

pub use ai::{NarrationRequest, PipelineRequest, PromptRequest, RishiQuestion};
pub use catalog::ALL_CATEGORIES;

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    config: ApiConfig,
    session: SessionContext,
    navigator: Navigator,
}

impl ApiClient {
    /// # Errors
    ///
    /// Returns `reqwest::Error` if the HTTP client cannot be built.
    pub fn new(
        config: ApiConfig,
        session: SessionContext,
        navigator: Navigator,
    ) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            config,
            session,
            navigator,
        })
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    #[must_use]
    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    #[must_use]
    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    /// Apply the global 401 policy. Storage failures while clearing are
    /// logged; the in-memory session is gone regardless.
    pub async fn handle_unauthorized(&self) {
        if let Err(err) = self.session.clear_session().await {
            warn!("failed to clear persisted session after 401: {err}");
        }
        let current = self.navigator.current();
        if current.is_unauthenticated_entry() {
            debug!(route = %current, "401 on an entry screen; staying put");
        } else {
            warn!(from = %current, "session rejected by server; redirecting to login");
            self.navigator.navigate(Route::Login);
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let request = self.http.request(method, self.config.endpoint(path));
        match self.session.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            self.handle_unauthorized().await;
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            debug!(url = %response.url(), %status, "request failed");
            return Err(ApiError::HttpStatus(status));
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.send(self.request(Method::GET, path)).await?;
        Ok(response.json().await?)
    }

    async fn get_json_with<T, Q>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let response = self
            .send(self.request(Method::GET, path).query(query))
            .await?;
        Ok(response.json().await?)
    }

    async fn post_json<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self.send(self.request(Method::POST, path).json(body)).await?;
        Ok(response.json().await?)
    }

    async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.send(self.request(Method::POST, path)).await?;
        Ok(response.json().await?)
    }

    async fn post_empty_with<T, Q>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let response = self
            .send(self.request(Method::POST, path).query(query))
            .await?;
        Ok(response.json().await?)
    }

    async fn put_json<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self.send(self.request(Method::PUT, path).json(body)).await?;
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use katha_core::model::{AuthResponse, StoryId};
    use std::time::Duration;

    use reqwest::header::AUTHORIZATION;
    use storage::{InMemoryRepository, KeyValueStore, keys};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    fn auth() -> AuthResponse {
        serde_json::from_value(serde_json::json!({
            "user": {"id": 3, "name": "Meera"},
            "access_token": "tok-abc",
            "token_type": "bearer",
            "expires_in": 3600
        }))
        .unwrap()
    }

    fn client(repo: &InMemoryRepository, route: Route) -> ApiClient {
        client_for(ApiConfig::default(), repo, route)
    }

    fn client_for(config: ApiConfig, repo: &InMemoryRepository, route: Route) -> ApiClient {
        let session = SessionContext::new(Arc::new(repo.clone()));
        ApiClient::new(config, session, Navigator::new(route)).unwrap()
    }

    /// Serve one request with a bodiless `status_line` response and hand back
    /// the raw request head.
    async fn answer_once(status_line: &'static str) -> (ApiConfig, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut head = Vec::new();
            let mut buf = [0_u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {status_line}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n"
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            String::from_utf8_lossy(&head).into_owned()
        });
        let config = ApiConfig::new(format!("http://{addr}/api"), Duration::from_secs(5)).unwrap();
        (config, server)
    }

    #[tokio::test]
    async fn attaches_bearer_token_when_signed_in() {
        let repo = InMemoryRepository::new();
        let api = client(&repo, Route::Home);

        let anonymous = api.request(Method::GET, "/users/me").build().unwrap();
        assert!(anonymous.headers().get(AUTHORIZATION).is_none());

        api.session().start_session(&auth()).await.unwrap();
        let signed = api.request(Method::GET, "/users/me").build().unwrap();
        assert_eq!(signed.headers()[AUTHORIZATION], "Bearer tok-abc");
        assert_eq!(signed.url().as_str(), "http://localhost:8000/api/users/me");
    }

    #[tokio::test]
    async fn unauthorized_clears_session_and_redirects() {
        let repo = InMemoryRepository::new();
        let api = client(&repo, Route::Story(StoryId::new(2)));
        api.session().start_session(&auth()).await.unwrap();

        api.handle_unauthorized().await;

        assert!(!api.session().is_authenticated());
        assert_eq!(repo.get(keys::AUTH_TOKEN).await.unwrap(), None);
        assert_eq!(repo.get(keys::CURRENT_USER).await.unwrap(), None);
        assert_eq!(api.navigator().current(), Route::Login);
    }

    #[tokio::test]
    async fn unauthorized_on_entry_screen_does_not_navigate() {
        for route in [Route::Login, Route::Register, Route::Onboarding] {
            let repo = InMemoryRepository::new();
            let api = client(&repo, route);
            api.session().start_session(&auth()).await.unwrap();

            api.handle_unauthorized().await;

            assert!(!api.session().is_authenticated());
            assert_eq!(api.navigator().current(), route);
        }
    }

    #[tokio::test]
    async fn server_401_ends_session_through_any_request() {
        let (config, server) = answer_once("401 Unauthorized").await;
        let repo = InMemoryRepository::new();
        let api = client_for(config, &repo, Route::Story(StoryId::new(2)));
        api.session().start_session(&auth()).await.unwrap();

        let result = api.get_current_user().await;

        assert!(matches!(result, Err(ApiError::Unauthorized)));
        let head = server.await.unwrap();
        assert!(head.starts_with("GET /api/users/me "));
        assert!(head.to_ascii_lowercase().contains("authorization: bearer tok-abc"));
        assert!(!api.session().is_authenticated());
        assert_eq!(repo.get(keys::AUTH_TOKEN).await.unwrap(), None);
        assert_eq!(api.navigator().current(), Route::Login);
    }

    #[tokio::test]
    async fn other_failures_keep_the_session() {
        let (config, server) = answer_once("500 Internal Server Error").await;
        let repo = InMemoryRepository::new();
        let api = client_for(config, &repo, Route::Home);
        api.session().start_session(&auth()).await.unwrap();

        let result = api.get_current_user().await;

        assert!(matches!(
            result,
            Err(ApiError::HttpStatus(StatusCode::INTERNAL_SERVER_ERROR))
        ));
        server.await.unwrap();
        assert!(api.session().is_authenticated());
        assert_eq!(api.navigator().current(), Route::Home);
    }
}
