#![forbid(unsafe_code)]

pub mod api;
pub mod app_services;
pub mod config;
pub mod error;
pub mod navigation;
pub mod notifier;
pub mod progress_store;
pub mod quiz_service;
pub mod reader;
pub mod session;
pub mod tracker;

pub use katha_core::Clock;

pub use api::ApiClient;
pub use app_services::AppServices;
pub use config::{ApiConfig, ReaderConfig};
pub use error::{
    ApiError, AppServicesError, ConfigError, QuizServiceError, ReaderError, SessionError,
};
pub use navigation::Navigator;
pub use notifier::{SceneCompletionNotifier, SceneCompletionSink};
pub use progress_store::ProgressStore;
pub use quiz_service::QuizService;
pub use reader::{ChapterReader, ReadingContext};
pub use session::SessionContext;
pub use tracker::{SceneTransition, ScrollPositionTracker};
