//! Resolution of media paths (images, narration, video) returned by the backend.

use thiserror::Error;
use url::Url;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AssetUrlError {
    #[error("invalid base URL: {0}")]
    InvalidBase(String),

    #[error("base URL must use http or https: {0}")]
    UnsupportedScheme(String),
}

/// Origin that relative media paths are served from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetBase(String);

impl AssetBase {
    /// Derive the asset origin from the API base by dropping its `/api` segment.
    ///
    /// # Errors
    ///
    /// Returns `AssetUrlError` when `api_base` is not an absolute http(s) URL.
    pub fn from_api_base(api_base: &str) -> Result<Self, AssetUrlError> {
        let parsed =
            Url::parse(api_base).map_err(|_| AssetUrlError::InvalidBase(api_base.to_owned()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(AssetUrlError::UnsupportedScheme(api_base.to_owned()));
        }
        let trimmed = api_base.trim_end_matches('/');
        let stripped = trimmed.strip_suffix("/api").unwrap_or(trimmed);
        Ok(Self(stripped.trim_end_matches('/').to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Absolute URL for a media path. Already-absolute paths pass through.
    #[must_use]
    pub fn resolve(&self, path: Option<&str>) -> Option<String> {
        let path = path.filter(|p| !p.is_empty())?;
        if path.starts_with("http") {
            return Some(path.to_owned());
        }
        if path.starts_with('/') {
            Some(format!("{}{path}", self.0))
        } else {
            Some(format!("{}/{path}", self.0))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> AssetBase {
        AssetBase::from_api_base("http://localhost:8000/api").unwrap()
    }

    #[test]
    fn strips_api_segment() {
        assert_eq!(base().as_str(), "http://localhost:8000");
        let nested = AssetBase::from_api_base("https://katha.example/api/").unwrap();
        assert_eq!(nested.as_str(), "https://katha.example");
        let host = AssetBase::from_api_base("http://api.katha.example/api").unwrap();
        assert_eq!(host.as_str(), "http://api.katha.example");
    }

    #[test]
    fn joins_with_single_slash() {
        assert_eq!(
            base().resolve(Some("static/a.png")).as_deref(),
            Some("http://localhost:8000/static/a.png")
        );
        assert_eq!(
            base().resolve(Some("/static/a.png")).as_deref(),
            Some("http://localhost:8000/static/a.png")
        );
    }

    #[test]
    fn absolute_and_missing_paths() {
        assert_eq!(
            base().resolve(Some("https://cdn.example/v.mp4")).as_deref(),
            Some("https://cdn.example/v.mp4")
        );
        assert_eq!(base().resolve(None), None);
        assert_eq!(base().resolve(Some("")), None);
    }

    #[test]
    fn rejects_relative_base() {
        assert!(matches!(
            AssetBase::from_api_base("/api"),
            Err(AssetUrlError::InvalidBase(_))
        ));
        assert!(matches!(
            AssetBase::from_api_base("ftp://host/api"),
            Err(AssetUrlError::UnsupportedScheme(_))
        ));
    }
}
