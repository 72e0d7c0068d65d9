use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Backend identifiers are opaque integers; each entity gets its own newtype so
/// a chapter id cannot be passed where a scene id is expected.
macro_rules! backend_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            #[must_use]
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            #[must_use]
            pub const fn value(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse::<u64>()
                    .map(Self)
                    .map_err(|_| ParseIdError {
                        kind: stringify!($name),
                        raw: s.to_owned(),
                    })
            }
        }
    };
}

backend_id!(
    /// Identifier of a story.
    StoryId
);
backend_id!(
    /// Identifier of a chapter within a story.
    ChapterId
);
backend_id!(
    /// Identifier of a scene within a chapter.
    SceneId
);
backend_id!(
    /// Identifier of a user account.
    UserId
);
backend_id!(
    /// Identifier of a map location.
    LocationId
);

/// Error returned when an id cannot be parsed from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind}: {raw:?}")]
pub struct ParseIdError {
    kind: &'static str,
    raw: String,
}
