//! Well-known storage keys. They match the keys the web client writes, so a
//! profile exported from a browser reads back unchanged.

/// JSON array of reading progress entries.
pub const READING_PROGRESS: &str = "katha_reading_progress";

/// Bearer token of the active session.
pub const AUTH_TOKEN: &str = "katha_token";

/// JSON profile of the signed-in user.
pub const CURRENT_USER: &str = "user";
