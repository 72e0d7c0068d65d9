#![forbid(unsafe_code)]

pub mod assets;
pub mod error;
pub mod model;
pub mod scroll;
pub mod time;

pub use error::Error;
pub use time::Clock;
