pub mod config;
pub mod error;
pub mod merge;
pub mod overlap;
pub mod session;
pub mod text;

pub use config::CowriterConfig;
pub use error::{CowriterError, Result};
