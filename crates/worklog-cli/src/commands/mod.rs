//! Command implementations.

pub mod config;
pub mod discover;
pub mod summarize;

pub use self::config::execute_config;
pub use self::discover::execute_discover;
pub use self::summarize::execute_summarize;
