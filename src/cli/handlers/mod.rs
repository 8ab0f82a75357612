//! Command handlers for CLI operations

pub mod seed;
pub mod serve;

pub use seed::{SAMPLE_TITLES, SeedCommandHandler};
pub use serve::ServeCommandHandler;
