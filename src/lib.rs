//! todo-service library
//!
//! A layered CRUD service for todo items: HTTP handlers call a validating
//! service, which calls a repository backed by PostgreSQL.

use shadow_rs::shadow;
shadow!(build);

pub mod api;
pub mod cli;
pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod logger;
pub mod models;
pub mod repositories;
pub mod schema;
pub mod server;
pub mod services;
pub mod state;

pub use context::Context;
pub use state::AppState;

pub fn pkg_version() -> &'static str {
    build::PKG_VERSION
}
