//! Repository layer for data access operations.
//!
//! Provides async CRUD operations for todo items.

mod todo_repo;

pub use todo_repo::{PgTodoRepository, TodoRepository};

use std::sync::Arc;

use crate::db::AsyncDbPool;

/// Aggregates all repositories for convenient access.
///
/// Repositories sit behind trait objects so tests can swap in an
/// in-memory store. Cloning only bumps reference counts.
#[derive(Clone)]
pub struct Repositories {
    pub todos: Arc<dyn TodoRepository>,
}

impl Repositories {
    /// Creates a new Repositories instance backed by PostgreSQL.
    ///
    /// # Arguments
    /// * `pool` - The async database connection pool
    pub fn new(pool: AsyncDbPool) -> Self {
        Self {
            todos: Arc::new(PgTodoRepository::new(pool)),
        }
    }
}
