//! Service layer for business logic operations.
//!
//! Services encapsulate business logic and coordinate between
//! repositories and handlers.

mod todo_service;

pub use todo_service::{TodoService, TodoServiceImpl};

use std::sync::Arc;

use crate::repositories::Repositories;

/// Aggregates all services for convenient access.
///
/// This struct is designed to be used as Axum application state.
/// Cloning only bumps reference counts.
#[derive(Clone)]
pub struct Services {
    pub todos: Arc<dyn TodoService>,
}

impl Services {
    /// Creates a new Services instance from Repositories.
    pub fn new(repos: Repositories) -> Self {
        Self {
            todos: Arc::new(TodoServiceImpl::new(repos.todos)),
        }
    }
}
