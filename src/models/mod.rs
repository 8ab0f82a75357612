//! Domain models.

mod todo;

pub use todo::Todo;
