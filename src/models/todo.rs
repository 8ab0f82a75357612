use jiff::Timestamp;

/// A single todo item as seen by the service and handler layers.
///
/// `id` and both timestamps are assigned by the store. `updated_at` moves
/// forward on every mutation, so `created_at <= updated_at` always holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub completed: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
