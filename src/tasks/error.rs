//! Task error taxonomy.
//!
//! The storage layer itself reports failures as `anyhow::Error`; everything
//! the REST layer needs to map to a status code is typed here.

#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    /// Rejected input: missing description, unknown category, malformed
    /// deadline. The display string is the exact wire message.
    #[error("{0}")]
    Validation(String),

    /// No task with the requested id.
    #[error("Task not found")]
    NotFound,

    /// Backing store failure (disk, database).
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}
