/// Public library interface for the habit completion and streak engine
///
/// This crate tracks recurring habits against a calendar: whether a habit is
/// due on a date, what outcome was recorded for each day, and the resulting
/// streak statistics. The engine is a synchronous in-process library; the
/// bundled binary is a thin CLI over it.

use thiserror::Error;

// Internal modules
mod domain;
mod engine;
mod storage;

pub mod cli;

// Re-export public modules and types
pub use domain::*;
pub use engine::{ActualCounts, CompletionStats, OverallStats, StreakEngine, actual_counts_as_of};
pub use storage::{HabitStore, SqliteStore, StorageError};

/// Errors surfaced by engine operations
///
/// Storage failures abort the operation with the transaction rolled back;
/// nothing here is retried automatically.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Database error: {0}")]
    Database(#[from] storage::StorageError),

    #[error("Domain validation error: {0}")]
    Domain(#[from] domain::DomainError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EngineError {
    /// True when the failure is a missing habit or record
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            EngineError::Database(
                StorageError::HabitNotFound { .. } | StorageError::RecordNotFound { .. }
            )
        )
    }
}
