/// Storage layer for persisting habits and the completion ledger
///
/// This module handles all database operations using SQLite. It provides
/// a clean interface for storing and retrieving habits and their per-day
/// completion records.

pub mod sqlite;
pub mod migrations;

// Re-export the main storage types
pub use sqlite::*;

use chrono::NaiveDate;
use thiserror::Error;
use crate::domain::{CompletionRecord, Habit, HabitId};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Database query error: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Habit not found: {habit_id}")]
    HabitNotFound { habit_id: String },

    #[error("Record not found: habit {habit_id} on {date}")]
    RecordNotFound { habit_id: String, date: String },

    #[error("Migration error: {0}")]
    Migration(String),
}

/// Trait defining the storage interface for habits and the ledger
///
/// The engine takes this as an injected dependency so it is constructible
/// and testable against any backing store (in-memory SQLite in tests).
/// Implementations guarantee the (habit_id, date) uniqueness invariant and
/// run multi-statement writes inside a transaction.
pub trait HabitStore {
    /// Create a new habit
    fn create_habit(&self, habit: &Habit) -> Result<(), StorageError>;

    /// Get a habit by ID
    fn habit(&self, habit_id: &HabitId) -> Result<Habit, StorageError>;

    /// Update an existing habit
    fn update_habit(&self, habit: &Habit) -> Result<(), StorageError>;

    /// Delete a habit; its ledger rows are cascade-deleted
    fn delete_habit(&self, habit_id: &HabitId) -> Result<(), StorageError>;

    /// List all habits, newest first
    fn list_habits(&self) -> Result<Vec<Habit>, StorageError>;

    /// Insert or update the record for (habit_id, date) in one atomic step
    fn upsert_record(&self, record: &CompletionRecord) -> Result<(), StorageError>;

    /// Get the record for a habit on a specific day, if any
    fn record(
        &self,
        habit_id: &HabitId,
        date: NaiveDate,
    ) -> Result<Option<CompletionRecord>, StorageError>;

    /// Get a habit's records within an inclusive date range, ascending
    fn records_in_range(
        &self,
        habit_id: &HabitId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<CompletionRecord>, StorageError>;

    /// Get all records for a habit in ascending date order
    fn records_for_habit(&self, habit_id: &HabitId) -> Result<Vec<CompletionRecord>, StorageError>;

    /// Get every ledger row across all habits
    fn all_records(&self) -> Result<Vec<CompletionRecord>, StorageError>;

    /// Get the ids of all habits that have at least one ledger row
    fn distinct_habit_ids(&self) -> Result<Vec<HabitId>, StorageError>;

    /// Delete all records for a habit; returns the number removed
    fn delete_records_for_habit(&self, habit_id: &HabitId) -> Result<usize, StorageError>;

    /// Delete records older than the cutoff date (exclusive); returns the
    /// number removed
    fn delete_records_older_than(&self, cutoff: NaiveDate) -> Result<usize, StorageError>;

    /// Rewrite streak snapshots for the given keys, all-or-nothing
    fn write_snapshots(
        &self,
        updates: &[(HabitId, NaiveDate, u32)],
    ) -> Result<(), StorageError>;
}
