/// CompletionRecord entity for tracking per-day habit outcomes
///
/// This module defines the CompletionRecord struct, the ledger row that says
/// what happened for one habit on one calendar day. The (habit_id, date) pair
/// is the uniqueness key; marking the same day twice updates in place.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};
use crate::domain::{CompletionStatus, HabitId, DomainError};

/// One ledger row: the outcome for a habit on a specific calendar day
///
/// `streak_snapshot` is the streak value computed at the time the row was
/// written, not re-derived lazily. Bulk recompute is the repair tool when
/// snapshots drift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRecord {
    /// Which habit this record is for
    pub habit_id: HabitId,
    /// Which calendar day this outcome is for (no time component)
    pub date: NaiveDate,
    /// When the completion was logged; set only for completed records
    pub completed_at: Option<DateTime<Utc>>,
    /// Outcome for the day
    pub status: CompletionStatus,
    /// Streak value as computed when this record was written
    pub streak_snapshot: u32,
    /// User's notes about this day
    pub notes: Option<String>,
}

impl CompletionRecord {
    /// Create a completed record for a day
    ///
    /// `completed_at` is stamped with the current time; the caller supplies
    /// the streak snapshot this completion achieves.
    pub fn completed(
        habit_id: HabitId,
        date: NaiveDate,
        streak_snapshot: u32,
        notes: Option<String>,
    ) -> Result<Self, DomainError> {
        Self::validate_notes(&notes)?;

        Ok(Self {
            habit_id,
            date,
            completed_at: Some(Utc::now()),
            status: CompletionStatus::Completed,
            streak_snapshot,
            notes,
        })
    }

    /// Create a missed record for a day
    ///
    /// Missed records never carry a completion timestamp and always snapshot
    /// a zero streak.
    pub fn missed(
        habit_id: HabitId,
        date: NaiveDate,
        notes: Option<String>,
    ) -> Result<Self, DomainError> {
        Self::validate_notes(&notes)?;

        Ok(Self {
            habit_id,
            date,
            completed_at: None,
            status: CompletionStatus::Missed,
            streak_snapshot: 0,
            notes,
        })
    }

    /// Create a skipped record for a day
    pub fn skipped(
        habit_id: HabitId,
        date: NaiveDate,
        notes: Option<String>,
    ) -> Result<Self, DomainError> {
        Self::validate_notes(&notes)?;

        Ok(Self {
            habit_id,
            date,
            completed_at: None,
            status: CompletionStatus::Skipped,
            streak_snapshot: 0,
            notes,
        })
    }

    /// Create a record from existing data (used when loading from database)
    pub fn from_existing(
        habit_id: HabitId,
        date: NaiveDate,
        completed_at: Option<DateTime<Utc>>,
        status: CompletionStatus,
        streak_snapshot: u32,
        notes: Option<String>,
    ) -> Self {
        Self {
            habit_id,
            date,
            completed_at,
            status,
            streak_snapshot,
            notes,
        }
    }

    /// Check if this record has non-empty notes
    pub fn has_notes(&self) -> bool {
        self.notes.as_deref().map_or(false, |n| !n.trim().is_empty())
    }

    /// Validate the optional notes field
    fn validate_notes(notes: &Option<String>) -> Result<(), DomainError> {
        if let Some(note_text) = notes {
            if note_text.len() > 500 {
                return Err(DomainError::InvalidValue {
                    message: "Notes cannot be longer than 500 characters".to_string()
                });
            }
        }
        Ok(())
    }
}
