/// Core types and enums used throughout the domain layer
///
/// This module defines the fundamental types like RecurrencePattern and
/// CompletionStatus, plus the HabitId wrapper used by Habit, CompletionRecord,
/// and the streak engine.

use serde::{Deserialize, Serialize};
use chrono::{NaiveDate, Weekday, Datelike};
use uuid::Uuid;

/// Unique identifier for a habit
///
/// This is a wrapper around UUID to provide type safety - you can't accidentally
/// pass some other string id where a habit ID is expected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HabitId(pub Uuid);

impl HabitId {
    /// Generate a new random habit ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a habit ID from a string (useful for database loading)
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }

    /// Convert to string representation
    pub fn to_string(&self) -> String {
        self.0.to_string()
    }
}

impl Default for HabitId {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome recorded for a habit on a single calendar day
///
/// A closed enum rather than a free-form string so that an invalid status
/// is unrepresentable. `Skipped` days are inert: they neither extend nor
/// break a streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompletionStatus {
    /// The habit was performed on this day
    Completed,
    /// The habit was explicitly marked as not performed
    Missed,
    /// The day was deliberately sat out (vacation, illness, ...)
    Skipped,
}

impl CompletionStatus {
    /// Storage representation used in the SQLite schema
    pub fn as_str(&self) -> &'static str {
        match self {
            CompletionStatus::Completed => "completed",
            CompletionStatus::Missed => "missed",
            CompletionStatus::Skipped => "skipped",
        }
    }

    /// Parse the storage representation back into the enum
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "completed" => Some(CompletionStatus::Completed),
            "missed" => Some(CompletionStatus::Missed),
            "skipped" => Some(CompletionStatus::Skipped),
            _ => None,
        }
    }
}

/// Which calendar days a habit is due on
///
/// The pattern decides the "due day" predicate together with the habit's
/// active window (start/end dates). Weekday-set membership is the only
/// calendar rule involved; there is no notion of time-of-day here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecurrencePattern {
    /// Every single day
    Everyday,
    /// Monday through Friday only
    Weekdays,
    /// Saturday and Sunday only
    Weekends,
    /// One specific day of the week
    Single(Weekday),
    /// Specific days of the week (e.g., Monday, Wednesday, Friday)
    Custom(Vec<Weekday>),
}

impl RecurrencePattern {
    /// Validate that a pattern is reasonable
    pub fn validate(&self) -> Result<(), crate::domain::DomainError> {
        match self {
            RecurrencePattern::Custom(days) => {
                if days.is_empty() {
                    return Err(crate::domain::DomainError::InvalidPattern(
                        "Custom pattern must specify at least one day".to_string()
                    ));
                }
                if days.len() > 7 {
                    return Err(crate::domain::DomainError::InvalidPattern(
                        "Custom pattern cannot have more than 7 days".to_string()
                    ));
                }
            }
            _ => {} // Everyday, Weekdays, Weekends, Single are always valid
        }
        Ok(())
    }

    /// Check whether this pattern schedules the habit on a given date
    ///
    /// This is pure weekday logic; the habit's start/end window is checked
    /// separately by `Habit::is_due`.
    pub fn matches(&self, date: NaiveDate) -> bool {
        let weekday = date.weekday();
        match self {
            RecurrencePattern::Everyday => true,
            RecurrencePattern::Weekdays => {
                !matches!(weekday, Weekday::Sat | Weekday::Sun)
            }
            RecurrencePattern::Weekends => {
                matches!(weekday, Weekday::Sat | Weekday::Sun)
            }
            RecurrencePattern::Single(day) => weekday == *day,
            RecurrencePattern::Custom(days) => days.contains(&weekday),
        }
    }
}
