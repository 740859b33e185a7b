/// Habit entity and related functionality
///
/// This module defines the core Habit struct that represents a recurring
/// habit with an active window and a scheduled time-of-day, along with
/// validation and the due-day predicate.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use crate::domain::{RecurrencePattern, HabitId, DomainError};

/// A habit represents something the user wants to do on a recurring schedule
///
/// Each habit has a recurrence pattern, an active window bounded by
/// `start_date` (first eligible day) and an optional inclusive `end_date`,
/// and a scheduled time-of-day that only matters for the streak grace period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    /// Unique identifier for this habit
    pub id: HabitId,
    /// Display name (e.g., "Morning Run", "Read for 30min")
    pub name: String,
    /// Optional detailed description
    pub description: Option<String>,
    /// Which calendar days this habit is due on
    pub pattern: RecurrencePattern,
    /// First eligible day
    pub start_date: NaiveDate,
    /// Inclusive last eligible day, or None for open-ended
    pub end_date: Option<NaiveDate>,
    /// Time of day the habit is meant to happen; anchors the grace period
    pub scheduled_time: NaiveTime,
    /// When this habit was created
    pub created_at: DateTime<Utc>,
}

impl Habit {
    /// Create a new habit with validation
    ///
    /// This is the main constructor that validates all fields and returns
    /// an error if any validation fails.
    pub fn new(
        name: String,
        description: Option<String>,
        pattern: RecurrencePattern,
        start_date: NaiveDate,
        end_date: Option<NaiveDate>,
        scheduled_time: NaiveTime,
    ) -> Result<Self, DomainError> {
        Self::validate_name(&name)?;
        Self::validate_description(&description)?;
        pattern.validate()?;
        Self::validate_window(start_date, end_date)?;

        Ok(Self {
            id: HabitId::new(),
            name,
            description,
            pattern,
            start_date,
            end_date,
            scheduled_time,
            created_at: Utc::now(),
        })
    }

    /// Create a habit from existing data (used when loading from database)
    ///
    /// This constructor assumes data is already validated and is mainly used
    /// by the storage layer when loading habits from the database.
    pub fn from_existing(
        id: HabitId,
        name: String,
        description: Option<String>,
        pattern: RecurrencePattern,
        start_date: NaiveDate,
        end_date: Option<NaiveDate>,
        scheduled_time: NaiveTime,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            description,
            pattern,
            start_date,
            end_date,
            scheduled_time,
            created_at,
        }
    }

    /// Update the habit's properties with validation
    pub fn update(
        &mut self,
        name: Option<String>,
        description: Option<Option<String>>,
        pattern: Option<RecurrencePattern>,
        end_date: Option<Option<NaiveDate>>,
        scheduled_time: Option<NaiveTime>,
    ) -> Result<(), DomainError> {
        // Validate new values before applying them
        if let Some(ref new_name) = name {
            Self::validate_name(new_name)?;
        }
        if let Some(ref new_desc) = description {
            Self::validate_description(new_desc)?;
        }
        if let Some(ref new_pattern) = pattern {
            new_pattern.validate()?;
        }
        if let Some(new_end) = end_date {
            Self::validate_window(self.start_date, new_end)?;
        }

        // Apply updates
        if let Some(new_name) = name {
            self.name = new_name;
        }
        if let Some(new_description) = description {
            self.description = new_description;
        }
        if let Some(new_pattern) = pattern {
            self.pattern = new_pattern;
        }
        if let Some(new_end) = end_date {
            self.end_date = new_end;
        }
        if let Some(new_time) = scheduled_time {
            self.scheduled_time = new_time;
        }

        Ok(())
    }

    /// Decide whether this habit is due on the given calendar day
    ///
    /// Returns false outside the habit's active window (before `start_date`
    /// or, when set, after the inclusive `end_date`), otherwise evaluates the
    /// recurrence pattern against the date's weekday. Pure, no side effects;
    /// `NaiveDate` carries no time component so the comparison is always by
    /// calendar day.
    pub fn is_due(&self, date: NaiveDate) -> bool {
        if date < self.start_date {
            return false;
        }
        if let Some(end) = self.end_date {
            if date > end {
                return false;
            }
        }
        self.pattern.matches(date)
    }

    // Validation helper methods

    /// Validate habit name according to business rules
    fn validate_name(name: &str) -> Result<(), DomainError> {
        let trimmed = name.trim();

        if trimmed.is_empty() {
            return Err(DomainError::InvalidHabitName(
                "Habit name cannot be empty".to_string()
            ));
        }

        if trimmed.len() > 100 {
            return Err(DomainError::InvalidHabitName(
                "Habit name cannot be longer than 100 characters".to_string()
            ));
        }

        Ok(())
    }

    /// Validate optional description
    fn validate_description(description: &Option<String>) -> Result<(), DomainError> {
        if let Some(desc) = description {
            if desc.len() > 500 {
                return Err(DomainError::Validation {
                    message: "Description cannot be longer than 500 characters".to_string()
                });
            }
        }
        Ok(())
    }

    /// Validate that the active window is not inverted
    fn validate_window(
        start_date: NaiveDate,
        end_date: Option<NaiveDate>,
    ) -> Result<(), DomainError> {
        if let Some(end) = end_date {
            if end < start_date {
                return Err(DomainError::InvalidDate(
                    "End date cannot be before start date".to_string()
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn nine_am() -> NaiveTime {
        NaiveTime::from_hms_opt(9, 0, 0).unwrap()
    }

    #[test]
    fn test_create_valid_habit() {
        let habit = Habit::new(
            "Morning Run".to_string(),
            Some("30-minute jog around the neighborhood".to_string()),
            RecurrencePattern::Everyday,
            date(2024, 1, 1),
            None,
            nine_am(),
        );

        assert!(habit.is_ok());
        let habit = habit.unwrap();
        assert_eq!(habit.name, "Morning Run");
        assert_eq!(habit.pattern, RecurrencePattern::Everyday);
        assert_eq!(habit.start_date, date(2024, 1, 1));
    }

    #[test]
    fn test_invalid_habit_name() {
        let result = Habit::new(
            "".to_string(), // Empty name should fail
            None,
            RecurrencePattern::Everyday,
            date(2024, 1, 1),
            None,
            nine_am(),
        );

        assert!(result.is_err());
    }

    #[test]
    fn test_inverted_window_rejected() {
        let result = Habit::new(
            "Test Habit".to_string(),
            None,
            RecurrencePattern::Everyday,
            date(2024, 6, 10),
            Some(date(2024, 6, 1)),
            nine_am(),
        );

        assert!(result.is_err());
    }

    #[test]
    fn test_is_due_window_bounds() {
        let habit = Habit::new(
            "Bounded".to_string(),
            None,
            RecurrencePattern::Everyday,
            date(2024, 6, 10),
            Some(date(2024, 6, 20)),
            nine_am(),
        )
        .unwrap();

        // One day before the window opens and one day after it closes
        assert!(!habit.is_due(date(2024, 6, 9)));
        assert!(habit.is_due(date(2024, 6, 10)));
        assert!(habit.is_due(date(2024, 6, 20)));
        assert!(!habit.is_due(date(2024, 6, 21)));
    }

    #[test]
    fn test_is_due_is_deterministic() {
        let habit = Habit::new(
            "Weekday Habit".to_string(),
            None,
            RecurrencePattern::Weekdays,
            date(2024, 6, 3),
            None,
            nine_am(),
        )
        .unwrap();

        for offset in 0..14 {
            let day = date(2024, 6, 3) + chrono::Duration::days(offset);
            assert_eq!(habit.is_due(day), habit.is_due(day));
        }
    }

    #[test]
    fn test_is_due_respects_pattern_inside_window() {
        let habit = Habit::new(
            "Gym".to_string(),
            None,
            RecurrencePattern::Custom(vec![Weekday::Mon, Weekday::Fri]),
            date(2024, 6, 3),
            None,
            nine_am(),
        )
        .unwrap();

        assert!(habit.is_due(date(2024, 6, 3))); // Monday
        assert!(!habit.is_due(date(2024, 6, 4))); // Tuesday
        assert!(habit.is_due(date(2024, 6, 7))); // Friday
    }
}
