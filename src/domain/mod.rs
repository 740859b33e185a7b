/// Domain module containing core business logic and data types
///
/// This module defines the core entities (Habit, CompletionRecord), the
/// due-day predicate, and the pure streak algorithms. These types represent
/// the fundamental concepts in the completion and streak engine.

pub mod habit;
pub mod record;
pub mod streak;
pub mod types;

// Re-export public types for easy access
pub use habit::*;
pub use record::*;
pub use types::*;

use thiserror::Error;

/// Errors that can occur during domain operations
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid habit name: {0}")]
    InvalidHabitName(String),

    #[error("Invalid recurrence pattern: {0}")]
    InvalidPattern(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid value: {message}")]
    InvalidValue { message: String },
}
