/// Command handlers for the habit-ledger binary
///
/// Each handler takes the engine plus parsed arguments, performs one
/// operation, and prints a human-readable or JSON result. Habits can be
/// addressed by id or by (case-insensitive) name.

use chrono::{Duration, NaiveDate, NaiveTime, Utc, Weekday};

use crate::domain::{Habit, HabitId, RecurrencePattern};
use crate::engine::StreakEngine;
use crate::storage::{HabitStore, StorageError};
use crate::EngineError;

/// Parse a recurrence pattern from its CLI spelling
///
/// Accepted forms: "everyday" (or "daily"), "weekdays", "weekends", a single
/// weekday name ("monday", "fri"), or a comma-separated list of weekday
/// names for a custom pattern ("mon,wed,fri").
pub fn parse_pattern(s: &str) -> Result<RecurrencePattern, String> {
    let lowered = s.trim().to_lowercase();

    match lowered.as_str() {
        "everyday" | "daily" => return Ok(RecurrencePattern::Everyday),
        "weekdays" => return Ok(RecurrencePattern::Weekdays),
        "weekends" => return Ok(RecurrencePattern::Weekends),
        _ => {}
    }

    if lowered.contains(',') {
        let mut days = Vec::new();
        for part in lowered.split(',') {
            let day: Weekday = part
                .trim()
                .parse()
                .map_err(|_| format!("Unknown weekday: {}", part.trim()))?;
            if !days.contains(&day) {
                days.push(day);
            }
        }
        let pattern = RecurrencePattern::Custom(days);
        pattern.validate().map_err(|e| e.to_string())?;
        return Ok(pattern);
    }

    match lowered.parse::<Weekday>() {
        Ok(day) => Ok(RecurrencePattern::Single(day)),
        Err(_) => Err(format!(
            "Unknown pattern: {} (expected everyday, weekdays, weekends, a weekday name, or a comma-separated list)",
            s
        )),
    }
}

/// Resolve a habit by id or name
pub fn resolve_habit<S: HabitStore>(
    engine: &StreakEngine<S>,
    query: &str,
) -> Result<Habit, EngineError> {
    if let Ok(id) = HabitId::from_string(query) {
        return Ok(engine.store().habit(&id)?);
    }

    let lowered = query.to_lowercase();
    for habit in engine.store().list_habits()? {
        if habit.name.to_lowercase() == lowered {
            return Ok(habit);
        }
    }

    Err(EngineError::Database(StorageError::HabitNotFound {
        habit_id: query.to_string(),
    }))
}

/// Create a new habit
pub fn add<S: HabitStore>(
    engine: &StreakEngine<S>,
    name: String,
    description: Option<String>,
    pattern: RecurrencePattern,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    scheduled_time: NaiveTime,
) -> Result<(), EngineError> {
    let start = start_date.unwrap_or_else(|| Utc::now().naive_utc().date());
    let habit = Habit::new(name, description, pattern, start, end_date, scheduled_time)?;
    engine.store().create_habit(&habit)?;

    println!("Created habit '{}' ({})", habit.name, habit.id.to_string());
    Ok(())
}

/// List all habits with their current streaks
pub fn list<S: HabitStore>(engine: &StreakEngine<S>) -> Result<(), EngineError> {
    let habits = engine.store().list_habits()?;
    if habits.is_empty() {
        println!("No habits yet");
        return Ok(());
    }

    let today = Utc::now().naive_utc().date();
    for habit in habits {
        let streak = engine.current_streak(&habit.id, today)?;
        let due_marker = if habit.is_due(today) { "due today" } else { "not due today" };
        println!(
            "{}  {} ({}, streak {})",
            habit.id.to_string(),
            habit.name,
            due_marker,
            streak
        );
    }
    Ok(())
}

/// Mark a habit completed for a day (today by default)
pub fn done<S: HabitStore>(
    engine: &StreakEngine<S>,
    query: &str,
    date: Option<NaiveDate>,
    notes: Option<String>,
) -> Result<(), EngineError> {
    let habit = resolve_habit(engine, query)?;
    let day = date.unwrap_or_else(|| Utc::now().naive_utc().date());

    let record = engine.mark_completed(&habit.id, day, notes)?;
    println!(
        "Marked '{}' completed for {} (streak {})",
        habit.name, day, record.streak_snapshot
    );
    Ok(())
}

/// Mark a habit missed for a day (today by default)
pub fn miss<S: HabitStore>(
    engine: &StreakEngine<S>,
    query: &str,
    date: Option<NaiveDate>,
    notes: Option<String>,
) -> Result<(), EngineError> {
    let habit = resolve_habit(engine, query)?;
    let day = date.unwrap_or_else(|| Utc::now().naive_utc().date());

    engine.mark_missed(&habit.id, day, notes)?;
    println!("Marked '{}' missed for {}", habit.name, day);
    Ok(())
}

/// Mark a day as deliberately skipped
pub fn skip<S: HabitStore>(
    engine: &StreakEngine<S>,
    query: &str,
    date: Option<NaiveDate>,
    notes: Option<String>,
) -> Result<(), EngineError> {
    let habit = resolve_habit(engine, query)?;
    let day = date.unwrap_or_else(|| Utc::now().naive_utc().date());

    engine.mark_skipped(&habit.id, day, notes)?;
    println!("Marked '{}' skipped for {}", habit.name, day);
    Ok(())
}

/// Print the full statistics report for one habit as JSON
pub fn status<S: HabitStore>(engine: &StreakEngine<S>, query: &str) -> Result<(), EngineError> {
    let habit = resolve_habit(engine, query)?;
    let stats = engine.completion_stats(&habit.id)?;

    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

/// Print cross-habit ledger totals as JSON
pub fn overview<S: HabitStore>(engine: &StreakEngine<S>) -> Result<(), EngineError> {
    let stats = engine.overall_stats()?;
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

/// Rewrite all stored streak snapshots from the ledger
pub fn recalc<S: HabitStore>(engine: &StreakEngine<S>) -> Result<(), EngineError> {
    let rewritten = engine.recalculate_all_streaks()?;
    println!("Recalculated {} streak snapshots", rewritten);
    Ok(())
}

/// Delete ledger rows older than the retention window
pub fn cleanup<S: HabitStore>(engine: &StreakEngine<S>, keep_days: u32) -> Result<(), EngineError> {
    let cutoff = Utc::now().naive_utc().date() - Duration::days(keep_days as i64);
    let removed = engine.delete_older_than(cutoff)?;
    println!("Removed {} records older than {}", removed, cutoff);
    Ok(())
}

/// Delete a habit and its ledger rows
pub fn remove<S: HabitStore>(engine: &StreakEngine<S>, query: &str) -> Result<(), EngineError> {
    let habit = resolve_habit(engine, query)?;
    engine.store().delete_habit(&habit.id)?;
    println!("Deleted habit '{}' and its records", habit.name);
    Ok(())
}
