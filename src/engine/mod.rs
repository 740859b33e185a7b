/// Recurrence-aware completion and streak engine
///
/// This module ties the due-day predicate, the completion ledger, and the
/// streak algorithms together behind one synchronous facade. The storage
/// backend is an injected `HabitStore`, so the engine runs against a real
/// database in the binary and an in-memory one in tests.

use std::collections::HashMap;
use chrono::{Duration, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::EngineError;
use crate::domain::{
    streak, CompletionRecord, CompletionStatus, Habit, HabitId,
};
use crate::storage::HabitStore;

/// Lifetime day-level counts for one habit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActualCounts {
    /// Due days with a completed record
    pub completed: u32,
    /// Due days marked missed, plus past due days never recorded
    pub missed: u32,
    /// Due days in the habit's window up to today
    pub scheduled: u32,
}

/// Full per-habit statistics report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionStats {
    pub habit_id: HabitId,
    pub completed: u32,
    pub missed: u32,
    pub scheduled: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
    /// completed / scheduled * 100, zero when nothing was scheduled
    pub completion_rate: f64,
}

/// Cross-habit ledger totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallStats {
    pub total_entries: u32,
    pub completed: u32,
    pub missed: u32,
    pub skipped: u32,
    pub distinct_habits: u32,
    /// completed / total_entries * 100, zero for an empty ledger
    pub completion_rate: f64,
}

/// Count scheduled/completed/missed days for a habit up to `today`
///
/// Walks every calendar day from the habit's start date through `today`
/// inclusive. Only due days count as scheduled; an unrecorded due day
/// strictly in the past is an implicit miss, while an unrecorded `today`
/// counts neither way (the grace period has not run out yet). Skipped days
/// count as scheduled but neither completed nor missed.
pub fn actual_counts_as_of(
    habit: &Habit,
    records: &HashMap<NaiveDate, CompletionStatus>,
    today: NaiveDate,
) -> ActualCounts {
    let mut counts = ActualCounts {
        completed: 0,
        missed: 0,
        scheduled: 0,
    };

    let mut day = habit.start_date;
    while day <= today {
        if habit.is_due(day) {
            counts.scheduled += 1;

            match records.get(&day) {
                Some(CompletionStatus::Completed) => counts.completed += 1,
                Some(CompletionStatus::Missed) => counts.missed += 1,
                Some(CompletionStatus::Skipped) => {}
                None if day < today => counts.missed += 1,
                None => {
                    // Today, still undecided
                }
            }
        }
        day = day + Duration::days(1);
    }

    counts
}

/// The engine facade over an injected store
pub struct StreakEngine<S: HabitStore> {
    store: S,
}

impl<S: HabitStore> StreakEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Direct access to the backing store (habit CRUD lives there)
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Mark a habit completed for a calendar day
    ///
    /// Upsert by (habit, date): an existing record is updated in place to
    /// completed with a fresh timestamp and the given notes, keeping its
    /// stored snapshot (bulk recompute is the repair tool for drift). A new
    /// record snapshots the streak this completion achieves, inclusive of
    /// itself. Fails with habit-not-found before anything is written.
    pub fn mark_completed(
        &self,
        habit_id: &HabitId,
        date: NaiveDate,
        notes: Option<String>,
    ) -> Result<CompletionRecord, EngineError> {
        let habit = self.store.habit(habit_id)?;

        let record = match self.store.record(habit_id, date)? {
            Some(mut existing) => {
                existing.status = CompletionStatus::Completed;
                existing.completed_at = Some(Utc::now());
                if notes.is_some() {
                    existing.notes = notes;
                }
                existing
            }
            None => {
                let rows = self.store.records_for_habit(habit_id)?;
                let snapshot =
                    streak::streak_with_completion(&habit, &streak::by_date(&rows), date, now());
                CompletionRecord::completed(habit_id.clone(), date, snapshot, notes)?
            }
        };

        self.store.upsert_record(&record)?;
        tracing::debug!(
            "Marked habit {} completed on {} (streak {})",
            habit_id.to_string(),
            date,
            record.streak_snapshot
        );
        Ok(record)
    }

    /// Mark a habit missed for a calendar day
    ///
    /// Upserts a missed record with no completion timestamp and a zero
    /// streak snapshot.
    pub fn mark_missed(
        &self,
        habit_id: &HabitId,
        date: NaiveDate,
        notes: Option<String>,
    ) -> Result<CompletionRecord, EngineError> {
        self.store.habit(habit_id)?;

        let record = CompletionRecord::missed(habit_id.clone(), date, notes)?;
        self.store.upsert_record(&record)?;

        tracing::debug!("Marked habit {} missed on {}", habit_id.to_string(), date);
        Ok(record)
    }

    /// Mark a calendar day as deliberately skipped
    ///
    /// Skipped days are inert for streaks: they neither extend nor break one.
    pub fn mark_skipped(
        &self,
        habit_id: &HabitId,
        date: NaiveDate,
        notes: Option<String>,
    ) -> Result<CompletionRecord, EngineError> {
        self.store.habit(habit_id)?;

        let record = CompletionRecord::skipped(habit_id.clone(), date, notes)?;
        self.store.upsert_record(&record)?;

        tracing::debug!("Marked habit {} skipped on {}", habit_id.to_string(), date);
        Ok(record)
    }

    /// Get the stored record for a habit on a day, if any
    pub fn record_for(
        &self,
        habit_id: &HabitId,
        date: NaiveDate,
    ) -> Result<Option<CompletionRecord>, EngineError> {
        Ok(self.store.record(habit_id, date)?)
    }

    /// Get a habit's records in an inclusive date range, ascending
    pub fn records_in_range(
        &self,
        habit_id: &HabitId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<CompletionRecord>, EngineError> {
        Ok(self.store.records_in_range(habit_id, start, end)?)
    }

    /// Delete every record for a habit; returns the number removed
    pub fn delete_records_for(&self, habit_id: &HabitId) -> Result<usize, EngineError> {
        Ok(self.store.delete_records_for_habit(habit_id)?)
    }

    /// Delete records older than the cutoff across all habits
    pub fn delete_older_than(&self, cutoff: NaiveDate) -> Result<usize, EngineError> {
        Ok(self.store.delete_records_older_than(cutoff)?)
    }

    /// Current streak for a habit as of a reference date
    pub fn current_streak(
        &self,
        habit_id: &HabitId,
        as_of: NaiveDate,
    ) -> Result<u32, EngineError> {
        let habit = self.store.habit(habit_id)?;
        let rows = self.store.records_for_habit(habit_id)?;

        Ok(streak::current_streak(
            &habit,
            &streak::by_date(&rows),
            as_of,
            now(),
        ))
    }

    /// Longest streak over a habit's raw ledger rows
    pub fn longest_streak(&self, habit_id: &HabitId) -> Result<u32, EngineError> {
        let rows = self.store.records_for_habit(habit_id)?;
        Ok(streak::longest_streak(&rows))
    }

    /// Lifetime completed/missed/scheduled counts for a habit
    pub fn actual_counts(&self, habit_id: &HabitId) -> Result<ActualCounts, EngineError> {
        let habit = self.store.habit(habit_id)?;
        let rows = self.store.records_for_habit(habit_id)?;

        Ok(actual_counts_as_of(
            &habit,
            &streak::by_date(&rows),
            now().date(),
        ))
    }

    /// Full statistics report for one habit
    pub fn completion_stats(&self, habit_id: &HabitId) -> Result<CompletionStats, EngineError> {
        let counts = self.actual_counts(habit_id)?;
        let current_streak = self.current_streak(habit_id, now().date())?;
        let longest_streak = self.longest_streak(habit_id)?;

        let completion_rate = if counts.scheduled == 0 {
            0.0
        } else {
            counts.completed as f64 / counts.scheduled as f64 * 100.0
        };

        Ok(CompletionStats {
            habit_id: habit_id.clone(),
            completed: counts.completed,
            missed: counts.missed,
            scheduled: counts.scheduled,
            current_streak,
            longest_streak,
            completion_rate,
        })
    }

    /// Ledger totals across every habit
    pub fn overall_stats(&self) -> Result<OverallStats, EngineError> {
        let rows = self.store.all_records()?;

        let mut completed = 0;
        let mut missed = 0;
        let mut skipped = 0;
        for row in &rows {
            match row.status {
                CompletionStatus::Completed => completed += 1,
                CompletionStatus::Missed => missed += 1,
                CompletionStatus::Skipped => skipped += 1,
            }
        }

        let total_entries = rows.len() as u32;
        let distinct_habits = self.store.distinct_habit_ids()?.len() as u32;
        let completion_rate = if total_entries == 0 {
            0.0
        } else {
            completed as f64 / total_entries as f64 * 100.0
        };

        Ok(OverallStats {
            total_entries,
            completed,
            missed,
            skipped,
            distinct_habits,
            completion_rate,
        })
    }

    /// Rewrite every stored streak snapshot from the ledger itself
    ///
    /// For each habit in the ledger, replays its rows in chronological order
    /// through the run-length rule and writes the running value back into
    /// each row. All writes for the invocation happen in one transaction.
    /// Returns the number of snapshots rewritten.
    pub fn recalculate_all_streaks(&self) -> Result<usize, EngineError> {
        let mut updates = Vec::new();

        for habit_id in self.store.distinct_habit_ids()? {
            let rows = self.store.records_for_habit(&habit_id)?;
            for (date, snapshot) in streak::replay_snapshots(&rows) {
                updates.push((habit_id.clone(), date, snapshot));
            }
        }

        self.store.write_snapshots(&updates)?;

        tracing::info!("Recalculated {} streak snapshots", updates.len());
        Ok(updates.len())
    }
}

/// Wall clock used by streak walks and day loops
fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}
