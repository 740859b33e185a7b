/// SQLite implementation of the habit storage interface
///
/// This module provides the concrete SQLite implementation for storing
/// and retrieving habits and completion records. It handles all SQL queries
/// and data conversion; dates cross this boundary as %Y-%m-%d strings and
/// are NaiveDate everywhere above it.

use std::path::PathBuf;
use rusqlite::{Connection, Row, params};
use chrono::{NaiveDate, NaiveTime};
use serde_json;

use crate::domain::{CompletionRecord, CompletionStatus, Habit, HabitId};
use crate::storage::{StorageError, HabitStore, migrations};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";

/// SQLite-based storage implementation
///
/// This struct holds a connection to the SQLite database and implements
/// all the storage operations defined in the HabitStore trait.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Create a new SQLite storage instance
    ///
    /// This opens the database file and runs any necessary migrations
    /// to ensure the schema is up to date.
    pub fn new(db_path: PathBuf) -> Result<Self, StorageError> {
        let conn = Connection::open(&db_path)
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;

        Self::initialize(conn, Some(&db_path))
    }

    /// Create an in-memory store, mainly for tests
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;

        Self::initialize(conn, None)
    }

    fn initialize(conn: Connection, db_path: Option<&PathBuf>) -> Result<Self, StorageError> {
        // Cascade deletes from habits to their ledger rows need this pragma
        conn.execute("PRAGMA foreign_keys = ON", [])
            .map_err(|e| StorageError::Connection(format!("Failed to enable foreign keys: {}", e)))?;

        migrations::initialize_database(&conn)?;

        match db_path {
            Some(path) => tracing::info!("SQLite storage initialized at: {:?}", path),
            None => tracing::debug!("In-memory SQLite storage initialized"),
        }

        Ok(Self { conn })
    }

    /// Map a habits table row into a Habit
    fn habit_from_row(row: &Row<'_>) -> Result<Habit, rusqlite::Error> {
        let id_str: String = row.get(0)?;
        let id = HabitId::from_string(&id_str).map_err(|_| {
            rusqlite::Error::InvalidColumnType(0, "Invalid UUID".to_string(), rusqlite::types::Type::Text)
        })?;

        let pattern_json: String = row.get(3)?;
        let pattern = serde_json::from_str(&pattern_json).map_err(|_| {
            rusqlite::Error::InvalidColumnType(3, "Invalid pattern".to_string(), rusqlite::types::Type::Text)
        })?;

        let start_date_str: String = row.get(4)?;
        let start_date = NaiveDate::parse_from_str(&start_date_str, DATE_FORMAT).map_err(|_| {
            rusqlite::Error::InvalidColumnType(4, "Invalid date".to_string(), rusqlite::types::Type::Text)
        })?;

        let end_date_str: Option<String> = row.get(5)?;
        let end_date = match end_date_str {
            Some(s) => Some(NaiveDate::parse_from_str(&s, DATE_FORMAT).map_err(|_| {
                rusqlite::Error::InvalidColumnType(5, "Invalid date".to_string(), rusqlite::types::Type::Text)
            })?),
            None => None,
        };

        let time_str: String = row.get(6)?;
        let scheduled_time = NaiveTime::parse_from_str(&time_str, TIME_FORMAT).map_err(|_| {
            rusqlite::Error::InvalidColumnType(6, "Invalid time".to_string(), rusqlite::types::Type::Text)
        })?;

        let created_at_str: String = row.get(7)?;
        let created_at = chrono::DateTime::parse_from_rfc3339(&created_at_str)
            .map_err(|_| {
                rusqlite::Error::InvalidColumnType(7, "Invalid datetime".to_string(), rusqlite::types::Type::Text)
            })?
            .with_timezone(&chrono::Utc);

        Ok(Habit::from_existing(
            id,
            row.get(1)?, // name
            row.get(2)?, // description
            pattern,
            start_date,
            end_date,
            scheduled_time,
            created_at,
        ))
    }

    /// Map a completion_records table row into a CompletionRecord
    fn record_from_row(row: &Row<'_>) -> Result<CompletionRecord, rusqlite::Error> {
        let habit_id_str: String = row.get(0)?;
        let habit_id = HabitId::from_string(&habit_id_str).map_err(|_| {
            rusqlite::Error::InvalidColumnType(0, "Invalid UUID".to_string(), rusqlite::types::Type::Text)
        })?;

        let date_str: String = row.get(1)?;
        let date = NaiveDate::parse_from_str(&date_str, DATE_FORMAT).map_err(|_| {
            rusqlite::Error::InvalidColumnType(1, "Invalid date".to_string(), rusqlite::types::Type::Text)
        })?;

        let completed_at_str: Option<String> = row.get(2)?;
        let completed_at = match completed_at_str {
            Some(s) => Some(
                chrono::DateTime::parse_from_rfc3339(&s)
                    .map_err(|_| {
                        rusqlite::Error::InvalidColumnType(2, "Invalid datetime".to_string(), rusqlite::types::Type::Text)
                    })?
                    .with_timezone(&chrono::Utc),
            ),
            None => None,
        };

        let status_str: String = row.get(3)?;
        let status = CompletionStatus::parse(&status_str).ok_or_else(|| {
            rusqlite::Error::InvalidColumnType(3, "Invalid status".to_string(), rusqlite::types::Type::Text)
        })?;

        Ok(CompletionRecord::from_existing(
            habit_id,
            date,
            completed_at,
            status,
            row.get(4)?, // streak_snapshot
            row.get(5)?, // notes
        ))
    }
}

impl HabitStore for SqliteStore {
    /// Create a new habit in the database
    fn create_habit(&self, habit: &Habit) -> Result<(), StorageError> {
        let pattern_json = serde_json::to_string(&habit.pattern)?;

        self.conn.execute(
            "INSERT INTO habits (
                id, name, description, pattern, start_date, end_date, scheduled_time, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                habit.id.to_string(),
                habit.name,
                habit.description,
                pattern_json,
                habit.start_date.format(DATE_FORMAT).to_string(),
                habit.end_date.map(|d| d.format(DATE_FORMAT).to_string()),
                habit.scheduled_time.format(TIME_FORMAT).to_string(),
                habit.created_at.to_rfc3339(),
            ],
        )?;

        tracing::debug!("Created habit: {} ({})", habit.name, habit.id.to_string());
        Ok(())
    }

    /// Get a habit by its ID
    fn habit(&self, habit_id: &HabitId) -> Result<Habit, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, description, pattern, start_date, end_date, scheduled_time, created_at
             FROM habits WHERE id = ?1"
        )?;

        let result = stmt.query_row(params![habit_id.to_string()], Self::habit_from_row);

        match result {
            Ok(habit) => Ok(habit),
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                Err(StorageError::HabitNotFound {
                    habit_id: habit_id.to_string(),
                })
            },
            Err(e) => Err(StorageError::Query(e)),
        }
    }

    /// Update an existing habit
    fn update_habit(&self, habit: &Habit) -> Result<(), StorageError> {
        let pattern_json = serde_json::to_string(&habit.pattern)?;

        let rows_affected = self.conn.execute(
            "UPDATE habits SET
                name = ?2,
                description = ?3,
                pattern = ?4,
                start_date = ?5,
                end_date = ?6,
                scheduled_time = ?7
             WHERE id = ?1",
            params![
                habit.id.to_string(),
                habit.name,
                habit.description,
                pattern_json,
                habit.start_date.format(DATE_FORMAT).to_string(),
                habit.end_date.map(|d| d.format(DATE_FORMAT).to_string()),
                habit.scheduled_time.format(TIME_FORMAT).to_string(),
            ],
        )?;

        if rows_affected == 0 {
            return Err(StorageError::HabitNotFound {
                habit_id: habit.id.to_string(),
            });
        }

        tracing::debug!("Updated habit: {} ({})", habit.name, habit.id.to_string());
        Ok(())
    }

    /// Delete a habit; the foreign key cascades to its ledger rows
    fn delete_habit(&self, habit_id: &HabitId) -> Result<(), StorageError> {
        let rows_affected = self.conn.execute(
            "DELETE FROM habits WHERE id = ?1",
            params![habit_id.to_string()],
        )?;

        if rows_affected == 0 {
            return Err(StorageError::HabitNotFound {
                habit_id: habit_id.to_string(),
            });
        }

        tracing::debug!("Deleted habit: {}", habit_id.to_string());
        Ok(())
    }

    /// List all habits, newest first
    fn list_habits(&self) -> Result<Vec<Habit>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, description, pattern, start_date, end_date, scheduled_time, created_at
             FROM habits ORDER BY created_at DESC"
        )?;

        let habit_iter = stmt.query_map([], Self::habit_from_row)?;

        let mut habits = Vec::new();
        for habit in habit_iter {
            habits.push(habit?);
        }

        Ok(habits)
    }

    /// Insert or update the record for (habit_id, date)
    ///
    /// A single INSERT .. ON CONFLICT statement, so the write is atomic and
    /// the primary key keeps the one-record-per-day invariant even on crash.
    fn upsert_record(&self, record: &CompletionRecord) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO completion_records (
                habit_id, completion_date, completed_at, status, streak_snapshot, notes
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT (habit_id, completion_date) DO UPDATE SET
                completed_at = excluded.completed_at,
                status = excluded.status,
                streak_snapshot = excluded.streak_snapshot,
                notes = excluded.notes",
            params![
                record.habit_id.to_string(),
                record.date.format(DATE_FORMAT).to_string(),
                record.completed_at.map(|t| t.to_rfc3339()),
                record.status.as_str(),
                record.streak_snapshot,
                record.notes,
            ],
        )?;

        tracing::debug!(
            "Upserted {} record for habit {} on {}",
            record.status.as_str(),
            record.habit_id.to_string(),
            record.date
        );
        Ok(())
    }

    /// Get the record for a habit on a specific day, if any
    fn record(
        &self,
        habit_id: &HabitId,
        date: NaiveDate,
    ) -> Result<Option<CompletionRecord>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT habit_id, completion_date, completed_at, status, streak_snapshot, notes
             FROM completion_records WHERE habit_id = ?1 AND completion_date = ?2"
        )?;

        let result = stmt.query_row(
            params![habit_id.to_string(), date.format(DATE_FORMAT).to_string()],
            Self::record_from_row,
        );

        match result {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(StorageError::Query(e)),
        }
    }

    /// Get a habit's records within an inclusive date range, ascending
    fn records_in_range(
        &self,
        habit_id: &HabitId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<CompletionRecord>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT habit_id, completion_date, completed_at, status, streak_snapshot, notes
             FROM completion_records
             WHERE habit_id = ?1 AND completion_date BETWEEN ?2 AND ?3
             ORDER BY completion_date ASC"
        )?;

        let record_iter = stmt.query_map(
            params![
                habit_id.to_string(),
                start.format(DATE_FORMAT).to_string(),
                end.format(DATE_FORMAT).to_string(),
            ],
            Self::record_from_row,
        )?;

        let mut records = Vec::new();
        for record in record_iter {
            records.push(record?);
        }

        Ok(records)
    }

    /// Get all records for a habit in ascending date order
    fn records_for_habit(&self, habit_id: &HabitId) -> Result<Vec<CompletionRecord>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT habit_id, completion_date, completed_at, status, streak_snapshot, notes
             FROM completion_records WHERE habit_id = ?1
             ORDER BY completion_date ASC"
        )?;

        let record_iter = stmt.query_map(params![habit_id.to_string()], Self::record_from_row)?;

        let mut records = Vec::new();
        for record in record_iter {
            records.push(record?);
        }

        Ok(records)
    }

    /// Get every ledger row across all habits
    fn all_records(&self) -> Result<Vec<CompletionRecord>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT habit_id, completion_date, completed_at, status, streak_snapshot, notes
             FROM completion_records ORDER BY habit_id, completion_date ASC"
        )?;

        let record_iter = stmt.query_map([], Self::record_from_row)?;

        let mut records = Vec::new();
        for record in record_iter {
            records.push(record?);
        }

        Ok(records)
    }

    /// Get the ids of all habits that have at least one ledger row
    fn distinct_habit_ids(&self) -> Result<Vec<HabitId>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT habit_id FROM completion_records"
        )?;

        let id_iter = stmt.query_map([], |row| {
            let id_str: String = row.get(0)?;
            HabitId::from_string(&id_str).map_err(|_| {
                rusqlite::Error::InvalidColumnType(0, "Invalid UUID".to_string(), rusqlite::types::Type::Text)
            })
        })?;

        let mut ids = Vec::new();
        for id in id_iter {
            ids.push(id?);
        }

        Ok(ids)
    }

    /// Delete all records for a habit
    fn delete_records_for_habit(&self, habit_id: &HabitId) -> Result<usize, StorageError> {
        let removed = self.conn.execute(
            "DELETE FROM completion_records WHERE habit_id = ?1",
            params![habit_id.to_string()],
        )?;

        tracing::debug!("Deleted {} records for habit {}", removed, habit_id.to_string());
        Ok(removed)
    }

    /// Delete records older than the cutoff date (exclusive)
    fn delete_records_older_than(&self, cutoff: NaiveDate) -> Result<usize, StorageError> {
        let removed = self.conn.execute(
            "DELETE FROM completion_records WHERE completion_date < ?1",
            params![cutoff.format(DATE_FORMAT).to_string()],
        )?;

        tracing::debug!("Deleted {} records older than {}", removed, cutoff);
        Ok(removed)
    }

    /// Rewrite streak snapshots for the given keys inside one transaction
    fn write_snapshots(
        &self,
        updates: &[(HabitId, NaiveDate, u32)],
    ) -> Result<(), StorageError> {
        let tx = self.conn.unchecked_transaction()?;

        {
            let mut stmt = tx.prepare(
                "UPDATE completion_records SET streak_snapshot = ?3
                 WHERE habit_id = ?1 AND completion_date = ?2"
            )?;

            for (habit_id, date, snapshot) in updates {
                stmt.execute(params![
                    habit_id.to_string(),
                    date.format(DATE_FORMAT).to_string(),
                    snapshot,
                ])?;
            }
        }

        tx.commit()?;

        tracing::debug!("Rewrote {} streak snapshots", updates.len());
        Ok(())
    }
}
