/// Database migration management
///
/// This module handles creating and updating the SQLite database schema.
/// It ensures the database has all the required tables and indexes.

use rusqlite::Connection;
use crate::storage::StorageError;

/// Current database schema version
///
/// Increment this when you add new migrations
const CURRENT_VERSION: i32 = 1;

/// Initialize the database schema
///
/// This creates all required tables and indexes if they don't exist.
/// It also sets up the version tracking for future migrations.
pub fn initialize_database(conn: &Connection) -> Result<(), StorageError> {
    // Create version tracking table first
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        )",
        [],
    )?;

    // Check current version
    let current_version = get_current_version(conn)?;

    // Run migrations if needed
    if current_version < CURRENT_VERSION {
        run_migrations(conn, current_version)?;
        set_version(conn, CURRENT_VERSION)?;
    }

    Ok(())
}

/// Get the current database schema version
fn get_current_version(conn: &Connection) -> Result<i32, StorageError> {
    let version = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get::<_, i32>(0)
        })
        .unwrap_or(0); // Default to version 0 if no version record exists

    Ok(version)
}

/// Set the database schema version
fn set_version(conn: &Connection, version: i32) -> Result<(), StorageError> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

/// Run database migrations from the current version to the latest
fn run_migrations(conn: &Connection, from_version: i32) -> Result<(), StorageError> {
    if from_version < 1 {
        migration_v1(conn)?;
    }

    // Future migrations would go here:
    // if from_version < 2 {
    //     migration_v2(conn)?;
    // }

    Ok(())
}

/// Migration to version 1: Create initial tables
///
/// This creates the habits table and the completion ledger. The ledger's
/// primary key is the (habit_id, completion_date) pair, which enforces the
/// one-record-per-day invariant at the schema level, and ledger rows are
/// cascade-deleted with their habit.
fn migration_v1(conn: &Connection) -> Result<(), StorageError> {
    let tx = conn.unchecked_transaction()?;

    tx.execute(
        "CREATE TABLE IF NOT EXISTS habits (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT,
            pattern TEXT NOT NULL,
            start_date TEXT NOT NULL,
            end_date TEXT,
            scheduled_time TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    tx.execute(
        "CREATE TABLE IF NOT EXISTS completion_records (
            habit_id TEXT NOT NULL,
            completion_date TEXT NOT NULL,
            completed_at TEXT,
            status TEXT NOT NULL,
            streak_snapshot INTEGER NOT NULL DEFAULT 0,
            notes TEXT,
            PRIMARY KEY (habit_id, completion_date),
            FOREIGN KEY (habit_id) REFERENCES habits (id) ON DELETE CASCADE
        )",
        [],
    )?;

    // Index for cross-habit date scans (cleanup, overall stats)
    tx.execute(
        "CREATE INDEX IF NOT EXISTS idx_completion_records_date
         ON completion_records (completion_date)",
        [],
    )?;

    tx.commit()?;

    tracing::info!("Applied migration v1: Created initial database schema");
    Ok(())
}
