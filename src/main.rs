/// Main entry point for the habit-ledger CLI
///
/// This file sets up logging, parses command line arguments, opens the
/// SQLite-backed store, and dispatches to the command handlers in cli.rs.

use clap::{Parser, Subcommand};
use chrono::{NaiveDate, NaiveTime};
use std::path::PathBuf;
use tracing::info;

use habit_ledger::{cli, RecurrencePattern, SqliteStore, StreakEngine};

/// Get the default database path with robust fallback strategy
fn get_default_database_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
    // Try various locations in order of preference
    let potential_paths = [
        // 1. User's home directory (preferred)
        dirs::home_dir().map(|mut p| {
            p.push(".habit_ledger");
            p
        }),
        // 2. User's data directory (platform-specific)
        dirs::data_dir().map(|mut p| {
            p.push("habit_ledger");
            p
        }),
        // 3. User's config directory
        dirs::config_dir().map(|mut p| {
            p.push("habit_ledger");
            p
        }),
        // 4. Current working directory (last resort)
        std::env::current_dir().ok().map(|mut p| {
            p.push(".habit_ledger");
            p
        }),
    ];

    for potential_path in potential_paths.iter().flatten() {
        // Try to create the directory
        if let Ok(()) = std::fs::create_dir_all(potential_path) {
            // Test if we can write to this directory
            let test_file = potential_path.join(".test_write");
            if std::fs::write(&test_file, "test").is_ok() {
                let _ = std::fs::remove_file(&test_file); // Clean up test file
                let mut db_path = potential_path.clone();
                db_path.push("habits.db");
                return Ok(db_path);
            }
        }
    }

    // Ultimate fallback: use a temporary directory
    let mut temp_path = std::env::temp_dir();
    temp_path.push("habit_ledger");
    std::fs::create_dir_all(&temp_path)?;
    temp_path.push("habits.db");

    tracing::warn!("Using temporary directory for database: {}", temp_path.display());
    Ok(temp_path)
}

/// Command line arguments for the habit ledger
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the SQLite database file
    /// If not provided, uses a default location in the user's home directory
    #[arg(long)]
    database: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable verbose output (implies debug)
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a new habit
    Add {
        /// Display name for the habit
        name: String,
        /// Recurrence: everyday, weekdays, weekends, a weekday name, or a
        /// comma-separated weekday list (mon,wed,fri)
        #[arg(long, default_value = "everyday", value_parser = cli::parse_pattern)]
        pattern: RecurrencePattern,
        /// Optional description
        #[arg(long)]
        description: Option<String>,
        /// First eligible day (defaults to today)
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Inclusive last eligible day
        #[arg(long)]
        end: Option<NaiveDate>,
        /// Scheduled time of day, anchors the streak grace period
        #[arg(long, default_value = "09:00:00")]
        time: NaiveTime,
    },
    /// List habits with their current streaks
    List,
    /// Mark a habit completed for a day
    Done {
        /// Habit id or name
        habit: String,
        /// Which day (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Notes for the day
        #[arg(long)]
        notes: Option<String>,
    },
    /// Mark a habit missed for a day
    Miss {
        /// Habit id or name
        habit: String,
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Mark a day as deliberately skipped (does not break the streak)
    Skip {
        /// Habit id or name
        habit: String,
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Show a habit's statistics report as JSON
    Status {
        /// Habit id or name
        habit: String,
    },
    /// Show cross-habit ledger totals as JSON
    Overview,
    /// Rewrite all stored streak snapshots from the ledger
    Recalc,
    /// Delete ledger rows older than the retention window
    Cleanup {
        /// How many days of history to keep
        #[arg(long, default_value_t = 365)]
        keep_days: u32,
    },
    /// Delete a habit and its records
    Remove {
        /// Habit id or name
        habit: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Set up logging based on command line flags
    let log_level = if args.verbose {
        "debug"
    } else if args.debug {
        "info"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(format!("habit_ledger={}", log_level))
        .with_writer(std::io::stderr) // Send logs to stderr, not stdout
        .init();

    // Determine database path
    let db_path = match args.database {
        Some(path) => {
            // Validate and prepare the provided path
            if let Some(parent) = path.parent() {
                if !parent.exists() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            path
        }
        None => {
            // Use a robust default path strategy
            get_default_database_path()?
        }
    };

    info!("Using database at: {}", db_path.display());

    let engine = StreakEngine::new(SqliteStore::new(db_path)?);

    match args.command {
        Command::Add {
            name,
            pattern,
            description,
            start,
            end,
            time,
        } => cli::add(&engine, name, description, pattern, start, end, time)?,
        Command::List => cli::list(&engine)?,
        Command::Done { habit, date, notes } => cli::done(&engine, &habit, date, notes)?,
        Command::Miss { habit, date, notes } => cli::miss(&engine, &habit, date, notes)?,
        Command::Skip { habit, date, notes } => cli::skip(&engine, &habit, date, notes)?,
        Command::Status { habit } => cli::status(&engine, &habit)?,
        Command::Overview => cli::overview(&engine)?,
        Command::Recalc => cli::recalc(&engine)?,
        Command::Cleanup { keep_days } => cli::cleanup(&engine, keep_days)?,
        Command::Remove { habit } => cli::remove(&engine, &habit)?,
    }

    Ok(())
}
