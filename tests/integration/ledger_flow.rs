/// End-to-end tests over a temp-file SQLite database
use habit_ledger::*;
use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use tempfile::NamedTempFile;

fn nine_am() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap()
}

fn today() -> NaiveDate {
    Utc::now().naive_utc().date()
}

#[cfg(test)]
mod ledger_flow_tests {
    use super::*;

    #[test]
    fn test_full_ledger_workflow() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let engine = StreakEngine::new(
            SqliteStore::new(temp_file.path().to_path_buf()).expect("Failed to create store"),
        );

        let habit = Habit::new(
            "Morning Run".to_string(),
            None,
            RecurrencePattern::Everyday,
            today() - Duration::days(5),
            None,
            nine_am(),
        )
        .unwrap();
        engine.store().create_habit(&habit).unwrap();

        // Three-day run, a miss, then a recovery
        engine.mark_completed(&habit.id, today() - Duration::days(5), None).unwrap();
        engine.mark_completed(&habit.id, today() - Duration::days(4), None).unwrap();
        engine.mark_completed(&habit.id, today() - Duration::days(3), None).unwrap();
        engine.mark_missed(&habit.id, today() - Duration::days(2), None).unwrap();
        engine.mark_completed(&habit.id, today() - Duration::days(1), None).unwrap();

        assert_eq!(
            engine.current_streak(&habit.id, today() - Duration::days(1)).unwrap(),
            1
        );
        assert_eq!(engine.longest_streak(&habit.id).unwrap(), 3);

        let stats = engine.completion_stats(&habit.id).unwrap();
        assert_eq!(stats.completed, 4);
        assert_eq!(stats.missed, 1);
        // Today is still undecided, so five past days were scheduled plus today
        assert_eq!(stats.scheduled, 6);
        assert_eq!(stats.longest_streak, 3);
    }

    #[test]
    fn test_database_persistence_across_reopen() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let db_path = temp_file.path().to_path_buf();

        let habit = Habit::new(
            "Read".to_string(),
            None,
            RecurrencePattern::Everyday,
            today() - Duration::days(3),
            None,
            nine_am(),
        )
        .unwrap();

        {
            let engine = StreakEngine::new(SqliteStore::new(db_path.clone()).unwrap());
            engine.store().create_habit(&habit).unwrap();
            engine.mark_completed(&habit.id, today() - Duration::days(1), None).unwrap();
        }

        // Reopen the same database file
        let engine = StreakEngine::new(SqliteStore::new(db_path).unwrap());
        let loaded = engine.store().habit(&habit.id).unwrap();
        assert_eq!(loaded.name, "Read");

        let record = engine
            .record_for(&habit.id, today() - Duration::days(1))
            .unwrap()
            .expect("record should persist");
        assert_eq!(record.status, CompletionStatus::Completed);
    }

    #[test]
    fn test_recalculate_over_multiple_habits() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let engine = StreakEngine::new(
            SqliteStore::new(temp_file.path().to_path_buf()).unwrap(),
        );

        let mut habits = Vec::new();
        for name in ["One", "Two"] {
            let habit = Habit::new(
                name.to_string(),
                None,
                RecurrencePattern::Everyday,
                today() - Duration::days(6),
                None,
                nine_am(),
            )
            .unwrap();
            engine.store().create_habit(&habit).unwrap();
            engine.mark_completed(&habit.id, today() - Duration::days(3), None).unwrap();
            engine.mark_completed(&habit.id, today() - Duration::days(2), None).unwrap();
            habits.push(habit);
        }

        let rewritten = engine.recalculate_all_streaks().unwrap();
        assert_eq!(rewritten, 4);

        for habit in &habits {
            let snapshots: Vec<u32> = engine
                .store()
                .records_for_habit(&habit.id)
                .unwrap()
                .iter()
                .map(|r| r.streak_snapshot)
                .collect();
            assert_eq!(snapshots, vec![1, 2]);
        }
    }

    #[test]
    fn test_store_implements_the_trait_object() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let store = SqliteStore::new(temp_file.path().to_path_buf())
            .expect("Failed to create store");

        let _: &dyn HabitStore = &store;
    }
}
