/// Streak calculation algorithms
///
/// This module holds the pure streak logic: the backward walk that computes
/// the current streak as of a reference date (with the same-day grace
/// period), the forward run-length scan for the longest streak, and the
/// snapshot replay used by bulk recompute. Everything here takes an explicit
/// clock so the grace period is testable without waiting for midnight.

use std::collections::HashMap;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use crate::domain::{CompletionRecord, CompletionStatus, Habit};

/// Upper bound on the backward walk so a pathological window never scans
/// unbounded history.
const MAX_WALK_DAYS: u32 = 365;

/// How long after the habit's scheduled moment an unlogged current day is
/// tolerated before the streak counts as broken.
const GRACE_WINDOW_HOURS: i64 = 24;

/// Index a habit's records by calendar day for the backward walk
///
/// With the (habit, date) uniqueness key there is at most one record per day;
/// later duplicates (which the store prevents) would simply win here.
pub fn by_date(records: &[CompletionRecord]) -> HashMap<NaiveDate, CompletionStatus> {
    records.iter().map(|r| (r.date, r.status)).collect()
}

/// Compute the current streak for a habit as of a reference date
///
/// Walks backward from `as_of` one calendar day at a time, at most
/// [`MAX_WALK_DAYS`] iterations:
/// - days before the habit's start date end the walk;
/// - days the habit is not due on are skipped without touching the count;
/// - a completed day increments the count, a missed day breaks the streak,
///   a skipped day is inert;
/// - an unrecorded due day breaks the streak, except when it is the current
///   day and `now` is still inside the grace window after the habit's
///   scheduled moment, in which case the day is tolerated and the walk
///   continues.
///
/// Records on non-due days are never consulted; the due-day skip happens
/// before the ledger lookup.
pub fn current_streak(
    habit: &Habit,
    records: &HashMap<NaiveDate, CompletionStatus>,
    as_of: NaiveDate,
    now: NaiveDateTime,
) -> u32 {
    let today = now.date();
    let mut count = 0;
    let mut check = as_of;

    for _ in 0..MAX_WALK_DAYS {
        if check < habit.start_date {
            break;
        }

        if !habit.is_due(check) {
            check = check - Duration::days(1);
            continue;
        }

        match records.get(&check) {
            Some(CompletionStatus::Completed) => {
                count += 1;
            }
            Some(CompletionStatus::Missed) => break,
            Some(CompletionStatus::Skipped) => {
                // Inert: neither breaks nor extends
            }
            None => {
                if check > as_of {
                    // Defensive: the walk never moves forward, but a future
                    // day must not break the streak either way.
                } else if check == today {
                    let scheduled_moment = check.and_time(habit.scheduled_time);
                    if now < scheduled_moment + Duration::hours(GRACE_WINDOW_HOURS) {
                        // Not logged yet, still inside the grace window
                    } else {
                        break;
                    }
                } else {
                    // A past due day with no record breaks the streak
                    break;
                }
            }
        }

        check = check - Duration::days(1);
    }

    count
}

/// Compute the streak a completion on `date` achieves, inclusive of itself
///
/// This is the value stored in a new record's streak snapshot: the backward
/// walk run as if the completion were already in the ledger.
pub fn streak_with_completion(
    habit: &Habit,
    records: &HashMap<NaiveDate, CompletionStatus>,
    date: NaiveDate,
    now: NaiveDateTime,
) -> u32 {
    let mut with_mark = records.clone();
    with_mark.insert(date, CompletionStatus::Completed);
    current_streak(habit, &with_mark, date, now)
}

/// Compute the longest streak over a habit's raw ledger rows
///
/// This variant deliberately ignores the due-day predicate: it scans the
/// records in ascending date order and counts consecutive completed rows,
/// resetting on missed and passing over skipped. The maximum run observed
/// is the longest streak.
pub fn longest_streak(records: &[CompletionRecord]) -> u32 {
    let mut sorted: Vec<&CompletionRecord> = records.iter().collect();
    sorted.sort_by_key(|r| r.date);

    let mut longest = 0;
    let mut run = 0;

    for record in sorted {
        match record.status {
            CompletionStatus::Completed => {
                run += 1;
                longest = longest.max(run);
            }
            CompletionStatus::Missed => {
                run = 0;
            }
            CompletionStatus::Skipped => {
                // Inert
            }
        }
    }

    longest
}

/// Replay the run-length counter over a habit's rows in ascending order
///
/// Returns the snapshot value each row should carry: completed rows get the
/// incremented running value, missed rows get zero, skipped rows keep the
/// running value unchanged. Bulk recompute writes these back to repair
/// drifted snapshots.
pub fn replay_snapshots(records: &[CompletionRecord]) -> Vec<(NaiveDate, u32)> {
    let mut sorted: Vec<&CompletionRecord> = records.iter().collect();
    sorted.sort_by_key(|r| r.date);

    let mut run = 0;
    let mut snapshots = Vec::with_capacity(sorted.len());

    for record in sorted {
        match record.status {
            CompletionStatus::Completed => {
                run += 1;
            }
            CompletionStatus::Missed => {
                run = 0;
            }
            CompletionStatus::Skipped => {}
        }
        snapshots.push((record.date, run));
    }

    snapshots
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use crate::domain::RecurrencePattern;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(d: NaiveDate, h: u32, min: u32) -> NaiveDateTime {
        d.and_time(NaiveTime::from_hms_opt(h, min, 0).unwrap())
    }

    fn everyday_habit(start: NaiveDate) -> Habit {
        Habit::new(
            "Test".to_string(),
            None,
            RecurrencePattern::Everyday,
            start,
            None,
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        )
        .unwrap()
    }

    fn completed(habit: &Habit, d: NaiveDate) -> CompletionRecord {
        CompletionRecord::completed(habit.id.clone(), d, 0, None).unwrap()
    }

    fn missed(habit: &Habit, d: NaiveDate) -> CompletionRecord {
        CompletionRecord::missed(habit.id.clone(), d, None).unwrap()
    }

    fn skipped(habit: &Habit, d: NaiveDate) -> CompletionRecord {
        CompletionRecord::skipped(habit.id.clone(), d, None).unwrap()
    }

    #[test]
    fn test_empty_ledger_today_in_grace() {
        let start = date(2024, 1, 1);
        let habit = everyday_habit(start);
        let records = HashMap::new();

        // Today unlogged but inside the grace window: nothing before the
        // start date, so the streak is simply zero without being "broken"
        let streak = current_streak(&habit, &records, start, at(start, 10, 0));
        assert_eq!(streak, 0);
    }

    #[test]
    fn test_miss_then_recovery_scenario() {
        // Everyday habit started Jan 1. Completed Jan 1-3, missed Jan 4,
        // completed Jan 5.
        let habit = everyday_habit(date(2024, 1, 1));
        let records = vec![
            completed(&habit, date(2024, 1, 1)),
            completed(&habit, date(2024, 1, 2)),
            completed(&habit, date(2024, 1, 3)),
            missed(&habit, date(2024, 1, 4)),
            completed(&habit, date(2024, 1, 5)),
        ];
        let map = by_date(&records);
        let now = at(date(2024, 1, 5), 20, 0);

        assert_eq!(current_streak(&habit, &map, date(2024, 1, 5), now), 1);
        assert_eq!(current_streak(&habit, &map, date(2024, 1, 3), now), 3);
        assert_eq!(longest_streak(&records), 3);
    }

    #[test]
    fn test_completing_next_due_day_adds_one() {
        let habit = everyday_habit(date(2024, 1, 1));
        let mut records = vec![
            completed(&habit, date(2024, 1, 1)),
            completed(&habit, date(2024, 1, 2)),
            completed(&habit, date(2024, 1, 3)),
        ];
        let now = at(date(2024, 1, 4), 8, 0);

        let before = current_streak(&habit, &by_date(&records), date(2024, 1, 3), now);
        records.push(completed(&habit, date(2024, 1, 4)));
        let after = current_streak(&habit, &by_date(&records), date(2024, 1, 4), now);

        assert_eq!(after, before + 1);
    }

    #[test]
    fn test_streak_with_completion_is_inclusive() {
        let habit = everyday_habit(date(2024, 1, 1));
        let records = vec![
            completed(&habit, date(2024, 1, 1)),
            completed(&habit, date(2024, 1, 2)),
        ];
        let map = by_date(&records);
        let now = at(date(2024, 1, 3), 12, 0);

        // Jan 3 not yet marked: the completion it would achieve counts itself
        assert_eq!(streak_with_completion(&habit, &map, date(2024, 1, 3), now), 3);
        // After a gap the achieved streak restarts at 1
        assert_eq!(
            streak_with_completion(&habit, &map, date(2024, 1, 5), at(date(2024, 1, 5), 12, 0)),
            1
        );
    }

    #[test]
    fn test_unlogged_today_inside_grace_window() {
        let habit = everyday_habit(date(2024, 1, 1));
        let records = vec![
            completed(&habit, date(2024, 1, 1)),
            completed(&habit, date(2024, 1, 2)),
            completed(&habit, date(2024, 1, 3)),
        ];
        let map = by_date(&records);

        // Jan 4 is "today", unlogged, 10:00 is inside 09:00 + 24h
        let now = at(date(2024, 1, 4), 10, 0);
        assert_eq!(current_streak(&habit, &map, date(2024, 1, 4), now), 3);
    }

    #[test]
    fn test_unlogged_day_after_grace_window_breaks() {
        let habit = everyday_habit(date(2024, 1, 1));
        let records = vec![
            completed(&habit, date(2024, 1, 1)),
            completed(&habit, date(2024, 1, 2)),
            completed(&habit, date(2024, 1, 3)),
        ];
        let map = by_date(&records);

        // The clock has moved past Jan 4's grace window (Jan 5 10:00 >
        // Jan 4 09:00 + 24h); Jan 4 is now an unlogged past due day
        let now = at(date(2024, 1, 5), 10, 0);
        assert_eq!(current_streak(&habit, &map, date(2024, 1, 4), now), 0);
    }

    #[test]
    fn test_skipped_days_are_inert() {
        let habit = everyday_habit(date(2024, 1, 1));
        let records = vec![
            completed(&habit, date(2024, 1, 1)),
            completed(&habit, date(2024, 1, 2)),
            skipped(&habit, date(2024, 1, 3)),
            completed(&habit, date(2024, 1, 4)),
        ];
        let map = by_date(&records);
        let now = at(date(2024, 1, 4), 20, 0);

        // The skip neither breaks nor counts
        assert_eq!(current_streak(&habit, &map, date(2024, 1, 4), now), 3);
        assert_eq!(longest_streak(&records), 3);
    }

    #[test]
    fn test_non_due_days_are_skipped_by_the_walk() {
        // Weekday habit starting Monday 2024-06-03: completing Thu + Fri and
        // asking on Monday evening (after completing Monday) must carry the
        // streak across the weekend
        let habit = Habit::new(
            "Weekday".to_string(),
            None,
            RecurrencePattern::Weekdays,
            date(2024, 6, 3),
            None,
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        )
        .unwrap();
        let records = vec![
            completed(&habit, date(2024, 6, 6)),  // Thursday
            completed(&habit, date(2024, 6, 7)),  // Friday
            completed(&habit, date(2024, 6, 10)), // Monday
        ];
        let map = by_date(&records);
        let now = at(date(2024, 6, 10), 20, 0);

        assert_eq!(current_streak(&habit, &map, date(2024, 6, 10), now), 3);
    }

    #[test]
    fn test_records_on_non_due_days_are_ignored() {
        // A weekend record left over from a pattern change must not feed the
        // walk of a weekday habit
        let habit = Habit::new(
            "Weekday".to_string(),
            None,
            RecurrencePattern::Weekdays,
            date(2024, 6, 3),
            None,
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        )
        .unwrap();
        let records = vec![
            completed(&habit, date(2024, 6, 7)), // Friday
            missed(&habit, date(2024, 6, 8)),    // Saturday: not due, ignored
            completed(&habit, date(2024, 6, 10)), // Monday
        ];
        let map = by_date(&records);
        let now = at(date(2024, 6, 10), 20, 0);

        assert_eq!(current_streak(&habit, &map, date(2024, 6, 10), now), 2);
    }

    #[test]
    fn test_walk_stops_at_start_date() {
        let habit = everyday_habit(date(2024, 1, 3));
        let records = vec![
            completed(&habit, date(2024, 1, 3)),
            completed(&habit, date(2024, 1, 4)),
        ];
        let map = by_date(&records);
        let now = at(date(2024, 1, 4), 20, 0);

        // Nothing before the start date can extend or break the streak
        assert_eq!(current_streak(&habit, &map, date(2024, 1, 4), now), 2);
    }

    #[test]
    fn test_longest_streak_ignores_skips_and_resets_on_miss() {
        let habit = everyday_habit(date(2024, 1, 1));
        let records = vec![
            completed(&habit, date(2024, 1, 1)),
            completed(&habit, date(2024, 1, 2)),
            skipped(&habit, date(2024, 1, 3)),
            completed(&habit, date(2024, 1, 4)),
            missed(&habit, date(2024, 1, 5)),
            completed(&habit, date(2024, 1, 6)),
        ];

        assert_eq!(longest_streak(&records), 3);
    }

    #[test]
    fn test_longest_streak_empty() {
        assert_eq!(longest_streak(&[]), 0);
    }

    #[test]
    fn test_replay_snapshots_rule() {
        let habit = everyday_habit(date(2024, 1, 1));
        let records = vec![
            completed(&habit, date(2024, 1, 1)),
            completed(&habit, date(2024, 1, 2)),
            missed(&habit, date(2024, 1, 3)),
            skipped(&habit, date(2024, 1, 4)),
            completed(&habit, date(2024, 1, 5)),
        ];

        let snapshots = replay_snapshots(&records);
        assert_eq!(
            snapshots,
            vec![
                (date(2024, 1, 1), 1),
                (date(2024, 1, 2), 2),
                (date(2024, 1, 3), 0),
                (date(2024, 1, 4), 0),
                (date(2024, 1, 5), 1),
            ]
        );
    }

    #[test]
    fn test_replay_snapshots_sorts_out_of_order_input() {
        let habit = everyday_habit(date(2024, 1, 1));
        let records = vec![
            completed(&habit, date(2024, 1, 2)),
            completed(&habit, date(2024, 1, 1)),
        ];

        let snapshots = replay_snapshots(&records);
        assert_eq!(snapshots, vec![(date(2024, 1, 1), 1), (date(2024, 1, 2), 2)]);
    }

    #[test]
    fn test_walk_is_bounded() {
        // A habit whose window closed long ago: every day between as_of and
        // the window is non-due, so only the 365-day cap ends the walk
        let habit = Habit::new(
            "Ancient".to_string(),
            None,
            RecurrencePattern::Everyday,
            date(2020, 1, 1),
            Some(date(2020, 1, 10)),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        )
        .unwrap();
        let map = HashMap::new();
        let now = at(date(2024, 6, 1), 12, 0);

        assert_eq!(current_streak(&habit, &map, date(2024, 6, 1), now), 0);
    }
}
