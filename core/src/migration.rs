//! Repair for day rows keyed by UTC midnight instead of local midnight.
//!
//! Older builds derived the day key from a UTC timestamp, so anyone west of
//! Greenwich logging in the evening got tomorrow's date. The symptom is a
//! cluster of recent days exactly one day ahead of today's local date.

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::dates::{diff_days, format_date_local, parse_date_local};
use crate::models::Day;
use crate::store::LedgerStore;

/// How many of the most recent days the detector looks at.
pub const SAMPLE_SIZE: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    pub days_scanned: usize,
    /// Rows whose date was rewritten in place.
    pub days_moved: usize,
    /// Rows folded into an existing row for the corrected date.
    pub days_merged: usize,
    pub entries_reassigned: usize,
}

impl MigrationReport {
    #[must_use]
    pub fn changed(&self) -> bool {
        self.days_moved > 0 || self.days_merged > 0
    }
}

/// Heuristic check: more than half of the most recent days sit exactly one
/// day after `today`.
///
/// Best effort. Storage errors are logged and read as "no migration needed".
#[must_use]
pub fn check_if_migration_needed(store: &impl LedgerStore, today: NaiveDate) -> bool {
    let days = match store.list_recent_days(SAMPLE_SIZE) {
        Ok(days) => days,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "Could not check day dates for migration");
            return false;
        }
    };
    if days.is_empty() {
        return false;
    }
    let ahead = days.iter().filter(|d| is_one_day_ahead(d, today)).count();
    tracing::debug!(sampled = days.len(), ahead, "Checked recent day dates");
    ahead * 2 > days.len()
}

fn is_one_day_ahead(day: &Day, today: NaiveDate) -> bool {
    match parse_date_local(&day.date) {
        Ok(date) => diff_days(date, today) == 1,
        Err(_) => {
            tracing::warn!(day_id = %day.id, date = %day.date, "Skipping day with unparseable date");
            false
        }
    }
}

/// Shift every day dated `today + 1` back by one day.
///
/// When the corrected date already has a row, the stale row's entries move
/// onto it and the stale row is deleted. The surviving row keeps its own
/// weight and notes; the stale row's values only fill in what it lacks.
///
/// Only rows exactly one day ahead of `today` change, so a second run is a
/// no-op. Errors propagate: callers should run this inside a transaction.
pub fn migrate_dates_utc_to_local(
    store: &impl LedgerStore,
    today: NaiveDate,
) -> Result<MigrationReport> {
    let days = store.list_days()?;
    let mut report = MigrationReport {
        days_scanned: days.len(),
        ..MigrationReport::default()
    };
    if days.is_empty() {
        tracing::info!("No days to migrate");
        return Ok(report);
    }
    tracing::info!(days = days.len(), "Migrating day dates from UTC to local");

    for day in days.iter().filter(|d| is_one_day_ahead(d, today)) {
        let current = parse_date_local(&day.date)?;
        let shifted = format_date_local(current - Duration::days(1));

        match store.find_day_by_date(&shifted)? {
            None => {
                store
                    .update_day_date(&day.id, &shifted)
                    .with_context(|| format!("Failed to move day {} to {shifted}", day.date))?;
                report.days_moved += 1;
                tracing::info!(from = %day.date, to = %shifted, "Migrated day");
            }
            Some(existing) => {
                let moved = merge_into(store, day, &existing)
                    .with_context(|| format!("Failed to merge day {} into {shifted}", day.date))?;
                report.days_merged += 1;
                report.entries_reassigned += moved;
                tracing::info!(
                    from = %day.date,
                    to = %shifted,
                    entries = moved,
                    "Merged duplicate day"
                );
            }
        }
    }

    tracing::info!(
        moved = report.days_moved,
        merged = report.days_merged,
        "Migration complete"
    );
    Ok(report)
}

fn merge_into(store: &impl LedgerStore, stale: &Day, existing: &Day) -> Result<usize> {
    let moved = store.reassign_entries(&stale.id, &existing.id)?;
    if existing.weight.is_none() && stale.weight.is_some() {
        store.update_day_weight(&existing.id, stale.weight)?;
    }
    if existing.notes.is_none() && stale.notes.is_some() {
        store.update_day_notes(&existing.id, stale.notes.as_deref())?;
    }
    store.delete_day(&stale.id)?;
    Ok(moved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::models::EntryType;
    use crate::test_support::FailingStore;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn seed_day(db: &Database, date: &str, foods: &[(&str, f64)]) -> Day {
        let day = db.create_day(date).unwrap();
        for (i, (name, calories)) in foods.iter().enumerate() {
            db.insert_entry(
                &day.id,
                EntryType::Food,
                name,
                *calories,
                &format!("{date}T0{i}:00:00Z"),
            )
            .unwrap();
        }
        day
    }

    fn snapshot(db: &Database) -> Vec<(String, Option<f64>, Vec<String>)> {
        let mut days = db.list_days().unwrap();
        days.sort_by(|a, b| a.date.cmp(&b.date));
        days.into_iter()
            .map(|d| {
                let names = db
                    .list_entries_for_day(&d.id)
                    .unwrap()
                    .into_iter()
                    .map(|e| e.name)
                    .collect();
                (d.date, d.weight, names)
            })
            .collect()
    }

    #[test]
    fn test_check_empty_store() {
        let db = Database::open_in_memory().unwrap();
        assert!(!check_if_migration_needed(&db, ymd(2024, 3, 1)));
    }

    #[test]
    fn test_check_majority_ahead() {
        let db = Database::open_in_memory().unwrap();
        seed_day(&db, "2024-03-02", &[]);
        seed_day(&db, "2024-02-28", &[]);
        // 1 of 2 ahead is not a strict majority
        assert!(!check_if_migration_needed(&db, ymd(2024, 3, 1)));

        // Dates are unique, so only a one-row sample can be a majority here
        let db = Database::open_in_memory().unwrap();
        seed_day(&db, "2024-03-02", &[]);
        assert!(check_if_migration_needed(&db, ymd(2024, 3, 1)));
    }

    #[test]
    fn test_check_nothing_ahead() {
        let db = Database::open_in_memory().unwrap();
        for date in ["2024-02-27", "2024-02-28", "2024-02-29", "2024-03-01"] {
            seed_day(&db, date, &[]);
        }
        assert!(!check_if_migration_needed(&db, ymd(2024, 3, 1)));
    }

    #[test]
    fn test_check_samples_only_recent_days() {
        let db = Database::open_in_memory().unwrap();
        seed_day(&db, "2024-03-02", &[]);
        // Old rows outside the sample window must not dilute the vote
        for day in 1..=20 {
            seed_day(&db, &format!("2023-01-{day:02}"), &[]);
        }
        assert!(!check_if_migration_needed(&db, ymd(2024, 3, 1)));
    }

    #[test]
    fn test_check_is_best_effort_on_storage_failure() {
        assert!(!check_if_migration_needed(&FailingStore, ymd(2024, 3, 1)));
    }

    #[test]
    fn test_migrate_moves_row_in_place() {
        let db = Database::open_in_memory().unwrap();
        let stale = seed_day(&db, "2024-03-02", &[("Oats", 300.0)]);
        seed_day(&db, "2024-02-29", &[("Pasta", 600.0)]);

        let report = migrate_dates_utc_to_local(&db, ymd(2024, 3, 1)).unwrap();
        assert_eq!(report.days_scanned, 2);
        assert_eq!(report.days_moved, 1);
        assert_eq!(report.days_merged, 0);

        let moved = db.find_day_by_date("2024-03-01").unwrap().unwrap();
        assert_eq!(moved.id, stale.id);
        assert!(db.find_day_by_date("2024-03-02").unwrap().is_none());
        assert!(db.find_day_by_date("2024-02-29").unwrap().is_some());
    }

    #[test]
    fn test_migrate_merges_collision() {
        let db = Database::open_in_memory().unwrap();
        let stale = seed_day(&db, "2024-03-02", &[("Stale A", 100.0), ("Stale B", 200.0)]);
        let correct = seed_day(&db, "2024-03-01", &[("Correct", 50.0)]);

        let report = migrate_dates_utc_to_local(&db, ymd(2024, 3, 1)).unwrap();
        assert_eq!(report.days_merged, 1);
        assert_eq!(report.entries_reassigned, 2);

        assert!(db.find_day_by_date("2024-03-02").unwrap().is_none());
        assert!(db.list_entries_for_day(&stale.id).unwrap().is_empty());

        let survivor = db.find_day_by_date("2024-03-01").unwrap().unwrap();
        assert_eq!(survivor.id, correct.id);
        let mut names: Vec<String> = db
            .list_entries_for_day(&survivor.id)
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        names.sort();
        assert_eq!(names, ["Correct", "Stale A", "Stale B"]);
    }

    #[test]
    fn test_merge_keeps_existing_weight() {
        let db = Database::open_in_memory().unwrap();
        let stale = seed_day(&db, "2024-03-02", &[]);
        let correct = seed_day(&db, "2024-03-01", &[]);
        db.update_day_weight(&stale.id, Some(190.0)).unwrap();
        db.update_day_weight(&correct.id, Some(185.0)).unwrap();

        migrate_dates_utc_to_local(&db, ymd(2024, 3, 1)).unwrap();
        let survivor = db.find_day_by_date("2024-03-01").unwrap().unwrap();
        assert_eq!(survivor.weight, Some(185.0));
    }

    #[test]
    fn test_merge_carries_weight_when_existing_has_none() {
        let db = Database::open_in_memory().unwrap();
        let stale = seed_day(&db, "2024-03-02", &[]);
        seed_day(&db, "2024-03-01", &[]);
        db.update_day_weight(&stale.id, Some(190.0)).unwrap();
        db.update_day_notes(&stale.id, Some("felt great")).unwrap();

        migrate_dates_utc_to_local(&db, ymd(2024, 3, 1)).unwrap();
        let survivor = db.find_day_by_date("2024-03-01").unwrap().unwrap();
        assert_eq!(survivor.weight, Some(190.0));
        assert_eq!(survivor.notes.as_deref(), Some("felt great"));
    }

    #[test]
    fn test_migrate_ignores_rows_not_one_day_ahead() {
        let db = Database::open_in_memory().unwrap();
        seed_day(&db, "2024-03-03", &[("Future", 1.0)]);
        seed_day(&db, "2024-03-01", &[("Today", 1.0)]);
        seed_day(&db, "2024-02-01", &[("Past", 1.0)]);
        let before = snapshot(&db);

        let report = migrate_dates_utc_to_local(&db, ymd(2024, 3, 1)).unwrap();
        assert!(!report.changed());
        assert_eq!(snapshot(&db), before);
    }

    #[test]
    fn test_migrate_twice_is_noop() {
        let db = Database::open_in_memory().unwrap();
        seed_day(&db, "2024-03-02", &[("Stale", 100.0)]);
        seed_day(&db, "2024-03-01", &[("Correct", 50.0)]);
        seed_day(&db, "2024-02-20", &[("Old", 75.0)]);

        let first = migrate_dates_utc_to_local(&db, ymd(2024, 3, 1)).unwrap();
        assert!(first.changed());
        let after_first = snapshot(&db);

        let second = migrate_dates_utc_to_local(&db, ymd(2024, 3, 1)).unwrap();
        assert!(!second.changed());
        assert_eq!(second.entries_reassigned, 0);
        assert_eq!(snapshot(&db), after_first);
    }

    #[test]
    fn test_migrate_preserves_every_entry_once() {
        let db = Database::open_in_memory().unwrap();
        seed_day(&db, "2024-03-02", &[("A", 1.0), ("B", 2.0), ("C", 3.0)]);
        seed_day(&db, "2024-03-01", &[("D", 4.0)]);
        seed_day(&db, "2024-02-28", &[("E", 5.0)]);

        migrate_dates_utc_to_local(&db, ymd(2024, 3, 1)).unwrap();

        let ids: Vec<String> = db.list_days().unwrap().into_iter().map(|d| d.id).collect();
        let entries = db.find_entries_by_day_set(&ids).unwrap();
        let mut names: Vec<String> = entries.into_iter().map(|e| e.name).collect();
        names.sort();
        assert_eq!(names, ["A", "B", "C", "D", "E"]);
    }

    #[test]
    fn test_migrate_empty_store() {
        let db = Database::open_in_memory().unwrap();
        let report = migrate_dates_utc_to_local(&db, ymd(2024, 3, 1)).unwrap();
        assert_eq!(report, MigrationReport::default());
    }

    #[test]
    fn test_migrate_propagates_storage_failure() {
        let err = migrate_dates_utc_to_local(&FailingStore, ymd(2024, 3, 1)).unwrap_err();
        assert!(format!("{err:#}").contains("disk I/O error"));
    }

    #[test]
    fn test_failed_merge_rolls_back() {
        let db = Database::open_in_memory().unwrap();
        let stale = seed_day(&db, "2024-03-02", &[("Stale A", 100.0), ("Stale B", 200.0)]);
        let correct = seed_day(&db, "2024-03-01", &[("Correct", 50.0)]);
        db.update_day_weight(&stale.id, Some(190.0)).unwrap();
        // Entries get reassigned, then deleting the stale row fails
        db.execute_batch(
            "CREATE TRIGGER lock_days BEFORE DELETE ON days
             BEGIN SELECT RAISE(ABORT, 'days are locked'); END;",
        )
        .unwrap();
        let before = snapshot(&db);

        let err = db
            .transaction(|db| migrate_dates_utc_to_local(db, ymd(2024, 3, 1)))
            .unwrap_err();
        assert!(format!("{err:#}").contains("Failed to merge day 2024-03-02"));

        assert_eq!(snapshot(&db), before);
        let still_stale = db.find_day_by_date("2024-03-02").unwrap().unwrap();
        assert_eq!(still_stale.id, stale.id);
        assert_eq!(db.list_entries_for_day(&stale.id).unwrap().len(), 2);
        let untouched = db.find_day_by_date("2024-03-01").unwrap().unwrap();
        assert_eq!(untouched.weight, None);
        assert_eq!(db.list_entries_for_day(&correct.id).unwrap().len(), 1);
    }
}
