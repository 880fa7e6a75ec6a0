use std::cell::Cell;
use std::path::Path;

use anyhow::Result;
use chrono::NaiveDate;

use crate::dates::{format_date_local, today_local_date};
use crate::db::Database;
use crate::day;
use crate::goals::{DeficitStatus, TargetProgress};
use crate::migration::{self, MigrationReport};
use crate::models::{
    CalorieTotals, Day, DaySummary, MilesDay, MonthDay, NewEntry, TodaySnapshot, TrendDay,
    WeightDay, parse_positive_number, validate_required, validate_target,
};
use crate::range;
use crate::settings::{Settings, ThemePreference};
use crate::store::{LedgerStore, SettingsStore};

/// Entry point for hosts.
///
/// Reads never fail: a storage error is logged and the caller gets an empty
/// value, so a screen can always render. Writes validate their raw input
/// first and return every error.
pub struct DaybookService<S = Database> {
    store: S,
    migration_checked: Cell<bool>,
}

impl DaybookService<Database> {
    pub fn new(db_path: &Path) -> Result<Self> {
        Ok(Self::with_store(Database::open(db_path)?))
    }

    pub fn new_in_memory() -> Result<Self> {
        Ok(Self::with_store(Database::open_in_memory()?))
    }

    /// Repair UTC-keyed day rows, at most once per service instance.
    ///
    /// Returns the report when a migration ran. The whole repair commits or
    /// rolls back as one transaction.
    pub fn run_startup_migration(&self, today: NaiveDate) -> Result<Option<MigrationReport>> {
        if self.migration_checked.replace(true) {
            return Ok(None);
        }
        if !migration::check_if_migration_needed(&self.store, today) {
            return Ok(None);
        }
        let report = self
            .store
            .transaction(|db| migration::migrate_dates_utc_to_local(db, today))
            .inspect_err(|e| tracing::error!(error = %format!("{e:#}"), "Date migration failed"))?;
        Ok(Some(report))
    }
}

impl<S: LedgerStore + SettingsStore> DaybookService<S> {
    pub fn with_store(store: S) -> Self {
        Self {
            store,
            migration_checked: Cell::new(false),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // --- Day ---

    /// Summary for `date`, creating its row on first view.
    pub fn get_day_summary(&self, date: NaiveDate) -> DaySummary {
        degrade("load day summary", day::day_summary(&self.store, date), || {
            DaySummary::empty(&format_date_local(date))
        })
    }

    pub fn add_entry(
        &self,
        date: NaiveDate,
        entry_type: &str,
        name: &str,
        calories: &str,
    ) -> Result<DaySummary> {
        let entry = NewEntry::parse(entry_type, name, calories)?;
        day::add_entry(&self.store, date, &entry)
            .inspect_err(|e| tracing::error!(error = %format!("{e:#}"), "Failed to add entry"))
    }

    pub fn update_entry(
        &self,
        date: NaiveDate,
        id: &str,
        entry_type: &str,
        name: &str,
        calories: &str,
    ) -> Result<DaySummary> {
        let entry = NewEntry::parse(entry_type, name, calories)?;
        day::update_entry(&self.store, date, id, &entry)
            .inspect_err(|e| tracing::error!(error = %format!("{e:#}"), "Failed to update entry"))
    }

    pub fn delete_entry(&self, date: NaiveDate, id: &str) -> Result<DaySummary> {
        day::delete_entry(&self.store, date, id)
            .inspect_err(|e| tracing::error!(error = %format!("{e:#}"), "Failed to delete entry"))
    }

    /// Blank input clears the weight.
    pub fn update_weight(&self, date: NaiveDate, weight: &str) -> Result<DaySummary> {
        let weight = if weight.trim().is_empty() {
            None
        } else {
            Some(parse_positive_number(weight, "weight")?)
        };
        day::update_weight(&self.store, date, weight)
            .inspect_err(|e| tracing::error!(error = %format!("{e:#}"), "Failed to save weight"))
    }

    pub fn update_notes(&self, date: NaiveDate, notes: &str) -> Result<DaySummary> {
        day::update_notes(&self.store, date, Some(notes))
            .inspect_err(|e| tracing::error!(error = %format!("{e:#}"), "Failed to save notes"))
    }

    /// Totals and weight for `date` without creating a day row.
    pub fn snapshot(&self, date: NaiveDate) -> TodaySnapshot {
        let key = format_date_local(date);
        degrade("load snapshot", self.load_snapshot(&key), || {
            TodaySnapshot::empty(&key)
        })
    }

    fn load_snapshot(&self, key: &str) -> Result<TodaySnapshot> {
        let Some(day) = self.store.find_day_by_date(key)? else {
            return Ok(TodaySnapshot::empty(key));
        };
        let entries = self.store.list_entries_for_day(&day.id)?;
        let totals: CalorieTotals = entries.iter().collect();
        Ok(TodaySnapshot {
            date: day.date,
            net: totals.net(),
            calories_in: totals.calories_in,
            calories_out: totals.calories_out,
            weight: day.weight,
        })
    }

    pub fn today_snapshot(&self) -> TodaySnapshot {
        self.snapshot(today_local_date())
    }

    /// Every stored day, newest first.
    pub fn list_days(&self) -> Vec<Day> {
        degrade("list days", self.store.list_days(), Vec::new)
    }

    // --- Ranges ---

    pub fn calorie_trend(&self, end: NaiveDate, days: i64) -> Vec<TrendDay> {
        degrade(
            "load calorie trend",
            range::calorie_trend(&self.store, end, days),
            Vec::new,
        )
    }

    pub fn miles_trend(&self, end: NaiveDate, days: i64) -> Vec<MilesDay> {
        degrade(
            "load miles trend",
            range::miles_trend(&self.store, end, days),
            Vec::new,
        )
    }

    pub fn weight_trend(&self, end: NaiveDate, days: i64) -> Vec<WeightDay> {
        degrade(
            "load weight trend",
            range::weight_trend(&self.store, end, days),
            Vec::new,
        )
    }

    pub fn month_net(&self, year: i32, month: u32) -> Vec<MonthDay> {
        degrade(
            "load month calories",
            range::month_net(&self.store, year, month),
            Vec::new,
        )
    }

    pub fn month_weights(&self, year: i32, month: u32) -> Vec<WeightDay> {
        degrade(
            "load month weights",
            range::month_weights(&self.store, year, month),
            Vec::new,
        )
    }

    // --- Settings ---

    fn settings(&self) -> Settings<'_, S> {
        Settings::new(&self.store)
    }

    pub fn bmr(&self) -> Option<f64> {
        degrade("load BMR", self.settings().bmr(), || None)
    }

    /// Blank input clears the BMR.
    pub fn set_bmr(&self, bmr: &str) -> Result<Option<f64>> {
        let bmr = if bmr.trim().is_empty() {
            None
        } else {
            Some(parse_positive_number(bmr, "BMR value")?)
        };
        self.settings().set_bmr(bmr)?;
        Ok(bmr)
    }

    /// Saved target weight and date. Both must be set.
    pub fn target(&self) -> Option<(f64, NaiveDate)> {
        degrade("load target", self.load_target(), || None)
    }

    fn load_target(&self) -> Result<Option<(f64, NaiveDate)>> {
        let settings = self.settings();
        let weight = settings.target_weight()?;
        let date = settings.target_date()?;
        Ok(weight.zip(date))
    }

    pub fn set_target(&self, weight: &str, date: &str) -> Result<(f64, NaiveDate)> {
        validate_required(weight, "target weight")?;
        let (weight, date) = validate_target(weight, date)?;
        self.settings().set_target(Some(weight), Some(date))?;
        Ok((weight, date))
    }

    pub fn clear_target(&self) -> Result<()> {
        self.settings().set_target(None, None)
    }

    pub fn theme_preference(&self) -> ThemePreference {
        degrade(
            "load theme preference",
            self.settings().theme_preference(),
            ThemePreference::default,
        )
    }

    pub fn set_theme_preference(&self, theme: &str) -> Result<ThemePreference> {
        let theme = theme.parse::<ThemePreference>()?;
        self.settings().set_theme_preference(theme)?;
        Ok(theme)
    }

    // --- Goals ---

    pub fn deficit_status(&self, net: f64) -> DeficitStatus {
        DeficitStatus::classify(net, self.bmr())
    }

    /// Progress toward the saved target, if a target and a weight exist.
    pub fn target_progress(&self, weight: Option<f64>, today: NaiveDate) -> Option<TargetProgress> {
        let (target_weight, target_date) = self.target()?;
        Some(TargetProgress::compute(
            weight?,
            target_weight,
            target_date,
            today,
        ))
    }
}

fn degrade<T>(what: &str, result: Result<T>, fallback: impl FnOnce() -> T) -> T {
    result.unwrap_or_else(|e| {
        tracing::error!(error = %format!("{e:#}"), "Failed to {what}");
        fallback()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::goals::TargetDirection;
    use crate::test_support::FailingStore;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_reads_degrade_on_storage_failure() {
        let svc = DaybookService::with_store(FailingStore);
        let date = ymd(2024, 6, 1);

        let summary = svc.get_day_summary(date);
        assert_eq!(summary, DaySummary::empty("2024-06-01"));

        assert!(svc.calorie_trend(date, 7).is_empty());
        assert!(svc.miles_trend(date, 7).is_empty());
        assert!(svc.weight_trend(date, 7).is_empty());
        assert!(svc.month_net(2024, 6).is_empty());
        assert!(svc.month_weights(2024, 6).is_empty());
        assert!(svc.list_days().is_empty());
        assert!(svc.bmr().is_none());
        assert!(svc.target().is_none());
        assert_eq!(svc.theme_preference(), ThemePreference::System);

        let snap = svc.snapshot(date);
        assert_eq!(snap.date, "2024-06-01");
        assert_eq!(snap.net, 0.0);
        assert!(snap.weight.is_none());
    }

    #[test]
    fn test_writes_propagate_storage_failure() {
        let svc = DaybookService::with_store(FailingStore);
        let date = ymd(2024, 6, 1);
        assert!(svc.add_entry(date, "food", "Toast", "120").is_err());
        assert!(svc.update_weight(date, "180").is_err());
        assert!(svc.set_bmr("1800").is_err());
    }

    #[test]
    fn test_validation_runs_before_storage() {
        let svc = DaybookService::with_store(FailingStore);
        let date = ymd(2024, 6, 1);

        let err = svc.add_entry(date, "food", "  ", "120").unwrap_err();
        assert_eq!(
            err.downcast_ref::<ValidationError>(),
            Some(&ValidationError::Required {
                field: "name".to_string()
            })
        );

        let err = svc.add_entry(date, "food", "Toast", "-5").unwrap_err();
        assert!(err.downcast_ref::<ValidationError>().is_some());

        let err = svc.add_entry(date, "snack", "Toast", "120").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ValidationError>(),
            Some(ValidationError::UnknownEntryType(_))
        ));

        let err = svc.update_weight(date, "heavy").unwrap_err();
        assert!(err.downcast_ref::<ValidationError>().is_some());
    }

    #[test]
    fn test_log_and_summarize() {
        let svc = DaybookService::new_in_memory().unwrap();
        let date = ymd(2024, 6, 15);

        svc.add_entry(date, "food", "Sandwich", "200").unwrap();
        let summary = svc.add_entry(date, "exercise", "Bike 10 miles", "150").unwrap();
        assert_eq!(summary.entries.len(), 2);
        assert!((summary.net - 50.0).abs() < f64::EPSILON);

        let id = summary.entries[0].id.clone();
        let summary = svc
            .update_entry(date, &id, "food", "Sandwich", "350")
            .unwrap();
        assert!((summary.calories_in - 350.0).abs() < f64::EPSILON);

        let summary = svc.delete_entry(date, &id).unwrap();
        assert_eq!(summary.entries.len(), 1);
        assert!((summary.net + 150.0).abs() < f64::EPSILON);

        let miles = svc.miles_trend(date, 1);
        assert!((miles[0].miles - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_weight_set_and_clear() {
        let svc = DaybookService::new_in_memory().unwrap();
        let date = ymd(2024, 6, 15);
        let summary = svc.update_weight(date, " 181.4 ").unwrap();
        assert_eq!(summary.weight, Some(181.4));
        let summary = svc.update_weight(date, "").unwrap();
        assert!(summary.weight.is_none());
    }

    #[test]
    fn test_snapshot_is_read_only() {
        let svc = DaybookService::new_in_memory().unwrap();
        let date = ymd(2024, 6, 15);

        let snap = svc.snapshot(date);
        assert_eq!(snap.net, 0.0);
        assert!(svc.list_days().is_empty());

        svc.add_entry(date, "food", "Pasta", "700").unwrap();
        svc.add_entry(date, "exercise", "Walk", "100").unwrap();
        svc.update_weight(date, "170").unwrap();

        let snap = svc.snapshot(date);
        assert!((snap.calories_in - 700.0).abs() < f64::EPSILON);
        assert!((snap.calories_out - 100.0).abs() < f64::EPSILON);
        assert!((snap.net - 600.0).abs() < f64::EPSILON);
        assert_eq!(snap.weight, Some(170.0));
        assert_eq!(svc.list_days().len(), 1);
    }

    #[test]
    fn test_settings_round_trip() {
        let svc = DaybookService::new_in_memory().unwrap();

        assert_eq!(svc.set_bmr("1750").unwrap(), Some(1750.0));
        assert_eq!(svc.bmr(), Some(1750.0));
        assert_eq!(svc.deficit_status(1500.0), DeficitStatus::Deficit);
        assert_eq!(svc.deficit_status(1750.0), DeficitStatus::Surplus);
        assert!(svc.set_bmr("0").is_err());
        assert_eq!(svc.set_bmr("").unwrap(), None);
        assert_eq!(svc.deficit_status(1500.0), DeficitStatus::Unknown);

        assert!(svc.set_target("", "2024-12-01").is_err());
        assert!(svc.set_target("160", "12/01/2024").is_err());
        svc.set_target("160", "2024-12-01").unwrap();
        assert_eq!(svc.target(), Some((160.0, ymd(2024, 12, 1))));
        svc.clear_target().unwrap();
        assert!(svc.target().is_none());

        assert_eq!(svc.set_theme_preference("dark").unwrap(), ThemePreference::Dark);
        assert_eq!(svc.theme_preference(), ThemePreference::Dark);
        assert!(svc.set_theme_preference("sepia").is_err());
    }

    #[test]
    fn test_target_progress() {
        let svc = DaybookService::new_in_memory().unwrap();
        let today = ymd(2024, 6, 3);
        assert!(svc.target_progress(Some(180.0), today).is_none());

        svc.set_target("166", "2024-07-29").unwrap();
        assert!(svc.target_progress(None, today).is_none());

        let progress = svc.target_progress(Some(180.0), today).unwrap();
        assert_eq!(progress.direction, TargetDirection::Lose);
        assert!((progress.weekly_rate.unwrap() - 1.75).abs() < 1e-9);
    }

    #[test]
    fn test_startup_migration_runs_once() {
        let svc = DaybookService::new_in_memory().unwrap();
        let today = ymd(2024, 6, 10);
        let tomorrow = ymd(2024, 6, 11);

        svc.add_entry(tomorrow, "food", "Late dinner", "650").unwrap();
        svc.update_weight(tomorrow, "175").unwrap();

        let report = svc.run_startup_migration(today).unwrap().unwrap();
        assert_eq!(report.days_moved, 1);
        assert!(report.changed());

        let moved = svc.snapshot(today);
        assert!((moved.calories_in - 650.0).abs() < f64::EPSILON);
        assert_eq!(moved.weight, Some(175.0));
        assert!(svc.store().find_day_by_date("2024-06-11").unwrap().is_none());

        // A second call in the same session does nothing
        svc.add_entry(tomorrow, "food", "Another", "100").unwrap();
        assert!(svc.run_startup_migration(today).unwrap().is_none());
        assert!(svc.store().find_day_by_date("2024-06-11").unwrap().is_some());
    }

    #[test]
    fn test_startup_migration_not_needed() {
        let svc = DaybookService::new_in_memory().unwrap();
        let today = ymd(2024, 6, 10);
        svc.add_entry(ymd(2024, 6, 9), "food", "Lunch", "500").unwrap();
        svc.add_entry(today, "food", "Lunch", "500").unwrap();
        assert!(svc.run_startup_migration(today).unwrap().is_none());
        assert_eq!(svc.list_days().len(), 2);
    }

    #[test]
    fn test_startup_migration_rolls_back_on_failure() {
        let svc = DaybookService::new_in_memory().unwrap();
        let today = ymd(2024, 6, 10);
        let tomorrow = ymd(2024, 6, 11);
        svc.add_entry(tomorrow, "food", "Late dinner", "650").unwrap();
        svc.add_entry(tomorrow, "exercise", "Run 2 miles", "200").unwrap();
        svc.update_weight(tomorrow, "175").unwrap();
        svc.store()
            .execute_batch(
                "CREATE TRIGGER lock_day_dates BEFORE UPDATE OF date ON days
                 BEGIN SELECT RAISE(ABORT, 'day dates are locked'); END;",
            )
            .unwrap();

        assert!(svc.run_startup_migration(today).is_err());

        let stale = svc.store().find_day_by_date("2024-06-11").unwrap().unwrap();
        assert_eq!(stale.weight, Some(175.0));
        assert_eq!(svc.store().list_entries_for_day(&stale.id).unwrap().len(), 2);
        assert!(svc.store().find_day_by_date("2024-06-10").unwrap().is_none());
    }
}
