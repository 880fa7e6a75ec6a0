//! Storage seams.
//!
//! The aggregators and the date repair only talk to these traits. `Database`
//! is the SQLite implementation; tests swap in fakes.

use anyhow::Result;

use crate::models::{Day, Entry, EntryType};

/// Day-keyed ledger of calorie entries and weights.
///
/// Calls are synchronous and read-after-write consistent against a single
/// local store.
pub trait LedgerStore {
    fn find_day_by_date(&self, date: &str) -> Result<Option<Day>>;

    /// Insert a new day with no weight or notes. Fails if the date is taken.
    fn create_day(&self, date: &str) -> Result<Day>;

    fn update_day_weight(&self, day_id: &str, weight: Option<f64>) -> Result<()>;

    fn update_day_notes(&self, day_id: &str, notes: Option<&str>) -> Result<()>;

    fn update_day_date(&self, day_id: &str, date: &str) -> Result<()>;

    fn delete_day(&self, day_id: &str) -> Result<()>;

    /// Days whose date is in `dates`, in one round trip.
    fn find_days_by_date_set(&self, dates: &[String]) -> Result<Vec<Day>>;

    /// The `limit` most recent days by date, newest first.
    fn list_recent_days(&self, limit: usize) -> Result<Vec<Day>>;

    /// Every day, newest first.
    fn list_days(&self) -> Result<Vec<Day>>;

    /// Entries of one day ordered by creation time.
    fn list_entries_for_day(&self, day_id: &str) -> Result<Vec<Entry>>;

    /// Entries owned by any of `day_ids`, in one round trip.
    fn find_entries_by_day_set(&self, day_ids: &[String]) -> Result<Vec<Entry>>;

    fn get_entry(&self, id: &str) -> Result<Option<Entry>>;

    fn insert_entry(
        &self,
        day_id: &str,
        entry_type: EntryType,
        name: &str,
        calories: f64,
        created_at: &str,
    ) -> Result<Entry>;

    /// Returns false when no entry has this id.
    fn update_entry(&self, id: &str, entry_type: EntryType, name: &str, calories: f64)
    -> Result<bool>;

    /// Returns false when no entry has this id.
    fn delete_entry(&self, id: &str) -> Result<bool>;

    /// Move every entry of `from_day_id` onto `to_day_id`. Returns how many moved.
    fn reassign_entries(&self, from_day_id: &str, to_day_id: &str) -> Result<usize>;
}

/// Plain key/value settings.
pub trait SettingsStore {
    fn get_setting(&self, key: &str) -> Result<Option<String>>;
    fn set_setting(&self, key: &str, value: &str) -> Result<()>;
    /// Returns false when the key was not set.
    fn delete_setting(&self, key: &str) -> Result<bool>;
}
