//! Fakes shared by the unit tests.

use anyhow::{Result, bail};

use crate::models::{Day, Entry, EntryType};
use crate::store::{LedgerStore, SettingsStore};

/// A store whose disk is always gone.
pub(crate) struct FailingStore;

impl LedgerStore for FailingStore {
    fn find_day_by_date(&self, _date: &str) -> Result<Option<Day>> {
        bail!("disk I/O error")
    }
    fn create_day(&self, _date: &str) -> Result<Day> {
        bail!("disk I/O error")
    }
    fn update_day_weight(&self, _day_id: &str, _weight: Option<f64>) -> Result<()> {
        bail!("disk I/O error")
    }
    fn update_day_notes(&self, _day_id: &str, _notes: Option<&str>) -> Result<()> {
        bail!("disk I/O error")
    }
    fn update_day_date(&self, _day_id: &str, _date: &str) -> Result<()> {
        bail!("disk I/O error")
    }
    fn delete_day(&self, _day_id: &str) -> Result<()> {
        bail!("disk I/O error")
    }
    fn find_days_by_date_set(&self, _dates: &[String]) -> Result<Vec<Day>> {
        bail!("disk I/O error")
    }
    fn list_recent_days(&self, _limit: usize) -> Result<Vec<Day>> {
        bail!("disk I/O error")
    }
    fn list_days(&self) -> Result<Vec<Day>> {
        bail!("disk I/O error")
    }
    fn list_entries_for_day(&self, _day_id: &str) -> Result<Vec<Entry>> {
        bail!("disk I/O error")
    }
    fn find_entries_by_day_set(&self, _day_ids: &[String]) -> Result<Vec<Entry>> {
        bail!("disk I/O error")
    }
    fn get_entry(&self, _id: &str) -> Result<Option<Entry>> {
        bail!("disk I/O error")
    }
    fn insert_entry(
        &self,
        _day_id: &str,
        _entry_type: EntryType,
        _name: &str,
        _calories: f64,
        _created_at: &str,
    ) -> Result<Entry> {
        bail!("disk I/O error")
    }
    fn update_entry(
        &self,
        _id: &str,
        _entry_type: EntryType,
        _name: &str,
        _calories: f64,
    ) -> Result<bool> {
        bail!("disk I/O error")
    }
    fn delete_entry(&self, _id: &str) -> Result<bool> {
        bail!("disk I/O error")
    }
    fn reassign_entries(&self, _from_day_id: &str, _to_day_id: &str) -> Result<usize> {
        bail!("disk I/O error")
    }
}

impl SettingsStore for FailingStore {
    fn get_setting(&self, _key: &str) -> Result<Option<String>> {
        bail!("disk I/O error")
    }
    fn set_setting(&self, _key: &str, _value: &str) -> Result<()> {
        bail!("disk I/O error")
    }
    fn delete_setting(&self, _key: &str) -> Result<bool> {
        bail!("disk I/O error")
    }
}
