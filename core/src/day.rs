//! Single-day aggregation and the mutations that feed it.
//!
//! Totals are never stored. Every call re-reads the day's full entry list and
//! sums it again, so a summary can't drift from the rows it describes.

use anyhow::{Result, bail};
use chrono::{NaiveDate, SecondsFormat, Utc};

use crate::dates::format_date_local;
use crate::models::{Day, DaySummary, NewEntry};
use crate::store::LedgerStore;

/// Return the day row for `date`, creating an empty one if none exists.
///
/// This is the only place day rows are created lazily.
pub fn ensure_day(store: &impl LedgerStore, date: NaiveDate) -> Result<Day> {
    let key = format_date_local(date);
    if let Some(day) = store.find_day_by_date(&key)? {
        return Ok(day);
    }
    store.create_day(&key)
}

pub fn day_summary(store: &impl LedgerStore, date: NaiveDate) -> Result<DaySummary> {
    let day = ensure_day(store, date)?;
    summarize(store, &day)
}

fn summarize(store: &impl LedgerStore, day: &Day) -> Result<DaySummary> {
    let entries = store.list_entries_for_day(&day.id)?;
    Ok(DaySummary::from_day(day, entries))
}

pub fn add_entry(
    store: &impl LedgerStore,
    date: NaiveDate,
    entry: &NewEntry,
) -> Result<DaySummary> {
    let day = ensure_day(store, date)?;
    let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
    store.insert_entry(
        &day.id,
        entry.entry_type,
        &entry.name,
        entry.calories,
        &created_at,
    )?;
    summarize(store, &day)
}

/// Rewrite an entry on `date`. The entry keeps its day and creation time.
pub fn update_entry(
    store: &impl LedgerStore,
    date: NaiveDate,
    id: &str,
    entry: &NewEntry,
) -> Result<DaySummary> {
    let day = ensure_day(store, date)?;
    check_owner(store, &day, id)?;
    store.update_entry(id, entry.entry_type, &entry.name, entry.calories)?;
    summarize(store, &day)
}

pub fn delete_entry(store: &impl LedgerStore, date: NaiveDate, id: &str) -> Result<DaySummary> {
    let day = ensure_day(store, date)?;
    check_owner(store, &day, id)?;
    store.delete_entry(id)?;
    summarize(store, &day)
}

/// Set or clear (`None`) the weight recorded for `date`.
pub fn update_weight(
    store: &impl LedgerStore,
    date: NaiveDate,
    weight: Option<f64>,
) -> Result<DaySummary> {
    let day = ensure_day(store, date)?;
    store.update_day_weight(&day.id, weight)?;
    // Re-read the row so the summary carries the stored weight.
    day_summary(store, date)
}

pub fn update_notes(
    store: &impl LedgerStore,
    date: NaiveDate,
    notes: Option<&str>,
) -> Result<DaySummary> {
    let day = ensure_day(store, date)?;
    let notes = notes.map(str::trim).filter(|n| !n.is_empty());
    store.update_day_notes(&day.id, notes)?;
    day_summary(store, date)
}

fn check_owner(store: &impl LedgerStore, day: &Day, id: &str) -> Result<()> {
    match store.get_entry(id)? {
        Some(entry) if entry.day_id == day.id => Ok(()),
        Some(_) => bail!("Entry {id} does not belong to {}", day.date),
        None => bail!("Entry not found: {id}"),
    }
}
