//! Multi-day series for charts and calendars.
//!
//! Every series has exactly one record per requested date, in ascending
//! order. Dates without a day row or without entries are filled with zero
//! calories, zero miles or no weight; gaps are never skipped.

use std::collections::HashMap;

use anyhow::Result;
use chrono::NaiveDate;

use crate::dates::{date_range_ending, first_weekday, format_date_local, month_dates};
use crate::models::{CalorieTotals, Day, Entry, EntryType, MilesDay, MonthDay, TrendDay, WeightDay};
use crate::store::LedgerStore;

/// Day rows and entries for a set of dates, fetched in two batched queries.
struct RangeData {
    dates: Vec<String>,
    days: Vec<Day>,
    entries: Vec<Entry>,
}

impl RangeData {
    fn load(store: &impl LedgerStore, dates: &[NaiveDate], with_entries: bool) -> Result<Self> {
        let dates: Vec<String> = dates.iter().copied().map(format_date_local).collect();
        if dates.is_empty() {
            return Ok(Self {
                dates,
                days: Vec::new(),
                entries: Vec::new(),
            });
        }
        let days = store.find_days_by_date_set(&dates)?;
        let entries = if with_entries && !days.is_empty() {
            let ids: Vec<String> = days.iter().map(|d| d.id.clone()).collect();
            store.find_entries_by_day_set(&ids)?
        } else {
            Vec::new()
        };
        Ok(Self {
            dates,
            days,
            entries,
        })
    }

    /// `day_id -> date`
    fn day_dates(&self) -> HashMap<&str, &str> {
        self.days
            .iter()
            .map(|d| (d.id.as_str(), d.date.as_str()))
            .collect()
    }

    fn calorie_totals(&self) -> HashMap<&str, CalorieTotals> {
        let day_dates = self.day_dates();
        let mut totals: HashMap<&str, CalorieTotals> = HashMap::new();
        for entry in &self.entries {
            if let Some(&date) = day_dates.get(entry.day_id.as_str()) {
                totals.entry(date).or_default().add(entry);
            }
        }
        totals
    }

    fn miles(&self) -> HashMap<&str, f64> {
        let day_dates = self.day_dates();
        let mut miles: HashMap<&str, f64> = HashMap::new();
        for entry in &self.entries {
            if entry.entry_type != EntryType::Exercise {
                continue;
            }
            let (Some(&date), Some(distance)) =
                (day_dates.get(entry.day_id.as_str()), entry.miles_distance())
            else {
                continue;
            };
            *miles.entry(date).or_insert(0.0) += distance;
        }
        miles
    }

    fn weights(&self) -> HashMap<&str, f64> {
        self.days
            .iter()
            .filter_map(|d| d.weight.map(|w| (d.date.as_str(), w)))
            .collect()
    }

    fn calorie_series(&self) -> Vec<TrendDay> {
        let totals = self.calorie_totals();
        self.dates
            .iter()
            .map(|date| {
                let t = totals.get(date.as_str()).copied().unwrap_or_default();
                TrendDay {
                    date: date.clone(),
                    net: t.net(),
                    calories_in: t.calories_in,
                    calories_out: t.calories_out,
                }
            })
            .collect()
    }

    fn weight_series(&self) -> Vec<WeightDay> {
        let weights = self.weights();
        self.dates
            .iter()
            .map(|date| WeightDay {
                date: date.clone(),
                weight: weights.get(date.as_str()).copied(),
            })
            .collect()
    }
}

/// Net, in and out calories for the `days` days ending at `end`.
pub fn calorie_trend(store: &impl LedgerStore, end: NaiveDate, days: i64) -> Result<Vec<TrendDay>> {
    let data = RangeData::load(store, &date_range_ending(end, days), true)?;
    Ok(data.calorie_series())
}

/// Miles parsed from exercise names for the `days` days ending at `end`.
pub fn miles_trend(store: &impl LedgerStore, end: NaiveDate, days: i64) -> Result<Vec<MilesDay>> {
    let data = RangeData::load(store, &date_range_ending(end, days), true)?;
    let miles = data.miles();
    Ok(data
        .dates
        .iter()
        .map(|date| MilesDay {
            date: date.clone(),
            miles: miles.get(date.as_str()).copied().unwrap_or(0.0),
        })
        .collect())
}

pub fn weight_trend(store: &impl LedgerStore, end: NaiveDate, days: i64) -> Result<Vec<WeightDay>> {
    let data = RangeData::load(store, &date_range_ending(end, days), false)?;
    Ok(data.weight_series())
}

/// Net calories for every day of a month. Empty for an invalid month.
pub fn month_net(store: &impl LedgerStore, year: i32, month: u32) -> Result<Vec<MonthDay>> {
    let data = RangeData::load(store, &month_dates(year, month), true)?;
    Ok(data
        .calorie_series()
        .into_iter()
        .map(|t| MonthDay {
            date: t.date,
            net: t.net,
        })
        .collect())
}

/// Recorded weight for every day of a month. Empty for an invalid month.
pub fn month_weights(store: &impl LedgerStore, year: i32, month: u32) -> Result<Vec<WeightDay>> {
    let data = RangeData::load(store, &month_dates(year, month), false)?;
    Ok(data.weight_series())
}

/// Month grid cells: one `None` per weekday before the 1st (weeks start on
/// Sunday), then the day numbers. No trailing padding.
#[must_use]
pub fn calendar_grid(year: i32, month: u32) -> Vec<Option<u32>> {
    let Some(leading) = first_weekday(year, month) else {
        return Vec::new();
    };
    let days = month_dates(year, month);
    let mut cells = Vec::with_capacity(leading as usize + days.len());
    cells.extend(std::iter::repeat_n(None, leading as usize));
    cells.extend((1..=days.len() as u32).map(Some));
    cells
}
