//! Local calendar date helpers.
//!
//! Every day key in the ledger is a `YYYY-MM-DD` string in the user's local
//! timezone. These helpers never look at UTC fields, so a late-evening entry
//! can't land on tomorrow's row.

use anyhow::{Context, Result, bail};
use chrono::{Datelike, Duration, Local, NaiveDate};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Render a calendar date as zero-padded `YYYY-MM-DD`.
#[must_use]
pub fn format_date_local(date: NaiveDate) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

/// Parse a `YYYY-MM-DD` string into a local calendar date.
pub fn parse_date_local(s: &str) -> Result<NaiveDate> {
    let mut parts = s.trim().splitn(3, '-');
    let (Some(y), Some(m), Some(d)) = (parts.next(), parts.next(), parts.next()) else {
        bail!("Invalid date '{s}'. Use YYYY-MM-DD");
    };
    let year: i32 = y
        .parse()
        .with_context(|| format!("Invalid year in date '{s}'"))?;
    let month: u32 = m
        .parse()
        .with_context(|| format!("Invalid month in date '{s}'"))?;
    let day: u32 = d
        .parse()
        .with_context(|| format!("Invalid day in date '{s}'"))?;
    NaiveDate::from_ymd_opt(year, month, day)
        .with_context(|| format!("Date '{s}' is not on the calendar"))
}

#[must_use]
pub fn today_local_date() -> NaiveDate {
    Local::now().date_naive()
}

#[must_use]
pub fn today_local() -> String {
    format_date_local(today_local_date())
}

/// Whole calendar days from `today` to `date` (negative when `date` is in the past).
#[must_use]
pub fn diff_days(date: NaiveDate, today: NaiveDate) -> i64 {
    (date - today).num_days()
}

/// `num_days` consecutive dates in ascending order, the last one being `end`.
#[must_use]
pub fn date_range_ending(end: NaiveDate, num_days: i64) -> Vec<NaiveDate> {
    if num_days <= 0 {
        return Vec::new();
    }
    (0..num_days)
        .rev()
        .filter_map(|offset| end.checked_sub_signed(Duration::days(offset)))
        .collect()
}

/// Number of days in `month` (1-12), or 0 for an invalid month.
#[must_use]
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return 0;
    };
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    next.map_or(0, |n| (n - first).num_days() as u32)
}

/// Weekday of the 1st of the month, 0 = Sunday. `None` for an invalid month.
#[must_use]
pub fn first_weekday(year: i32, month: u32) -> Option<u32> {
    NaiveDate::from_ymd_opt(year, month, 1).map(|d| d.weekday().num_days_from_sunday())
}

/// Every date of the month in order. Empty for an invalid month.
#[must_use]
pub fn month_dates(year: i32, month: u32) -> Vec<NaiveDate> {
    (1..=days_in_month(year, month))
        .filter_map(|day| NaiveDate::from_ymd_opt(year, month, day))
        .collect()
}
