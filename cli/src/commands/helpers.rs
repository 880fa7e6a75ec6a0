use anyhow::{Context, Result, bail};
use chrono::{Datelike, Duration, NaiveDate};
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use daybook_core::dates::today_local_date;
use daybook_core::models::{Entry, validate_date};

pub(crate) fn parse_date(date_str: Option<String>) -> Result<NaiveDate> {
    let today = today_local_date();
    match date_str {
        None => Ok(today),
        Some(s) => match s.as_str() {
            "today" => Ok(today),
            "yesterday" => Ok(today - Duration::days(1)),
            "tomorrow" => Ok(today + Duration::days(1)),
            _ => validate_date(&s).with_context(|| {
                format!("Invalid date '{s}'. Use YYYY-MM-DD or today/yesterday/tomorrow")
            }),
        },
    }
}

/// Parse `YYYY-MM`, defaulting to the current month.
pub(crate) fn parse_month(month_str: Option<String>) -> Result<(i32, u32)> {
    let Some(s) = month_str else {
        let today = today_local_date();
        return Ok((today.year(), today.month()));
    };
    let Some((y, m)) = s.trim().split_once('-') else {
        bail!("Invalid month '{s}'. Use YYYY-MM");
    };
    let year: i32 = y
        .parse()
        .with_context(|| format!("Invalid year in month '{s}'"))?;
    let month: u32 = m
        .parse()
        .with_context(|| format!("Invalid month in '{s}'"))?;
    if !(1..=12).contains(&month) {
        bail!("Month must be between 01 and 12, got '{m}'");
    }
    Ok((year, month))
}

pub(crate) fn print_entry_table(entries: &[Entry]) {
    #[derive(Tabled)]
    struct EntryRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Type")]
        entry_type: String,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Calories")]
        calories: String,
    }

    let rows: Vec<EntryRow> = entries
        .iter()
        .map(|e| EntryRow {
            id: e.id.clone(),
            entry_type: e.entry_type.to_string(),
            name: truncate(&e.name, 35),
            calories: format!("{:.0}", e.calories),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(3..)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

pub(crate) fn format_weight(weight: Option<f64>) -> String {
    weight.map_or("-".into(), |w| format!("{w:.1}"))
}

pub(crate) fn no_neg_zero(v: f64) -> f64 {
    if v == 0.0 { 0.0 } else { v }
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let end = s.char_indices().nth(max - 3).map_or(s.len(), |(i, _)| i);
        format!("{}...", &s[..end])
    }
}
