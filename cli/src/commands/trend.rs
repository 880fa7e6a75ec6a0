use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt::Write;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use daybook_core::goals::{DeficitStatus, average_miles, average_net};
use daybook_core::models::MonthDay;
use daybook_core::range::calendar_grid;
use daybook_core::service::DaybookService;

use super::helpers::{no_neg_zero, parse_date, parse_month};

pub(crate) fn cmd_trend(
    svc: &DaybookService,
    days: u32,
    end: Option<String>,
    json: bool,
) -> Result<()> {
    #[derive(Tabled)]
    struct TrendRow {
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "In")]
        calories_in: String,
        #[tabled(rename = "Out")]
        calories_out: String,
        #[tabled(rename = "Net")]
        net: String,
        #[tabled(rename = "vs BMR")]
        vs_bmr: String,
    }

    let end = parse_date(end)?;
    let series = svc.calorie_trend(end, i64::from(days));

    if json {
        println!("{}", serde_json::to_string_pretty(&series)?);
        return Ok(());
    }

    let bmr = svc.bmr();
    let rows: Vec<TrendRow> = series
        .iter()
        .map(|d| TrendRow {
            date: d.date.clone(),
            calories_in: format!("{:.0}", d.calories_in),
            calories_out: format!("{:.0}", d.calories_out),
            net: format!("{:.0}", no_neg_zero(d.net)),
            vs_bmr: bmr.map_or("-".into(), |b| format!("{:+.0}", no_neg_zero(d.net - b))),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{table}");

    if let Some(avg) = average_net(&series) {
        let label = match DeficitStatus::classify(avg, bmr) {
            DeficitStatus::Deficit => " (deficit)",
            DeficitStatus::Surplus => " (no deficit)",
            DeficitStatus::Unknown => "",
        };
        println!("  Average net calories: {:.0}{label}", no_neg_zero(avg.round()));
    }
    if bmr.is_none() {
        eprintln!("Set a BMR with `daybook settings bmr <VALUE>` to compare against it.");
    }

    Ok(())
}

pub(crate) fn cmd_miles(
    svc: &DaybookService,
    days: u32,
    end: Option<String>,
    json: bool,
) -> Result<()> {
    #[derive(Tabled)]
    struct MilesRow {
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Miles")]
        miles: String,
    }

    let end = parse_date(end)?;
    let series = svc.miles_trend(end, i64::from(days));

    if json {
        println!("{}", serde_json::to_string_pretty(&series)?);
        return Ok(());
    }

    let rows: Vec<MilesRow> = series
        .iter()
        .map(|d| MilesRow {
            date: d.date.clone(),
            miles: format!("{:.1}", d.miles),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{table}");

    let total: f64 = series.iter().map(|d| d.miles).sum();
    println!("  Total: {total:.1} miles");
    if let Some(avg) = average_miles(&series) {
        println!("  Average: {avg:.1} miles/day");
    }

    Ok(())
}

#[derive(Serialize)]
struct CalendarDay {
    #[serde(flatten)]
    day: MonthDay,
    status: DeficitStatus,
}

pub(crate) fn cmd_calendar(svc: &DaybookService, month: Option<String>, json: bool) -> Result<()> {
    let (year, month) = parse_month(month)?;
    let bmr = svc.bmr();
    let days: Vec<CalendarDay> = svc
        .month_net(year, month)
        .into_iter()
        .map(|day| CalendarDay {
            status: DeficitStatus::classify(day.net, bmr),
            day,
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&days)?);
        return Ok(());
    }

    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Ok(());
    };
    println!("{}\n", first.format("%B %Y"));
    println!("{}", render_grid(&calendar_grid(year, month), &days));
    if bmr.is_some() {
        println!("\n  - below BMR   + at or above BMR");
    }

    Ok(())
}

/// Seven columns, Sunday first. Each logged day shows its net calories.
fn render_grid(cells: &[Option<u32>], days: &[CalendarDay]) -> String {
    let mut out = String::new();
    for name in ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"] {
        let _ = write!(out, "{name:>10}");
    }
    for week in cells.chunks(7) {
        out.push('\n');
        for cell in week {
            match cell {
                Some(n) => {
                    let _ = write!(out, "{n:>10}");
                }
                None => out.push_str(&" ".repeat(10)),
            }
        }
        out.push('\n');
        for cell in week {
            let Some(n) = cell else {
                out.push_str(&" ".repeat(10));
                continue;
            };
            let idx = (*n - 1) as usize;
            let text = match days.get(idx) {
                Some(d) if d.day.net != 0.0 => {
                    let mark = match d.status {
                        DeficitStatus::Deficit => "-",
                        DeficitStatus::Surplus => "+",
                        DeficitStatus::Unknown => "",
                    };
                    format!("{:.0}{mark}", no_neg_zero(d.day.net))
                }
                _ => String::new(),
            };
            let _ = write!(out, "{text:>10}");
        }
    }
    out
}
