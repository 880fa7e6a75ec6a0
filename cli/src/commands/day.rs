use anyhow::Result;
use serde::Serialize;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use daybook_core::dates::today_local_date;
use daybook_core::goals::{DeficitStatus, TargetProgress};
use daybook_core::models::{EntryType, TodaySnapshot};
use daybook_core::service::DaybookService;

use super::helpers::{format_weight, no_neg_zero, parse_date, print_entry_table};

pub(crate) fn cmd_today(svc: &DaybookService, json: bool) -> Result<()> {
    #[derive(Serialize)]
    struct TodayView {
        #[serde(flatten)]
        snapshot: TodaySnapshot,
        bmr: Option<f64>,
        status: DeficitStatus,
        target: Option<TargetProgress>,
    }

    let snapshot = svc.today_snapshot();
    let view = TodayView {
        bmr: svc.bmr(),
        status: svc.deficit_status(snapshot.net),
        target: svc.target_progress(snapshot.weight, today_local_date()),
        snapshot,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    let s = &view.snapshot;
    let net = no_neg_zero(s.net);
    println!("=== Today ({}) ===\n", s.date);
    println!("  NET: {net:.0} kcal");
    println!(
        "  IN: {:.0} kcal | OUT: {:.0} kcal",
        s.calories_in, s.calories_out
    );
    if let Some(bmr) = view.bmr {
        let label = match view.status {
            DeficitStatus::Deficit => "deficit",
            DeficitStatus::Surplus => "no deficit",
            DeficitStatus::Unknown => "unknown",
        };
        println!("  BMR: {bmr:.0} kcal ({label})");
    }
    println!("  WEIGHT: {}", format_weight(s.weight));

    if let Some(target) = &view.target {
        println!(
            "\n  TARGET: {:.1} by {}",
            target.target_weight, target.target_date
        );
        println!("    {}", target.describe());
        if let Some(rate) = target.weekly_rate {
            println!("    Estimated change/week: {rate:.2}");
        }
    }

    Ok(())
}

pub(crate) fn cmd_day(svc: &DaybookService, date: Option<String>, json: bool) -> Result<()> {
    let date = parse_date(date)?;
    let summary = svc.get_day_summary(date);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("=== {} ===\n", summary.date);

    if summary.entries.is_empty() {
        println!("  No entries");
    } else {
        print_entry_table(&summary.entries);
    }

    let food = summary
        .entries
        .iter()
        .filter(|e| e.entry_type == EntryType::Food)
        .count();
    let exercise = summary.entries.len() - food;
    let net = no_neg_zero(summary.net);
    println!();
    println!(
        "  IN: {:.0} kcal ({food} food) | OUT: {:.0} kcal ({exercise} exercise) | NET: {net:.0} kcal",
        summary.calories_in, summary.calories_out
    );
    println!("  WEIGHT: {}", format_weight(summary.weight));
    if let Some(notes) = &summary.notes {
        println!("  NOTES: {notes}");
    }

    Ok(())
}

pub(crate) fn cmd_notes(
    svc: &DaybookService,
    text: &str,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let date = parse_date(date)?;
    let summary = svc.update_notes(date, text)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else if summary.notes.is_some() {
        println!("Saved notes for {}", summary.date);
    } else {
        println!("Cleared notes for {}", summary.date);
    }

    Ok(())
}

pub(crate) fn cmd_days(svc: &DaybookService, json: bool) -> Result<()> {
    let days = svc.list_days();

    if json {
        println!("{}", serde_json::to_string_pretty(&days)?);
        return Ok(());
    }

    if days.is_empty() {
        eprintln!("No days recorded yet. Use `daybook log` to add an entry.");
        return Ok(());
    }

    #[derive(Tabled)]
    struct DayRow {
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Weight")]
        weight: String,
    }

    let rows: Vec<DayRow> = days
        .iter()
        .map(|d| DayRow {
            date: d.date.clone(),
            id: d.id.clone(),
            weight: format_weight(d.weight),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..)).with(Alignment::right()))
        .to_string();
    println!("{table}");

    Ok(())
}
