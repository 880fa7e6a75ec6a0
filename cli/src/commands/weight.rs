use anyhow::Result;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use daybook_core::dates::today_local_date;
use daybook_core::goals::average_weight;
use daybook_core::models::WeightDay;
use daybook_core::service::DaybookService;

use super::helpers::{format_weight, parse_date, parse_month};

pub(crate) fn cmd_weight_set(
    svc: &DaybookService,
    value: &str,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let date = parse_date(date)?;
    let summary = svc.update_weight(date, value)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "Logged weight {} for {}",
            format_weight(summary.weight),
            summary.date
        );
        if let Some(progress) = svc.target_progress(summary.weight, today_local_date()) {
            println!("  {}", progress.describe());
        }
    }

    Ok(())
}

pub(crate) fn cmd_weight_clear(svc: &DaybookService, date: Option<String>, json: bool) -> Result<()> {
    let date = parse_date(date)?;
    let summary = svc.update_weight(date, "")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("Cleared weight for {}", summary.date);
    }

    Ok(())
}

pub(crate) fn cmd_weight_trend(
    svc: &DaybookService,
    days: u32,
    end: Option<String>,
    json: bool,
) -> Result<()> {
    let end = parse_date(end)?;
    let series = svc.weight_trend(end, i64::from(days));
    print_weights(&series, json)
}

pub(crate) fn cmd_weight_month(svc: &DaybookService, month: Option<String>, json: bool) -> Result<()> {
    let (year, month) = parse_month(month)?;
    let series = svc.month_weights(year, month);
    print_weights(&series, json)
}

fn print_weights(series: &[WeightDay], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(series)?);
        return Ok(());
    }

    if series.iter().all(|d| d.weight.is_none()) {
        eprintln!("No weights recorded. Use `daybook weight set` to record your weight.");
        return Ok(());
    }

    #[derive(Tabled)]
    struct WeightRow {
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Weight")]
        weight: String,
    }

    let rows: Vec<WeightRow> = series
        .iter()
        .map(|d| WeightRow {
            date: d.date.clone(),
            weight: format_weight(d.weight),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{table}");

    if let Some(avg) = average_weight(series) {
        println!("  Average: {avg:.1}");
    }

    Ok(())
}
