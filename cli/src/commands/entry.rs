use anyhow::Result;

use daybook_core::models::DaySummary;
use daybook_core::service::DaybookService;

use super::helpers::{no_neg_zero, parse_date};

fn print_totals(action: &str, summary: &DaySummary) {
    let net = no_neg_zero(summary.net);
    println!(
        "{action} for {}. IN: {:.0} | OUT: {:.0} | NET: {net:.0} kcal",
        summary.date, summary.calories_in, summary.calories_out
    );
}

pub(crate) fn cmd_log(
    svc: &DaybookService,
    entry_type: &str,
    name: &str,
    calories: &str,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let date = parse_date(date)?;
    let summary = svc.add_entry(date, entry_type, name, calories)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        let name = name.trim();
        print_totals(&format!("Logged {entry_type} '{name}'"), &summary);
    }

    Ok(())
}

pub(crate) fn cmd_edit(
    svc: &DaybookService,
    id: &str,
    entry_type: &str,
    name: &str,
    calories: &str,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let date = parse_date(date)?;
    let summary = svc.update_entry(date, id, entry_type, name, calories)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_totals(&format!("Updated entry {id}"), &summary);
    }

    Ok(())
}

pub(crate) fn cmd_delete(
    svc: &DaybookService,
    id: &str,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let date = parse_date(date)?;
    let summary = svc.delete_entry(date, id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_totals(&format!("Deleted entry {id}"), &summary);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delete_missing_entry_is_an_error() {
        let svc = DaybookService::new_in_memory().unwrap();
        let err = cmd_delete(&svc, "missing", Some("2024-06-10".into()), true).unwrap_err();
        assert!(format!("{err:#}").contains("Entry not found: missing"));
    }

    #[test]
    fn test_write_commands_fail_alike_on_bad_input() {
        let svc = DaybookService::new_in_memory().unwrap();
        let date = || Some("2024-06-10".to_string());
        assert!(cmd_log(&svc, "snack", "Chips", "200", date(), false).is_err());
        assert!(cmd_edit(&svc, "missing", "food", "Chips", "200", date(), false).is_err());
        assert!(cmd_delete(&svc, "missing", date(), false).is_err());
    }

    #[test]
    fn test_delete_logged_entry() {
        let svc = DaybookService::new_in_memory().unwrap();
        let date = daybook_core::dates::parse_date_local("2024-06-10").unwrap();
        let summary = svc.add_entry(date, "food", "Chips", "200").unwrap();
        let id = summary.entries[0].id.clone();

        cmd_delete(&svc, &id, Some("2024-06-10".into()), false).unwrap();
        assert!(svc.get_day_summary(date).entries.is_empty());
    }
}
