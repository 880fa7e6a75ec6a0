use anyhow::Result;

use daybook_core::dates::today_local_date;
use daybook_core::migration::{MigrationReport, SAMPLE_SIZE, check_if_migration_needed};
use daybook_core::service::DaybookService;

/// Report what the startup date repair did, and whether the recent days
/// still look shifted.
pub(crate) fn cmd_migrate(
    svc: &DaybookService,
    report: Option<&MigrationReport>,
    json: bool,
) -> Result<()> {
    let still_needed = check_if_migration_needed(svc.store(), today_local_date());

    if json {
        println!(
            "{}",
            serde_json::json!({
                "ran": report.is_some(),
                "report": report,
                "still_needed": still_needed,
            })
        );
        return Ok(());
    }

    match report {
        Some(r) => {
            println!(
                "Migrated day dates: {} scanned, {} moved, {} merged ({} entries reassigned)",
                r.days_scanned, r.days_moved, r.days_merged, r.entries_reassigned
            );
        }
        None => println!("No migration needed"),
    }
    if still_needed {
        eprintln!(
            "Most of the last {SAMPLE_SIZE} days are still one day ahead. Run `daybook days` to inspect them."
        );
    }

    Ok(())
}
