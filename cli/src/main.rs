mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

use crate::commands::{
    cmd_calendar, cmd_day, cmd_days, cmd_delete, cmd_edit, cmd_log, cmd_migrate, cmd_miles,
    cmd_notes, cmd_settings_bmr, cmd_settings_clear_target, cmd_settings_show,
    cmd_settings_target, cmd_settings_theme, cmd_today, cmd_trend, cmd_weight_clear,
    cmd_weight_month, cmd_weight_set, cmd_weight_trend,
};
use crate::config::Config;
use daybook_core::dates::today_local_date;
use daybook_core::service::DaybookService;

const LOG_ENV: &str = "DAYBOOK_LOG";
/// Ten years of days, the longest range a trend command accepts.
const MAX_DAYS: u32 = 3660;

fn days_parser() -> clap::builder::RangedI64ValueParser<u32> {
    clap::value_parser!(u32).range(1..=i64::from(MAX_DAYS))
}

#[derive(Parser)]
#[command(
    name = "daybook",
    version,
    about = "A local-first calorie and weight ledger",
    long_about = "A local-first calorie and weight ledger.\n\n\
        Every day is keyed by your local calendar date. Food adds calories,\n\
        exercise burns them, and net = in - out."
)]
struct Cli {
    /// Database file (default: daybook.db in the platform data directory)
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show today's net calories, weight and target progress
    Today {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show every entry and the totals for a day (defaults to today)
    Day {
        /// Date to show (YYYY-MM-DD or today/yesterday/tomorrow, default: today)
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Log a food or exercise entry
    Log {
        /// Entry type: food or exercise
        entry_type: String,
        /// What you ate or did (e.g. "Oatmeal", "Run 3 miles")
        name: String,
        /// Calories eaten or burned
        #[arg(allow_hyphen_values = true)]
        calories: String,
        /// Date to log for (YYYY-MM-DD or today/yesterday/tomorrow, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Rewrite an existing entry
    Edit {
        /// Entry ID
        id: String,
        /// Entry type: food or exercise
        entry_type: String,
        /// New name
        name: String,
        /// New calorie amount
        #[arg(allow_hyphen_values = true)]
        calories: String,
        /// Date the entry belongs to (default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete an entry by ID
    Delete {
        /// Entry ID
        id: String,
        /// Date the entry belongs to (default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Save notes for a day (an empty string clears them)
    Notes {
        /// Note text
        text: String,
        /// Date (YYYY-MM-DD or today/yesterday/tomorrow, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Track body weight
    Weight {
        #[command(subcommand)]
        command: WeightCommands,
    },
    /// Show net calories for the last N days
    Trend {
        /// Number of days to show (1-3660)
        #[arg(short, long, default_value = "7", value_parser = days_parser())]
        days: u32,
        /// Last day of the range (default: today)
        #[arg(long)]
        end: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show miles parsed from exercise entries for the last N days
    Miles {
        /// Number of days to show (1-3660)
        #[arg(short, long, default_value = "7", value_parser = days_parser())]
        days: u32,
        /// Last day of the range (default: today)
        #[arg(long)]
        end: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a month of net calories as a calendar
    Calendar {
        /// Month to show (YYYY-MM, default: this month)
        month: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// View or change BMR, target weight and theme
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },
    /// List every stored day with its ID
    Days {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Report the result of the UTC-to-local day date repair
    Migrate {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum WeightCommands {
    /// Record the weight for a day
    Set {
        /// Weight value
        #[arg(allow_hyphen_values = true)]
        value: String,
        /// Date (YYYY-MM-DD or today/yesterday/tomorrow, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove the weight for a day
    Clear {
        /// Date (YYYY-MM-DD or today/yesterday/tomorrow, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show recorded weights for the last N days
    Trend {
        /// Number of days to show (1-3660)
        #[arg(short, long, default_value = "7", value_parser = days_parser())]
        days: u32,
        /// Last day of the range (default: today)
        #[arg(long)]
        end: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show recorded weights for a month
    Month {
        /// Month to show (YYYY-MM, default: this month)
        month: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum SettingsCommands {
    /// Show all settings
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Set your BMR in kcal (an empty string clears it)
    Bmr {
        /// BMR value
        #[arg(allow_hyphen_values = true)]
        value: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Set a target weight and the date to reach it
    Target {
        /// Target weight
        #[arg(allow_hyphen_values = true)]
        weight: String,
        /// Target date (YYYY-MM-DD)
        date: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove the target weight and date
    ClearTarget {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Set the theme preference: light, dark or system
    Theme {
        /// Theme name
        theme: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.db)?;
    let svc = DaybookService::new(&config.db_path)?;
    tracing::debug!(path = %config.db_path.display(), "Opened database");

    let report = match svc.run_startup_migration(today_local_date()) {
        Ok(report) => report,
        Err(e) if matches!(cli.command, Commands::Migrate { .. }) => return Err(e),
        Err(e) => {
            eprintln!("Warning: day date repair failed and was rolled back: {e:#}");
            None
        }
    };
    if let Some(r) = report.as_ref().filter(|r| r.changed()) {
        eprintln!(
            "Repaired {} day(s) stored one day ahead",
            r.days_moved + r.days_merged
        );
    }

    match cli.command {
        Commands::Today { json } => cmd_today(&svc, json),
        Commands::Day { date, json } => cmd_day(&svc, date, json),
        Commands::Log {
            entry_type,
            name,
            calories,
            date,
            json,
        } => cmd_log(&svc, &entry_type, &name, &calories, date, json),
        Commands::Edit {
            id,
            entry_type,
            name,
            calories,
            date,
            json,
        } => cmd_edit(&svc, &id, &entry_type, &name, &calories, date, json),
        Commands::Delete { id, date, json } => cmd_delete(&svc, &id, date, json),
        Commands::Notes { text, date, json } => cmd_notes(&svc, &text, date, json),
        Commands::Weight { command } => match command {
            WeightCommands::Set { value, date, json } => cmd_weight_set(&svc, &value, date, json),
            WeightCommands::Clear { date, json } => cmd_weight_clear(&svc, date, json),
            WeightCommands::Trend { days, end, json } => cmd_weight_trend(&svc, days, end, json),
            WeightCommands::Month { month, json } => cmd_weight_month(&svc, month, json),
        },
        Commands::Trend { days, end, json } => cmd_trend(&svc, days, end, json),
        Commands::Miles { days, end, json } => cmd_miles(&svc, days, end, json),
        Commands::Calendar { month, json } => cmd_calendar(&svc, month, json),
        Commands::Settings { command } => match command {
            SettingsCommands::Show { json } => cmd_settings_show(&svc, json),
            SettingsCommands::Bmr { value, json } => cmd_settings_bmr(&svc, &value, json),
            SettingsCommands::Target { weight, date, json } => {
                cmd_settings_target(&svc, &weight, &date, json)
            }
            SettingsCommands::ClearTarget { json } => cmd_settings_clear_target(&svc, json),
            SettingsCommands::Theme { theme, json } => cmd_settings_theme(&svc, &theme, json),
        },
        Commands::Days { json } => cmd_days(&svc, json),
        Commands::Migrate { json } => cmd_migrate(&svc, report.as_ref(), json),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("daybook").chain(args.iter().copied()))
    }

    #[test]
    fn test_days_default() {
        let cli = parse(&["trend"]).unwrap();
        assert!(matches!(cli.command, Commands::Trend { days: 7, .. }));
    }

    #[test]
    fn test_days_bounds() {
        assert!(parse(&["trend", "-d", "3660"]).is_ok());
        assert!(parse(&["trend", "-d", "4000000000"]).is_err());
        assert!(parse(&["miles", "--days", "0"]).is_err());
        assert!(parse(&["weight", "trend", "--days", "3661"]).is_err());
    }
}
