mod day;
mod entry;
mod helpers;
mod migrate;
mod settings;
mod trend;
mod weight;

pub(crate) use day::{cmd_day, cmd_days, cmd_notes, cmd_today};
pub(crate) use entry::{cmd_delete, cmd_edit, cmd_log};
pub(crate) use migrate::cmd_migrate;
pub(crate) use settings::{
    cmd_settings_bmr, cmd_settings_clear_target, cmd_settings_show, cmd_settings_target,
    cmd_settings_theme,
};
pub(crate) use trend::{cmd_calendar, cmd_miles, cmd_trend};
pub(crate) use weight::{cmd_weight_clear, cmd_weight_month, cmd_weight_set, cmd_weight_trend};
