use anyhow::Result;
use serde::Serialize;

use daybook_core::settings::ThemePreference;
use daybook_core::service::DaybookService;

pub(crate) fn cmd_settings_show(svc: &DaybookService, json: bool) -> Result<()> {
    #[derive(Serialize)]
    struct SettingsView {
        bmr: Option<f64>,
        target_weight: Option<f64>,
        target_date: Option<String>,
        theme: ThemePreference,
    }

    let target = svc.target();
    let view = SettingsView {
        bmr: svc.bmr(),
        target_weight: target.map(|(w, _)| w),
        target_date: target.map(|(_, d)| d.to_string()),
        theme: svc.theme_preference(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    let bmr = view.bmr.map_or("not set".into(), |b| format!("{b:.0} kcal"));
    println!("  BMR:    {bmr}");
    match (view.target_weight, &view.target_date) {
        (Some(w), Some(d)) => println!("  Target: {w:.1} by {d}"),
        _ => println!("  Target: not set"),
    }
    println!("  Theme:  {}", view.theme);

    Ok(())
}

/// An empty value clears the BMR.
pub(crate) fn cmd_settings_bmr(svc: &DaybookService, value: &str, json: bool) -> Result<()> {
    let bmr = svc.set_bmr(value)?;

    if json {
        println!("{}", serde_json::json!({ "bmr": bmr }));
    } else if let Some(b) = bmr {
        println!("BMR set to {b:.0} kcal");
    } else {
        println!("BMR cleared");
    }

    Ok(())
}

pub(crate) fn cmd_settings_target(
    svc: &DaybookService,
    weight: &str,
    date: &str,
    json: bool,
) -> Result<()> {
    let (weight, date) = svc.set_target(weight, date)?;

    if json {
        println!(
            "{}",
            serde_json::json!({ "target_weight": weight, "target_date": date.to_string() })
        );
    } else {
        println!("Target set: {weight:.1} by {date}");
    }

    Ok(())
}

pub(crate) fn cmd_settings_clear_target(svc: &DaybookService, json: bool) -> Result<()> {
    svc.clear_target()?;

    if json {
        println!("{}", serde_json::json!({ "cleared": "target" }));
    } else {
        println!("Target cleared");
    }

    Ok(())
}

pub(crate) fn cmd_settings_theme(svc: &DaybookService, theme: &str, json: bool) -> Result<()> {
    let theme = svc.set_theme_preference(theme)?;

    if json {
        println!("{}", serde_json::json!({ "theme": theme }));
    } else {
        println!("Theme set to {theme}");
    }

    Ok(())
}
