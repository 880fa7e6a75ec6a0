use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates::{format_date_local, parse_date_local};
use crate::error::ValidationError;
use crate::store::SettingsStore;

pub const BMR_KEY: &str = "bmr";
pub const TARGET_WEIGHT_KEY: &str = "targetWeight";
pub const TARGET_DATE_KEY: &str = "targetDate";
pub const THEME_KEY: &str = "themePreference";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    Light,
    Dark,
    #[default]
    System,
}

impl ThemePreference {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ThemePreference::Light => "light",
            ThemePreference::Dark => "dark",
            ThemePreference::System => "system",
        }
    }
}

impl fmt::Display for ThemePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemePreference {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(ThemePreference::Light),
            "dark" => Ok(ThemePreference::Dark),
            "system" => Ok(ThemePreference::System),
            other => Err(ValidationError::UnknownTheme(other.to_string())),
        }
    }
}

/// Typed view over the key/value settings table.
///
/// Setting a value to `None` deletes its key.
pub struct Settings<'a, S: SettingsStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: SettingsStore + ?Sized> Settings<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    fn get_f64(&self, key: &str) -> Result<Option<f64>> {
        match self.store.get_setting(key)? {
            Some(v) => Ok(Some(
                v.trim()
                    .parse::<f64>()
                    .with_context(|| format!("Setting '{key}' is not a number: '{v}'"))?,
            )),
            None => Ok(None),
        }
    }

    fn put(&self, key: &str, value: Option<String>) -> Result<()> {
        match value {
            Some(v) => self.store.set_setting(key, &v),
            None => self.store.delete_setting(key).map(|_| ()),
        }
    }

    pub fn bmr(&self) -> Result<Option<f64>> {
        self.get_f64(BMR_KEY)
    }

    pub fn set_bmr(&self, bmr: Option<f64>) -> Result<()> {
        self.put(BMR_KEY, bmr.map(|v| v.to_string()))
    }

    pub fn target_weight(&self) -> Result<Option<f64>> {
        self.get_f64(TARGET_WEIGHT_KEY)
    }

    pub fn set_target_weight(&self, weight: Option<f64>) -> Result<()> {
        self.put(TARGET_WEIGHT_KEY, weight.map(|v| v.to_string()))
    }

    pub fn target_date(&self) -> Result<Option<NaiveDate>> {
        match self.store.get_setting(TARGET_DATE_KEY)? {
            Some(v) => Ok(Some(parse_date_local(&v).with_context(|| {
                format!("Setting '{TARGET_DATE_KEY}' is not a date: '{v}'")
            })?)),
            None => Ok(None),
        }
    }

    pub fn set_target_date(&self, date: Option<NaiveDate>) -> Result<()> {
        self.put(TARGET_DATE_KEY, date.map(format_date_local))
    }

    /// Update target weight and date together.
    pub fn set_target(&self, weight: Option<f64>, date: Option<NaiveDate>) -> Result<()> {
        self.set_target_weight(weight)?;
        self.set_target_date(date)
    }

    /// Unknown stored values read as `System`.
    pub fn theme_preference(&self) -> Result<ThemePreference> {
        Ok(self
            .store
            .get_setting(THEME_KEY)?
            .and_then(|v| v.parse().ok())
            .unwrap_or_default())
    }

    pub fn set_theme_preference(&self, theme: ThemePreference) -> Result<()> {
        self.store.set_setting(THEME_KEY, theme.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    #[test]
    fn test_bmr_set_get_clear() {
        let db = Database::open_in_memory().unwrap();
        let settings = Settings::new(&db);

        assert!(settings.bmr().unwrap().is_none());

        settings.set_bmr(Some(1850.0)).unwrap();
        let bmr = settings.bmr().unwrap().unwrap();
        assert!((bmr - 1850.0).abs() < f64::EPSILON);
        assert_eq!(db.get_setting(BMR_KEY).unwrap().as_deref(), Some("1850"));

        settings.set_bmr(None).unwrap();
        assert!(settings.bmr().unwrap().is_none());
        assert!(db.get_setting(BMR_KEY).unwrap().is_none());

        // Clearing an unset value is fine
        settings.set_bmr(None).unwrap();
    }

    #[test]
    fn test_bmr_not_a_number() {
        let db = Database::open_in_memory().unwrap();
        db.set_setting(BMR_KEY, "lots").unwrap();
        assert!(Settings::new(&db).bmr().is_err());
    }

    #[test]
    fn test_target_round_trip() {
        let db = Database::open_in_memory().unwrap();
        let settings = Settings::new(&db);
        let date = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();

        settings.set_target(Some(165.5), Some(date)).unwrap();
        assert_eq!(settings.target_weight().unwrap(), Some(165.5));
        assert_eq!(settings.target_date().unwrap(), Some(date));
        assert_eq!(
            db.get_setting(TARGET_DATE_KEY).unwrap().as_deref(),
            Some("2024-12-31")
        );

        settings.set_target(None, None).unwrap();
        assert!(settings.target_weight().unwrap().is_none());
        assert!(settings.target_date().unwrap().is_none());
    }

    #[test]
    fn test_theme_preference() {
        let db = Database::open_in_memory().unwrap();
        let settings = Settings::new(&db);
        assert_eq!(settings.theme_preference().unwrap(), ThemePreference::System);

        settings.set_theme_preference(ThemePreference::Dark).unwrap();
        assert_eq!(settings.theme_preference().unwrap(), ThemePreference::Dark);
        assert_eq!(db.get_setting(THEME_KEY).unwrap().as_deref(), Some("dark"));

        db.set_setting(THEME_KEY, "sepia").unwrap();
        assert_eq!(settings.theme_preference().unwrap(), ThemePreference::System);
    }

    #[test]
    fn test_theme_parse() {
        assert_eq!("LIGHT".parse::<ThemePreference>().unwrap(), ThemePreference::Light);
        assert!(matches!(
            "sepia".parse::<ThemePreference>(),
            Err(ValidationError::UnknownTheme(_))
        ));
    }
}
