use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::dates::parse_date_local;
use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Food,
    Exercise,
}

impl EntryType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EntryType::Food => "food",
            EntryType::Exercise => "exercise",
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "food" => Ok(EntryType::Food),
            "exercise" => Ok(EntryType::Exercise),
            other => Err(ValidationError::UnknownEntryType(other.to_string())),
        }
    }
}

/// One calendar day in the ledger. `date` is unique across all days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Day {
    pub id: String,
    pub date: String,
    pub weight: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: String,
    pub day_id: String,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    pub name: String,
    pub calories: f64,
    pub created_at: String,
}

impl Entry {
    /// Distance encoded in an exercise name ("3.5 miles", "1 mile").
    /// Food entries never carry a distance.
    #[must_use]
    pub fn miles_distance(&self) -> Option<f64> {
        match self.entry_type {
            EntryType::Exercise => parse_miles(&self.name),
            EntryType::Food => None,
        }
    }
}

static MILES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)([0-9]+\.?[0-9]*)\s*miles?").expect("valid miles regex"));

/// Pull the first "<N> mile(s)" distance out of free text.
#[must_use]
pub fn parse_miles(name: &str) -> Option<f64> {
    MILES_RE
        .captures(name)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// A validated entry ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEntry {
    pub entry_type: EntryType,
    pub name: String,
    pub calories: f64,
}

impl NewEntry {
    /// Validate raw form input: a known type, a non-blank name and a positive
    /// calorie amount. The name is stored trimmed.
    pub fn parse(entry_type: &str, name: &str, calories: &str) -> Result<Self, ValidationError> {
        let name = validate_required(name, "name")?;
        let entry_type = entry_type.parse::<EntryType>()?;
        let calories = parse_positive_number(calories, "calorie amount")?;
        Ok(Self {
            entry_type,
            name: name.to_string(),
            calories,
        })
    }
}

/// Running calorie totals for one day.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CalorieTotals {
    pub calories_in: f64,
    pub calories_out: f64,
}

impl CalorieTotals {
    pub fn add(&mut self, entry: &Entry) {
        match entry.entry_type {
            EntryType::Food => self.calories_in += entry.calories,
            EntryType::Exercise => self.calories_out += entry.calories,
        }
    }

    #[must_use]
    pub fn net(&self) -> f64 {
        self.calories_in - self.calories_out
    }
}

impl<'a> FromIterator<&'a Entry> for CalorieTotals {
    fn from_iter<I: IntoIterator<Item = &'a Entry>>(iter: I) -> Self {
        let mut totals = CalorieTotals::default();
        for entry in iter {
            totals.add(entry);
        }
        totals
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySummary {
    pub date: String,
    pub entries: Vec<Entry>,
    pub calories_in: f64,
    pub calories_out: f64,
    pub net: f64,
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl DaySummary {
    /// Zero summary for a date with nothing recorded.
    #[must_use]
    pub fn empty(date: &str) -> Self {
        Self {
            date: date.to_string(),
            entries: Vec::new(),
            calories_in: 0.0,
            calories_out: 0.0,
            net: 0.0,
            weight: None,
            notes: None,
        }
    }

    /// Build a summary from a day row and its full entry list.
    #[must_use]
    pub fn from_day(day: &Day, entries: Vec<Entry>) -> Self {
        let totals: CalorieTotals = entries.iter().collect();
        Self {
            date: day.date.clone(),
            calories_in: totals.calories_in,
            calories_out: totals.calories_out,
            net: totals.net(),
            weight: day.weight,
            notes: day.notes.clone(),
            entries,
        }
    }
}

/// Read-only numbers for today, as a home-screen glance shows them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TodaySnapshot {
    pub date: String,
    pub net: f64,
    pub calories_in: f64,
    pub calories_out: f64,
    pub weight: Option<f64>,
}

impl TodaySnapshot {
    #[must_use]
    pub fn empty(date: &str) -> Self {
        Self {
            date: date.to_string(),
            net: 0.0,
            calories_in: 0.0,
            calories_out: 0.0,
            weight: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendDay {
    pub date: String,
    pub net: f64,
    pub calories_in: f64,
    pub calories_out: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthDay {
    pub date: String,
    pub net: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MilesDay {
    pub date: String,
    pub miles: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightDay {
    pub date: String,
    pub weight: Option<f64>,
}

// --- Form validation ---

pub fn validate_required<'a>(value: &'a str, field: &str) -> Result<&'a str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(trimmed)
}

/// Parse a strictly positive, finite number.
pub fn parse_positive_number(value: &str, field: &str) -> Result<f64, ValidationError> {
    match value.trim().parse::<f64>() {
        Ok(n) if n.is_finite() && n > 0.0 => Ok(n),
        _ => Err(ValidationError::InvalidNumber {
            field: field.to_string(),
        }),
    }
}

/// Accept only a real calendar date written exactly as `YYYY-MM-DD`.
pub fn validate_date(value: &str) -> Result<NaiveDate, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::Required {
            field: "date".to_string(),
        });
    }
    let shaped = value.len() == 10
        && value.char_indices().all(|(i, c)| match i {
            4 | 7 => c == '-',
            _ => c.is_ascii_digit(),
        });
    if !shaped {
        return Err(ValidationError::InvalidDate);
    }
    parse_date_local(value).map_err(|_| ValidationError::InvalidDate)
}

/// Validate the target weight form: a positive weight and a date.
pub fn validate_target(weight: &str, date: &str) -> Result<(f64, NaiveDate), ValidationError> {
    let weight = parse_positive_number(weight, "target weight")?;
    let date = validate_date(date)?;
    Ok((weight, date))
}
