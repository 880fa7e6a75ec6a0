//! Derived figures that compare logged data against the user's BMR and
//! target weight. Nothing here touches storage.

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{MilesDay, TrendDay, WeightDay};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeficitStatus {
    Deficit,
    Surplus,
    Unknown,
}

impl DeficitStatus {
    /// A day is in deficit when its net calories fall below BMR.
    #[must_use]
    pub fn classify(net: f64, bmr: Option<f64>) -> Self {
        match bmr {
            Some(bmr) if net < bmr => DeficitStatus::Deficit,
            Some(_) => DeficitStatus::Surplus,
            None => DeficitStatus::Unknown,
        }
    }
}

/// Mean net calories over a series, `None` when the series is empty.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn average_net(series: &[TrendDay]) -> Option<f64> {
    if series.is_empty() {
        return None;
    }
    let total: f64 = series.iter().map(|d| d.net).sum();
    Some(total / series.len() as f64)
}

/// Mean miles per day over the whole range. Days without a run count as zero.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn average_miles(series: &[MilesDay]) -> Option<f64> {
    if series.is_empty() {
        return None;
    }
    let total: f64 = series.iter().map(|d| d.miles).sum();
    Some(total / series.len() as f64)
}

/// Mean of the recorded weights only; `None` when no day has one.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn average_weight(series: &[WeightDay]) -> Option<f64> {
    let (total, count) = series
        .iter()
        .filter_map(|d| d.weight)
        .fold((0.0, 0usize), |(total, count), w| (total + w, count + 1));
    (count > 0).then(|| total / count as f64)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetDirection {
    Lose,
    Gain,
    Reached,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetProgress {
    pub target_weight: f64,
    pub target_date: NaiveDate,
    pub direction: TargetDirection,
    /// Absolute distance between current and target weight.
    pub remaining: f64,
    /// Pounds per week needed to hit the target on time. Only present while
    /// the target date is ahead and the goal isn't reached.
    pub weekly_rate: Option<f64>,
}

impl TargetProgress {
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::float_cmp)]
    pub fn compute(
        weight: f64,
        target_weight: f64,
        target_date: NaiveDate,
        today: NaiveDate,
    ) -> Self {
        let direction = if weight > target_weight {
            TargetDirection::Lose
        } else if weight < target_weight {
            TargetDirection::Gain
        } else {
            TargetDirection::Reached
        };
        let remaining = (weight - target_weight).abs();

        let weeks = (target_date - today).num_days() as f64 / 7.0;
        let weekly_rate =
            (weeks > 0.0 && direction != TargetDirection::Reached).then(|| remaining / weeks);

        Self {
            target_weight,
            target_date,
            direction,
            remaining,
            weekly_rate,
        }
    }

    #[must_use]
    pub fn describe(&self) -> String {
        match self.direction {
            TargetDirection::Lose => format!("{:.1} lbs to lose", self.remaining),
            TargetDirection::Gain => format!("{:.1} lbs to gain", self.remaining),
            TargetDirection::Reached => "Goal reached!".to_string(),
        }
    }
}
