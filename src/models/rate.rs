//! Rate definitions and time-window predicates.
//!
//! This module defines the [`Rate`] struct used by the rate catalog: the
//! base hourly rate, multiplier-based surcharges with optional time
//! windows, and flat amount/hours entries for absences and bonuses.

use chrono::Weekday;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};

/// The classification a rate applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateClass {
    /// Plain worked time and catch-all entries such as the monthly bonus.
    Manual,
    /// Weekday night surcharges.
    Night,
    /// Saturday and Sunday surcharges.
    Weekend,
    /// Public holiday surcharges.
    Holiday,
    /// Sick-day fixed rates.
    Sick,
    /// Vacation-day fixed rates.
    Vacation,
}

/// A predicate over weekday set and hour-of-day.
///
/// Weekday numbers follow the 0–6 convention with 0 = Sunday. Resolution
/// matches on `hour >= start_hour` within the listed days; `end_hour` is
/// kept for display and validated for sanity but does not bound matching.
///
/// # Example
///
/// ```
/// use timeclock_engine::models::TimeWindow;
/// use chrono::Weekday;
///
/// let night = TimeWindow { days: vec![1, 2, 3, 4, 5], start_hour: 21, end_hour: 24 };
/// assert!(night.matches(Weekday::Tue, 22));
/// assert!(!night.matches(Weekday::Tue, 20));
/// assert!(!night.matches(Weekday::Sun, 22));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Weekday numbers 0–6, 0 = Sunday.
    pub days: Vec<u8>,
    /// Hour of day (0–23) from which the window matches.
    pub start_hour: u32,
    /// Hour of day (1–24) the window nominally ends at.
    pub end_hour: u32,
}

impl TimeWindow {
    /// Returns true when the window covers the given weekday at all.
    pub fn covers_day(&self, weekday: Weekday) -> bool {
        self.days.contains(&(weekday.num_days_from_sunday() as u8))
    }

    /// Returns true when the window matches the given weekday and hour.
    pub fn matches(&self, weekday: Weekday, hour: u32) -> bool {
        self.covers_day(weekday) && hour >= self.start_hour
    }

    /// Validates day numbers and hour bounds.
    pub fn validate(&self) -> EngineResult<()> {
        if self.days.is_empty() {
            return Err(EngineError::validation("window.days", "must not be empty"));
        }
        if let Some(day) = self.days.iter().find(|d| **d > 6) {
            return Err(EngineError::validation(
                "window.days",
                format!("weekday number {day} is out of range 0-6"),
            ));
        }
        if self.start_hour > 23 {
            return Err(EngineError::validation(
                "window.start_hour",
                "must be between 0 and 23",
            ));
        }
        if self.end_hour > 24 || self.end_hour <= self.start_hour {
            return Err(EngineError::validation(
                "window.end_hour",
                "must be after start_hour and at most 24",
            ));
        }
        Ok(())
    }
}

/// A rate definition managed by administrators.
///
/// Exactly one rate system-wide may carry `is_base_rate`; surcharge rates
/// carry a `multiplier`; absence and bonus rates carry the mutually
/// associated `fixed_amount`/`fixed_hours` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rate {
    /// Unique identifier for the rate.
    pub id: Uuid,
    /// Unique short code, e.g. `"night"` or `"monthly_bonus"`.
    pub code: String,
    /// Human-readable display label.
    pub label: String,
    /// The classification this rate applies to.
    pub applies_to: RateClass,
    /// Surcharge multiplier as a fraction, e.g. 1.25 = +25 %.
    #[serde(default)]
    pub multiplier: Option<Decimal>,
    /// Plain hourly amount. Only meaningful on the base rate.
    #[serde(default)]
    pub hourly_amount: Option<Decimal>,
    /// Optional time-window predicate. Absence means the rate always
    /// matches within its class.
    #[serde(default)]
    pub window: Option<TimeWindow>,
    /// Marks the single system-wide base rate.
    #[serde(default)]
    pub is_base_rate: bool,
    /// Flat amount for absence/bonus entries.
    #[serde(default)]
    pub fixed_amount: Option<Decimal>,
    /// Hours credited together with `fixed_amount`.
    #[serde(default)]
    pub fixed_hours: Option<Decimal>,
    /// Sort key: lower sorts first among candidates of the same class and
    /// drives display ordering. Precedence between classes is fixed by the
    /// resolution algorithm, not by this field.
    #[serde(default)]
    pub priority: i32,
}

impl Rate {
    /// Returns true when the rate's window matches the given weekday and
    /// hour, or when it has no window at all.
    pub fn matches_instant(&self, weekday: Weekday, hour: u32) -> bool {
        match &self.window {
            Some(window) => window.matches(weekday, hour),
            None => true,
        }
    }

    /// Returns true when the rate's window covers the given weekday, or
    /// when it has no window at all.
    pub fn covers_day(&self, weekday: Weekday) -> bool {
        match &self.window {
            Some(window) => window.covers_day(weekday),
            None => true,
        }
    }

    /// Validates internal consistency of the definition.
    pub fn validate(&self) -> EngineResult<()> {
        if self.code.trim().is_empty() {
            return Err(EngineError::validation("code", "must not be empty"));
        }
        if self.is_base_rate && self.hourly_amount.is_none() {
            return Err(EngineError::validation(
                "hourly_amount",
                "the base rate requires an hourly amount",
            ));
        }
        if self.fixed_amount.is_some() != self.fixed_hours.is_some() {
            return Err(EngineError::validation(
                "fixed_amount",
                "fixed_amount and fixed_hours must be set together",
            ));
        }
        if let Some(multiplier) = self.multiplier {
            if multiplier <= Decimal::ZERO {
                return Err(EngineError::validation("multiplier", "must be positive"));
            }
        }
        if let Some(window) = &self.window {
            window.validate()?;
        }
        Ok(())
    }
}
