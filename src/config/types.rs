//! Configuration types for the time tracking engine.
//!
//! This module contains the engine settings plus the seed structures that
//! are deserialized from YAML provisioning files.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{Holiday, Rate, RateClass, TimeWindow};

/// Engine-wide settings.
///
/// The flat tax rate is an illustrative constant for net-earnings
/// estimation, explicitly not a tax computation. The UTC offset converts
/// stored instants into the local wall time the surcharge windows and
/// day/month boundaries are expressed in.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// The region code holidays are looked up under.
    pub region: String,
    /// Flat net-earnings deduction as a fraction, e.g. 0.30.
    pub flat_tax_rate: Decimal,
    /// Offset from UTC, in minutes, of the local wall time.
    pub utc_offset_minutes: i32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            region: "default".to_string(),
            flat_tax_rate: Decimal::new(30, 2),
            utc_offset_minutes: 0,
        }
    }
}

impl EngineSettings {
    /// Converts a stored UTC instant into local wall time.
    pub fn to_local(&self, at: DateTime<Utc>) -> NaiveDateTime {
        (at + Duration::minutes(i64::from(self.utc_offset_minutes))).naive_utc()
    }

    /// The factor gross earnings are multiplied by to estimate net
    /// earnings.
    pub fn net_factor(&self) -> Decimal {
        Decimal::ONE - self.flat_tax_rate
    }

    /// Validates value ranges.
    pub fn validate(&self) -> EngineResult<()> {
        if self.region.trim().is_empty() {
            return Err(EngineError::validation("region", "must not be empty"));
        }
        if self.flat_tax_rate < Decimal::ZERO || self.flat_tax_rate >= Decimal::ONE {
            return Err(EngineError::validation(
                "flat_tax_rate",
                "must be at least 0 and below 1",
            ));
        }
        if self.utc_offset_minutes.abs() > 14 * 60 {
            return Err(EngineError::validation(
                "utc_offset_minutes",
                "must be within +-14 hours",
            ));
        }
        Ok(())
    }
}

/// One rate definition from `rates.yaml`, without a stored identity.
#[derive(Debug, Clone, Deserialize)]
pub struct RateSeed {
    /// Unique short code.
    pub code: String,
    /// Display label.
    pub label: String,
    /// The classification the rate applies to.
    pub applies_to: RateClass,
    /// Surcharge multiplier.
    #[serde(default)]
    pub multiplier: Option<Decimal>,
    /// Plain hourly amount, base rate only.
    #[serde(default)]
    pub hourly_amount: Option<Decimal>,
    /// Optional time-window predicate.
    #[serde(default)]
    pub window: Option<TimeWindow>,
    /// Marks the base rate.
    #[serde(default)]
    pub is_base_rate: bool,
    /// Flat amount for absence/bonus entries.
    #[serde(default)]
    pub fixed_amount: Option<Decimal>,
    /// Hours credited together with `fixed_amount`.
    #[serde(default)]
    pub fixed_hours: Option<Decimal>,
    /// Sort key within a class and for display.
    #[serde(default)]
    pub priority: i32,
}

impl RateSeed {
    /// Materializes the seed as a stored rate with a fresh identity.
    pub fn into_rate(self) -> Rate {
        Rate {
            id: Uuid::new_v4(),
            code: self.code,
            label: self.label,
            applies_to: self.applies_to,
            multiplier: self.multiplier,
            hourly_amount: self.hourly_amount,
            window: self.window,
            is_base_rate: self.is_base_rate,
            fixed_amount: self.fixed_amount,
            fixed_hours: self.fixed_hours,
            priority: self.priority,
        }
    }
}

/// `rates.yaml` file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct RatesConfig {
    /// The rate table.
    pub rates: Vec<RateSeed>,
}

/// One holiday row from `holidays.yaml`, without a stored identity.
#[derive(Debug, Clone, Deserialize)]
pub struct HolidaySeed {
    /// The calendar date.
    pub date: NaiveDate,
    /// The region code.
    pub region: String,
    /// Display name.
    pub name: String,
}

impl HolidaySeed {
    /// Materializes the seed as a stored holiday with a fresh identity.
    pub fn into_holiday(self) -> Holiday {
        Holiday {
            id: Uuid::new_v4(),
            date: self.date,
            region: self.region,
            name: self.name,
        }
    }
}

/// `holidays.yaml` file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct HolidaysConfig {
    /// The holiday rows.
    pub holidays: Vec<HolidaySeed>,
}
