//! Surcharge classification for a single instant.
//!
//! This module implements the fixed surcharge precedence as a named, pure
//! algorithm: holiday outranks Sunday, which outranks Saturday afternoon,
//! which outranks the weekday night window. The classes could structurally
//! overlap (a holiday on a Sunday night matches all three), so the order of
//! this chain is the policy; the `priority` field on [`Rate`] only breaks
//! ties between candidates of the same class.

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{PayCategory, Rate, RateClass};

/// The surcharge class an instant resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurchargeClass {
    /// The date is a public holiday; applies regardless of hour.
    Holiday,
    /// Sunday, any hour.
    Sunday,
    /// Saturday from the configured start hour onward.
    SaturdayAfternoon,
    /// Monday through Friday from the night window's start hour onward.
    Night,
}

impl SurchargeClass {
    /// The pay category earnings of this class accumulate into.
    pub fn pay_category(self) -> PayCategory {
        match self {
            SurchargeClass::Holiday => PayCategory::Holiday,
            SurchargeClass::Sunday | SurchargeClass::SaturdayAfternoon => PayCategory::Weekend,
            SurchargeClass::Night => PayCategory::Night,
        }
    }
}

impl std::fmt::Display for SurchargeClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SurchargeClass::Holiday => write!(f, "holiday"),
            SurchargeClass::Sunday => write!(f, "sunday"),
            SurchargeClass::SaturdayAfternoon => write!(f, "saturday_afternoon"),
            SurchargeClass::Night => write!(f, "night"),
        }
    }
}

/// The outcome of classifying an instant against the rate table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurchargeMatch {
    /// The class that won.
    pub class: SurchargeClass,
    /// The code of the rate that matched.
    pub code: String,
    /// The rate's multiplier.
    pub multiplier: Decimal,
}

/// The first multiplier-bearing rate of a class that satisfies the
/// predicate. `rates` must already be in (priority, code) order.
fn first_in_class<'a>(
    rates: &'a [Rate],
    class: RateClass,
    matches: impl Fn(&Rate) -> bool,
) -> Option<&'a Rate> {
    rates
        .iter()
        .filter(|rate| rate.applies_to == class && rate.multiplier.is_some())
        .find(|rate| matches(rate))
}

/// Classifies a local instant into at most one surcharge class.
///
/// Evaluates the fixed precedence chain and returns the first match:
///
/// 1. holiday (when `is_holiday` is set), regardless of hour
/// 2. Sunday, regardless of hour
/// 3. Saturday from the matching window's start hour
/// 4. weekday night from the matching window's start hour
///
/// Returns `None` for plain regular time. `rates` must be ordered by
/// (priority, code), as [`Records::rates_sorted`] returns them.
///
/// [`Records::rates_sorted`]: crate::store::Records::rates_sorted
///
/// # Example
///
/// ```
/// use timeclock_engine::rates::{resolve, SurchargeClass};
/// use chrono::NaiveDateTime;
///
/// // 2026-01-13 is a Tuesday; no night rate configured here, so the
/// // instant stays regular.
/// let at = NaiveDateTime::parse_from_str("2026-01-13 22:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
/// assert!(resolve(&[], at, false).is_none());
/// ```
pub fn resolve(rates: &[Rate], at: NaiveDateTime, is_holiday: bool) -> Option<SurchargeMatch> {
    let weekday = at.weekday();
    let hour = at.hour();

    let (class, rate) = if is_holiday {
        (
            SurchargeClass::Holiday,
            first_in_class(rates, RateClass::Holiday, |_| true)?,
        )
    } else if weekday == Weekday::Sun {
        (
            SurchargeClass::Sunday,
            first_in_class(rates, RateClass::Weekend, |rate| rate.covers_day(weekday))?,
        )
    } else if weekday == Weekday::Sat {
        (
            SurchargeClass::SaturdayAfternoon,
            first_in_class(rates, RateClass::Weekend, |rate| {
                rate.matches_instant(weekday, hour)
            })?,
        )
    } else {
        (
            SurchargeClass::Night,
            first_in_class(rates, RateClass::Night, |rate| {
                rate.matches_instant(weekday, hour)
            })?,
        )
    };

    // A multiplier-less rate never gets past first_in_class.
    let multiplier = rate.multiplier?;

    Some(SurchargeMatch {
        class,
        code: rate.code.clone(),
        multiplier,
    })
}
