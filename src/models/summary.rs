//! Wage summary result models.
//!
//! This module contains the [`MonthlySummary`] type and its building blocks
//! that capture the output of a monthly wage calculation: per-bucket hours
//! and earnings for regular work, surcharge work, absences and the monthly
//! bonus, plus the gross/net totals.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The pay category an interval's earnings accumulate into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayCategory {
    /// Plain base-rate time.
    Regular,
    /// Weekday night surcharge time.
    Night,
    /// Saturday/Sunday surcharge time.
    Weekend,
    /// Public holiday surcharge time.
    Holiday,
}

impl std::fmt::Display for PayCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PayCategory::Regular => write!(f, "regular"),
            PayCategory::Night => write!(f, "night"),
            PayCategory::Weekend => write!(f, "weekend"),
            PayCategory::Holiday => write!(f, "holiday"),
        }
    }
}

/// Hours and earnings accumulated into one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PayBucket {
    /// Fractional hours in this bucket.
    pub hours: Decimal,
    /// Earnings in this bucket, in the configured currency unit.
    pub earnings: Decimal,
}

impl PayBucket {
    /// Adds hours and earnings to the bucket.
    pub fn add(&mut self, hours: Decimal, earnings: Decimal) {
        self.hours += hours;
        self.earnings += earnings;
    }
}

/// One surcharge line of a monthly summary, keyed by the rate code that
/// produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurchargeLine {
    /// The pay category the surcharge belongs to.
    pub category: PayCategory,
    /// The code of the rate that matched.
    pub code: String,
    /// The surcharge multiplier that was applied.
    pub multiplier: Decimal,
    /// Hours priced at this surcharge.
    pub hours: Decimal,
    /// Earnings from this surcharge.
    pub earnings: Decimal,
}

/// Hours and stored amounts of the month's absences.
///
/// Amounts are the creation-time snapshots; the summary never reprices
/// them against the current rate table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AbsenceBucket {
    /// Number of absence days.
    pub count: usize,
    /// Sum of credited hours.
    pub hours: Decimal,
    /// Sum of stored amounts.
    pub amount: Decimal,
}

/// Aggregated totals of a monthly summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryTotals {
    /// Regular + surcharge + absence + bonus hours.
    pub hours: Decimal,
    /// Sum of all earnings and amounts.
    pub gross_earnings: Decimal,
    /// Gross earnings after the flat illustrative tax deduction. This is
    /// not a tax computation.
    pub net_earnings: Decimal,
}

/// The complete result of a monthly wage calculation.
///
/// # Example
///
/// ```
/// use timeclock_engine::models::{AbsenceBucket, MonthlySummary, PayBucket, SummaryTotals};
/// use rust_decimal::Decimal;
/// use uuid::Uuid;
///
/// let summary = MonthlySummary {
///     user_id: Uuid::new_v4(),
///     year: 2026,
///     month: 1,
///     regular: PayBucket::default(),
///     surcharges: vec![],
///     absences: AbsenceBucket::default(),
///     monthly_bonus: PayBucket::default(),
///     totals: SummaryTotals {
///         hours: Decimal::ZERO,
///         gross_earnings: Decimal::ZERO,
///         net_earnings: Decimal::ZERO,
///     },
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlySummary {
    /// The user the summary is for.
    pub user_id: Uuid,
    /// Calendar year.
    pub year: i32,
    /// Calendar month, 1–12.
    pub month: u32,
    /// Plain base-rate work.
    pub regular: PayBucket,
    /// Surcharge work, one line per matched rate code, ordered by
    /// category then code.
    pub surcharges: Vec<SurchargeLine>,
    /// The month's absences.
    pub absences: AbsenceBucket,
    /// The flat monthly bonus, zero when none is configured.
    pub monthly_bonus: PayBucket,
    /// Aggregated totals.
    pub totals: SummaryTotals,
}

impl MonthlySummary {
    /// Sum of all surcharge hours.
    pub fn surcharge_hours(&self) -> Decimal {
        self.surcharges.iter().map(|line| line.hours).sum()
    }

    /// Sum of all surcharge earnings.
    pub fn surcharge_earnings(&self) -> Decimal {
        self.surcharges.iter().map(|line| line.earnings).sum()
    }
}
