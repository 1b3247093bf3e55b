//! Public holiday model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored public holiday, unique per (date, region).
///
/// Each year's holidays are distinct rows; there is no recurrence logic.
///
/// # Example
///
/// ```
/// use timeclock_engine::models::Holiday;
/// use chrono::NaiveDate;
/// use uuid::Uuid;
///
/// let holiday = Holiday {
///     id: Uuid::new_v4(),
///     date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
///     region: "default".to_string(),
///     name: "New Year's Day".to_string(),
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    /// Unique identifier for the holiday row.
    pub id: Uuid,
    /// The calendar date, with no time component.
    pub date: NaiveDate,
    /// The region code this holiday applies to.
    pub region: String,
    /// Display name, e.g. "New Year's Day".
    pub name: String,
}
