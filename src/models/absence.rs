//! Absence model.
//!
//! Absences carry an amount snapshot taken from the matching fixed rate at
//! creation time; the snapshot is never recomputed when rates change later,
//! keeping historical payroll figures stable.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The kind of a fixed-rate absence day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbsenceKind {
    /// A sick day.
    Sick,
    /// A vacation day.
    Vacation,
}

impl AbsenceKind {
    /// The fixed-rate code this kind is priced from.
    pub fn rate_code(&self) -> &'static str {
        match self {
            AbsenceKind::Sick => "sick",
            AbsenceKind::Vacation => "vacation",
        }
    }
}

impl std::fmt::Display for AbsenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.rate_code())
    }
}

/// A recorded absence day. At most one absence of a given kind may exist
/// per (user, date).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Absence {
    /// Unique identifier for the absence.
    pub id: Uuid,
    /// The user this absence belongs to.
    pub user_id: Uuid,
    /// The calendar date of the absence.
    pub date: NaiveDate,
    /// Sick or vacation.
    pub kind: AbsenceKind,
    /// Credited hours.
    pub hours: Decimal,
    /// Amount snapshot from the fixed rate in effect at creation time.
    pub amount: Decimal,
    /// Free-text note.
    #[serde(default)]
    pub note: Option<String>,
}
