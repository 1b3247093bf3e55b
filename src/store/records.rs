//! The record document and its typed query helpers.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{Absence, AbsenceKind, AuditRecord, Holiday, Rate, RateClass, WorkInterval};

/// All records the engine operates on, grouped by entity.
///
/// Query helpers return deterministic orderings (by start instant, date, or
/// priority) so callers never observe map iteration order.
#[derive(Debug, Default, Clone)]
pub struct Records {
    intervals: HashMap<Uuid, WorkInterval>,
    rates: HashMap<Uuid, Rate>,
    holidays: HashMap<Uuid, Holiday>,
    absences: HashMap<Uuid, Absence>,
    audit_log: Vec<AuditRecord>,
}

impl Records {
    // ----- work intervals ---------------------------------------------------

    /// Looks up an interval by id.
    pub fn interval(&self, id: Uuid) -> Option<&WorkInterval> {
        self.intervals.get(&id)
    }

    /// The user's open (non-closed) interval, if any. The engine keeps at
    /// most one in existence.
    pub fn open_interval_for(&self, user_id: Uuid) -> Option<&WorkInterval> {
        self.intervals
            .values()
            .find(|interval| interval.user_id == user_id && interval.is_open())
    }

    /// All intervals of a user, ordered by start instant.
    pub fn intervals_for(&self, user_id: Uuid) -> Vec<&WorkInterval> {
        let mut intervals: Vec<&WorkInterval> = self
            .intervals
            .values()
            .filter(|interval| interval.user_id == user_id)
            .collect();
        intervals.sort_by_key(|interval| interval.started_at);
        intervals
    }

    /// Inserts a fresh interval.
    pub fn insert_interval(&mut self, interval: WorkInterval) {
        self.intervals.insert(interval.id, interval);
    }

    /// Replaces an existing interval, failing when it does not exist.
    pub fn update_interval(&mut self, interval: WorkInterval) -> EngineResult<()> {
        match self.intervals.get_mut(&interval.id) {
            Some(slot) => {
                *slot = interval;
                Ok(())
            }
            None => Err(EngineError::not_found(format!(
                "work interval {} does not exist",
                interval.id
            ))),
        }
    }

    /// Removes an interval, failing when it does not exist.
    pub fn remove_interval(&mut self, id: Uuid) -> EngineResult<WorkInterval> {
        self.intervals
            .remove(&id)
            .ok_or_else(|| EngineError::not_found(format!("work interval {id} does not exist")))
    }

    // ----- rates ------------------------------------------------------------

    /// Looks up a rate by id.
    pub fn rate(&self, id: Uuid) -> Option<&Rate> {
        self.rates.get(&id)
    }

    /// Looks up a rate by its unique code.
    pub fn rate_by_code(&self, code: &str) -> Option<&Rate> {
        self.rates.values().find(|rate| rate.code == code)
    }

    /// The single rate flagged as the base rate, if configured.
    pub fn base_rate(&self) -> Option<&Rate> {
        self.rates.values().find(|rate| rate.is_base_rate)
    }

    /// All rates, ordered by (priority, code) for display.
    pub fn rates_sorted(&self) -> Vec<&Rate> {
        let mut rates: Vec<&Rate> = self.rates.values().collect();
        rates.sort_by(|a, b| (a.priority, &a.code).cmp(&(b.priority, &b.code)));
        rates
    }

    /// Rates of one class, ordered by (priority, code).
    pub fn rates_in_class(&self, class: RateClass) -> Vec<&Rate> {
        let mut rates: Vec<&Rate> = self
            .rates
            .values()
            .filter(|rate| rate.applies_to == class)
            .collect();
        rates.sort_by(|a, b| (a.priority, &a.code).cmp(&(b.priority, &b.code)));
        rates
    }

    /// Inserts a fresh rate.
    pub fn insert_rate(&mut self, rate: Rate) {
        self.rates.insert(rate.id, rate);
    }

    /// Replaces an existing rate, failing when it does not exist.
    pub fn update_rate(&mut self, rate: Rate) -> EngineResult<()> {
        match self.rates.get_mut(&rate.id) {
            Some(slot) => {
                *slot = rate;
                Ok(())
            }
            None => Err(EngineError::not_found(format!(
                "rate {} does not exist",
                rate.id
            ))),
        }
    }

    /// Removes a rate, failing when it does not exist.
    pub fn remove_rate(&mut self, id: Uuid) -> EngineResult<Rate> {
        self.rates
            .remove(&id)
            .ok_or_else(|| EngineError::not_found(format!("rate {id} does not exist")))
    }

    // ----- holidays ---------------------------------------------------------

    /// Looks up a holiday by id.
    pub fn holiday(&self, id: Uuid) -> Option<&Holiday> {
        self.holidays.get(&id)
    }

    /// The holiday stored for an exact (date, region), if any.
    pub fn holiday_on(&self, date: NaiveDate, region: &str) -> Option<&Holiday> {
        self.holidays
            .values()
            .find(|holiday| holiday.date == date && holiday.region == region)
    }

    /// A region's holidays within one calendar month, ordered by date.
    pub fn holidays_in_month(&self, year: i32, month: u32, region: &str) -> Vec<&Holiday> {
        let mut holidays: Vec<&Holiday> = self
            .holidays
            .values()
            .filter(|holiday| {
                holiday.region == region
                    && holiday.date.year() == year
                    && holiday.date.month() == month
            })
            .collect();
        holidays.sort_by_key(|holiday| holiday.date);
        holidays
    }

    /// Inserts a fresh holiday.
    pub fn insert_holiday(&mut self, holiday: Holiday) {
        self.holidays.insert(holiday.id, holiday);
    }

    /// Removes a holiday, failing when it does not exist.
    pub fn remove_holiday(&mut self, id: Uuid) -> EngineResult<Holiday> {
        self.holidays
            .remove(&id)
            .ok_or_else(|| EngineError::not_found(format!("holiday {id} does not exist")))
    }

    // ----- absences ---------------------------------------------------------

    /// Looks up an absence by id.
    pub fn absence(&self, id: Uuid) -> Option<&Absence> {
        self.absences.get(&id)
    }

    /// The absence of a given kind on a given (user, date), if any.
    pub fn absence_for(&self, user_id: Uuid, date: NaiveDate, kind: AbsenceKind) -> Option<&Absence> {
        self.absences
            .values()
            .find(|absence| {
                absence.user_id == user_id && absence.date == date && absence.kind == kind
            })
    }

    /// A user's absences within one calendar month, ordered by date.
    pub fn absences_in_month(&self, user_id: Uuid, year: i32, month: u32) -> Vec<&Absence> {
        let mut absences: Vec<&Absence> = self
            .absences
            .values()
            .filter(|absence| {
                absence.user_id == user_id
                    && absence.date.year() == year
                    && absence.date.month() == month
            })
            .collect();
        absences.sort_by_key(|absence| (absence.date, absence.kind as u8));
        absences
    }

    /// Inserts a fresh absence.
    pub fn insert_absence(&mut self, absence: Absence) {
        self.absences.insert(absence.id, absence);
    }

    /// Removes an absence, failing when it does not exist.
    pub fn remove_absence(&mut self, id: Uuid) -> EngineResult<Absence> {
        self.absences
            .remove(&id)
            .ok_or_else(|| EngineError::not_found(format!("absence {id} does not exist")))
    }

    // ----- audit log --------------------------------------------------------

    /// Appends an audit record.
    pub fn push_audit(&mut self, record: AuditRecord) {
        self.audit_log.push(record);
    }

    /// The audit log in insertion order.
    pub fn audit_log(&self) -> &[AuditRecord] {
        &self.audit_log
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_intervals_are_sorted_by_start() {
        let user = Uuid::new_v4();
        let mut records = Records::default();
        let late = WorkInterval::open(user, Utc.with_ymd_and_hms(2026, 1, 2, 9, 0, 0).unwrap());
        let early = WorkInterval::open(user, Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0).unwrap());
        records.insert_interval(late.clone());
        records.insert_interval(early.clone());

        let sorted = records.intervals_for(user);
        assert_eq!(sorted[0].id, early.id);
        assert_eq!(sorted[1].id, late.id);
    }

    #[test]
    fn test_update_missing_interval_fails() {
        let mut records = Records::default();
        let interval =
            WorkInterval::open(Uuid::new_v4(), Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0).unwrap());
        assert!(matches!(
            records.update_interval(interval),
            Err(EngineError::NotFound { .. })
        ));
    }

    #[test]
    fn test_holidays_filtered_by_month_and_region() {
        let mut records = Records::default();
        for (date, region, name) in [
            ((2026, 1, 1), "default", "New Year's Day"),
            ((2026, 1, 6), "default", "Epiphany"),
            ((2026, 1, 6), "other", "Epiphany"),
            ((2026, 2, 14), "default", "Not January"),
        ] {
            records.insert_holiday(Holiday {
                id: Uuid::new_v4(),
                date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
                region: region.to_string(),
                name: name.to_string(),
            });
        }

        let january = records.holidays_in_month(2026, 1, "default");
        assert_eq!(january.len(), 2);
        assert_eq!(january[0].date, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        assert_eq!(january[1].date, NaiveDate::from_ymd_opt(2026, 1, 6).unwrap());
    }
}
