//! Holiday calendar lookups and administration.
//!
//! A pure lookup service over stored holiday rows: exact-date, exact-region
//! matching with no recurrence logic. Each year's holidays are distinct
//! rows, provisioned by an administrator or the config seed.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{Actor, AuditRecord, Holiday};
use crate::store::RecordStore;

/// Holiday lookups and administration over a record store.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use timeclock_engine::holidays::HolidayCalendar;
/// use timeclock_engine::store::InMemoryStore;
/// use chrono::NaiveDate;
///
/// let calendar = HolidayCalendar::new(Arc::new(InMemoryStore::new()));
/// let date = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
/// assert!(!calendar.is_holiday(date, "default"));
/// ```
#[derive(Debug, Clone)]
pub struct HolidayCalendar<S: RecordStore> {
    store: Arc<S>,
}

impl<S: RecordStore> HolidayCalendar<S> {
    /// Creates a calendar over the given store.
    pub fn new(store: Arc<S>) -> Self {
        HolidayCalendar { store }
    }

    /// Exact-date, exact-region holiday lookup.
    pub fn is_holiday(&self, date: NaiveDate, region: &str) -> bool {
        self.store
            .read(|records| records.holiday_on(date, region).is_some())
    }

    /// A region's holidays within one calendar month as date-ordered
    /// (date, name) pairs, for reporting collaborators.
    pub fn list_for_month(&self, year: i32, month: u32, region: &str) -> Vec<(NaiveDate, String)> {
        self.store.read(|records| {
            records
                .holidays_in_month(year, month, region)
                .into_iter()
                .map(|holiday| (holiday.date, holiday.name.clone()))
                .collect()
        })
    }

    /// Stores a holiday. Administrator only; unique per (date, region).
    pub fn add_holiday(&self, actor: &Actor, holiday: Holiday) -> EngineResult<Holiday> {
        actor.require_admin()?;
        if holiday.name.trim().is_empty() {
            return Err(EngineError::validation("name", "must not be empty"));
        }

        let added = self.store.transaction(|records| {
            if let Some(existing) = records.holiday_on(holiday.date, &holiday.region) {
                return Err(EngineError::conflict(format!(
                    "holiday '{}' already stored for {} in region {}",
                    existing.name, holiday.date, holiday.region
                )));
            }
            records.insert_holiday(holiday.clone());
            records.push_audit(AuditRecord::new(
                actor.user_id,
                "holidays.add",
                holiday.id,
                chrono::Utc::now(),
            ));
            Ok(holiday.clone())
        })?;

        info!(date = %added.date, region = %added.region, "holiday added");
        Ok(added)
    }

    /// Removes a holiday. Administrator only.
    pub fn remove_holiday(&self, actor: &Actor, id: Uuid) -> EngineResult<()> {
        actor.require_admin()?;
        self.store.transaction(|records| {
            let removed = records.remove_holiday(id)?;
            records.push_audit(AuditRecord::new(
                actor.user_id,
                "holidays.remove",
                removed.id,
                chrono::Utc::now(),
            ));
            Ok(())
        })
    }
}
