//! Absence recording with creation-time amount snapshots.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{Absence, AbsenceKind, Actor, AuditRecord};
use crate::rates::RateCatalog;
use crate::store::RecordStore;

use super::calculator::check_month;

/// Absence bookkeeping over a record store.
///
/// The amount of an absence is resolved from the matching fixed rate once,
/// when the absence is recorded, and stored on the row. Later rate changes
/// never touch existing absences, keeping past summaries stable.
#[derive(Debug, Clone)]
pub struct AbsenceLedger<S: RecordStore> {
    store: Arc<S>,
    catalog: RateCatalog<S>,
}

impl<S: RecordStore> AbsenceLedger<S> {
    /// Creates a ledger over the given store.
    pub fn new(store: Arc<S>) -> Self {
        AbsenceLedger {
            catalog: RateCatalog::new(Arc::clone(&store)),
            store,
        }
    }

    /// Records an absence day.
    ///
    /// The flat amount comes from the fixed rate matching the kind
    /// (`sick`/`vacation`); hours default to the rate's fixed hours unless
    /// overridden. Fails with [`EngineError::Configuration`] when no fixed
    /// rate matches the kind and with [`EngineError::Conflict`] when an
    /// absence of the kind already exists for the (user, date).
    pub fn record_absence(
        &self,
        actor: &Actor,
        user_id: Uuid,
        date: NaiveDate,
        kind: AbsenceKind,
        hours: Option<Decimal>,
        note: Option<String>,
    ) -> EngineResult<Absence> {
        actor.authorize(user_id)?;

        let fixed = self.catalog.find_fixed_rate(kind.rate_code()).ok_or_else(|| {
            EngineError::configuration(format!("no fixed rate configured for '{kind}' absences"))
        })?;
        let hours = hours.unwrap_or(fixed.hours);
        if hours <= Decimal::ZERO {
            return Err(EngineError::validation("hours", "must be positive"));
        }

        let recorded = self.store.transaction(|records| {
            if records.absence_for(user_id, date, kind).is_some() {
                return Err(EngineError::conflict(format!(
                    "a '{kind}' absence already exists for {date}"
                )));
            }
            let absence = Absence {
                id: Uuid::new_v4(),
                user_id,
                date,
                kind,
                hours,
                amount: fixed.amount,
                note: note.clone(),
            };
            records.push_audit(AuditRecord::new(
                actor.user_id,
                "absences.record",
                absence.id,
                chrono::Utc::now(),
            ));
            records.insert_absence(absence.clone());
            Ok(absence)
        })?;

        info!(%user_id, %date, kind = %kind, "absence recorded");
        Ok(recorded)
    }

    /// Deletes an absence explicitly.
    pub fn remove_absence(&self, actor: &Actor, id: Uuid) -> EngineResult<()> {
        self.store.transaction(|records| {
            let absence = records
                .absence(id)
                .cloned()
                .ok_or_else(|| EngineError::not_found(format!("absence {id} does not exist")))?;
            actor.authorize(absence.user_id)?;
            records.remove_absence(id)?;
            records.push_audit(AuditRecord::new(
                actor.user_id,
                "absences.remove",
                id,
                chrono::Utc::now(),
            ));
            Ok(())
        })
    }

    /// A user's absences in one calendar month, ordered by date.
    pub fn list_for_month(
        &self,
        actor: &Actor,
        user_id: Uuid,
        year: i32,
        month: u32,
    ) -> EngineResult<Vec<Absence>> {
        actor.authorize(user_id)?;
        check_month(month)?;
        Ok(self.store.read(|records| {
            records
                .absences_in_month(user_id, year, month)
                .into_iter()
                .cloned()
                .collect()
        }))
    }
}
