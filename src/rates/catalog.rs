//! The rate catalog service.
//!
//! Read-heavy lookups (base rate, surcharge resolution, fixed rates) plus
//! the administrator-only mutations with their write-time uniqueness rules.

use std::sync::Arc;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{Actor, AuditRecord, Rate};
use crate::store::{RecordStore, Records};

use super::surcharge::{self, SurchargeMatch};

/// The fixed amount/hours pair of an absence or bonus rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedRate {
    /// Hours credited by the entry.
    pub hours: Decimal,
    /// Flat amount credited by the entry.
    pub amount: Decimal,
}

/// Rate lookups and administration over a record store.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use timeclock_engine::rates::RateCatalog;
/// use timeclock_engine::store::InMemoryStore;
///
/// let store = Arc::new(InMemoryStore::new());
/// let catalog = RateCatalog::new(store);
/// assert!(catalog.base_rate().is_err()); // nothing configured yet
/// ```
#[derive(Debug, Clone)]
pub struct RateCatalog<S: RecordStore> {
    store: Arc<S>,
}

impl<S: RecordStore> RateCatalog<S> {
    /// Creates a catalog over the given store.
    pub fn new(store: Arc<S>) -> Self {
        RateCatalog { store }
    }

    /// The single configured base rate.
    ///
    /// Fails with [`EngineError::Configuration`] when none is configured;
    /// earnings cannot be priced without it.
    pub fn base_rate(&self) -> EngineResult<Rate> {
        self.store
            .read(|records| records.base_rate().cloned())
            .ok_or_else(|| EngineError::configuration("no base rate configured"))
    }

    /// The base rate's hourly amount.
    pub fn base_hourly_amount(&self) -> EngineResult<Decimal> {
        let rate = self.base_rate()?;
        rate.hourly_amount.ok_or_else(|| {
            EngineError::configuration(format!(
                "base rate '{}' has no hourly amount",
                rate.code
            ))
        })
    }

    /// Classifies a local instant into at most one surcharge.
    ///
    /// The holiday fact is supplied by the caller; the catalog has no
    /// dependency on the holiday calendar. See [`surcharge::resolve`] for
    /// the precedence chain.
    pub fn resolve_surcharge(&self, at: NaiveDateTime, is_holiday: bool) -> Option<SurchargeMatch> {
        self.store.read(|records| {
            let rates: Vec<Rate> = records.rates_sorted().into_iter().cloned().collect();
            surcharge::resolve(&rates, at, is_holiday)
        })
    }

    /// The fixed amount/hours pair of the rate with the given code, if that
    /// rate exists and carries one.
    pub fn find_fixed_rate(&self, code: &str) -> Option<FixedRate> {
        self.store.read(|records| {
            let rate = records.rate_by_code(code)?;
            match (rate.fixed_amount, rate.fixed_hours) {
                (Some(amount), Some(hours)) => Some(FixedRate { hours, amount }),
                _ => None,
            }
        })
    }

    /// All rates in display order (priority, then code).
    pub fn list_rates(&self) -> Vec<Rate> {
        self.store
            .read(|records| records.rates_sorted().into_iter().cloned().collect())
    }

    /// Creates a rate. Administrator only.
    ///
    /// Fails with [`EngineError::Conflict`] when the code is taken or when
    /// the definition claims the base-rate flag while another rate already
    /// holds it. Uniqueness is enforced here, at write time, inside one
    /// transaction.
    pub fn create_rate(&self, actor: &Actor, rate: Rate) -> EngineResult<Rate> {
        actor.require_admin()?;
        rate.validate()?;

        let created = self.store.transaction(|records| {
            check_code_free(records, &rate.code, rate.id)?;
            if rate.is_base_rate {
                check_base_flag_free(records, rate.id)?;
            }
            records.insert_rate(rate.clone());
            records.push_audit(AuditRecord::new(
                actor.user_id,
                "rates.create",
                rate.id,
                chrono::Utc::now(),
            ));
            Ok(rate.clone())
        });

        match &created {
            Ok(rate) => info!(code = %rate.code, "rate created"),
            Err(error) => warn!(code = %rate.code, %error, "rate creation rejected"),
        }
        created
    }

    /// Replaces an existing rate. Administrator only.
    ///
    /// The same uniqueness rules as [`RateCatalog::create_rate`] apply,
    /// excluding the rate itself, so updating the base rate in place (for
    /// example changing only its hourly amount) succeeds.
    pub fn update_rate(&self, actor: &Actor, rate: Rate) -> EngineResult<Rate> {
        actor.require_admin()?;
        rate.validate()?;

        self.store.transaction(|records| {
            if records.rate(rate.id).is_none() {
                return Err(EngineError::not_found(format!(
                    "rate {} does not exist",
                    rate.id
                )));
            }
            check_code_free(records, &rate.code, rate.id)?;
            if rate.is_base_rate {
                check_base_flag_free(records, rate.id)?;
            }
            records.update_rate(rate.clone())?;
            records.push_audit(AuditRecord::new(
                actor.user_id,
                "rates.update",
                rate.id,
                chrono::Utc::now(),
            ));
            Ok(rate.clone())
        })
    }

    /// Deletes a rate. Administrator only.
    ///
    /// Deleting the base rate is allowed even while intervals reference
    /// plain hourly pay: pricing is computed on demand, never cached on an
    /// interval, so summaries simply start failing with a configuration
    /// error until a new base rate exists.
    pub fn delete_rate(&self, actor: &Actor, id: Uuid) -> EngineResult<()> {
        actor.require_admin()?;
        self.store.transaction(|records| {
            let removed = records.remove_rate(id)?;
            records.push_audit(AuditRecord::new(
                actor.user_id,
                "rates.delete",
                removed.id,
                chrono::Utc::now(),
            ));
            Ok(())
        })
    }
}

/// Fails when another rate already uses the code.
fn check_code_free(records: &Records, code: &str, own_id: Uuid) -> EngineResult<()> {
    match records.rate_by_code(code) {
        Some(existing) if existing.id != own_id => Err(EngineError::conflict(format!(
            "rate code '{code}' is already in use"
        ))),
        _ => Ok(()),
    }
}

/// Fails when another rate already holds the base-rate flag.
fn check_base_flag_free(records: &Records, own_id: Uuid) -> EngineResult<()> {
    match records.base_rate() {
        Some(existing) if existing.id != own_id => Err(EngineError::conflict(format!(
            "rate '{}' is already the base rate",
            existing.code
        ))),
        _ => Ok(()),
    }
}
