//! Monthly wage summary calculation.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Datelike;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::config::EngineSettings;
use crate::error::{EngineError, EngineResult};
use crate::holidays::HolidayCalendar;
use crate::models::{
    AbsenceBucket, Actor, MonthlySummary, PayBucket, PayCategory, SummaryTotals, SurchargeLine,
};
use crate::rates::{RateCatalog, surcharge};
use crate::store::RecordStore;

/// The rate code of the flat bonus added once per monthly summary.
pub const MONTHLY_BONUS_CODE: &str = "monthly_bonus";

/// Read-only wage computation over intervals, absences, the rate catalog
/// and the holiday calendar.
///
/// Summaries price every closed interval by the weekday and hour of its
/// start instant, in local wall time. They may run concurrently with clock
/// mutations and are eventually consistent with respect to them.
#[derive(Debug, Clone)]
pub struct WageCalculator<S: RecordStore> {
    store: Arc<S>,
    catalog: RateCatalog<S>,
    calendar: HolidayCalendar<S>,
    settings: EngineSettings,
}

impl<S: RecordStore> WageCalculator<S> {
    /// Creates a calculator over the given store.
    pub fn new(store: Arc<S>, settings: EngineSettings) -> Self {
        WageCalculator {
            catalog: RateCatalog::new(Arc::clone(&store)),
            calendar: HolidayCalendar::new(Arc::clone(&store)),
            store,
            settings,
        }
    }

    /// The catalog the calculator prices against.
    pub fn catalog(&self) -> &RateCatalog<S> {
        &self.catalog
    }

    /// The holiday calendar consulted during classification.
    pub fn calendar(&self) -> &HolidayCalendar<S> {
        &self.calendar
    }

    pub(super) fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub(super) fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Computes the wage summary of one calendar month.
    ///
    /// Fails with [`EngineError::Configuration`] when no base rate is
    /// configured, since earnings cannot be priced without it. Absence
    /// amounts are the stored creation-time snapshots; the monthly bonus is
    /// added once, unconditionally, when a `monthly_bonus` fixed rate
    /// exists.
    pub fn monthly_summary(
        &self,
        actor: &Actor,
        user_id: Uuid,
        year: i32,
        month: u32,
    ) -> EngineResult<MonthlySummary> {
        actor.authorize(user_id)?;
        check_month(month)?;
        let base_rate = self.catalog.base_hourly_amount()?;

        // One rate-table snapshot prices the whole month.
        let rates = self.catalog.list_rates();

        let mut regular = PayBucket::default();
        let mut surcharges: BTreeMap<(PayCategory, String), SurchargeLine> = BTreeMap::new();

        let intervals = self.store.read(|records| {
            records
                .intervals_for(user_id)
                .into_iter()
                .filter(|interval| {
                    let local = self.settings.to_local(interval.started_at);
                    local.year() == year && local.month() == month
                })
                .filter_map(|interval| {
                    interval
                        .duration_minutes()
                        .map(|minutes| (self.settings.to_local(interval.started_at), minutes))
                })
                .collect::<Vec<_>>()
        });

        for (local_start, duration_minutes) in intervals {
            let hours = Decimal::new(duration_minutes, 0) / Decimal::new(60, 0);
            let is_holiday = self
                .calendar
                .is_holiday(local_start.date(), &self.settings.region);

            match surcharge::resolve(&rates, local_start, is_holiday) {
                Some(matched) => {
                    let earnings = hours * base_rate * matched.multiplier;
                    let category = matched.class.pay_category();
                    surcharges
                        .entry((category, matched.code.clone()))
                        .or_insert_with(|| SurchargeLine {
                            category,
                            code: matched.code,
                            multiplier: matched.multiplier,
                            hours: Decimal::ZERO,
                            earnings: Decimal::ZERO,
                        })
                        .add(hours, earnings);
                }
                None => regular.add(hours, hours * base_rate),
            }
        }

        let absences = self.store.read(|records| {
            let rows = records.absences_in_month(user_id, year, month);
            AbsenceBucket {
                count: rows.len(),
                hours: rows.iter().map(|absence| absence.hours).sum(),
                amount: rows.iter().map(|absence| absence.amount).sum(),
            }
        });

        let monthly_bonus = match self.catalog.find_fixed_rate(MONTHLY_BONUS_CODE) {
            Some(fixed) => PayBucket {
                hours: fixed.hours,
                earnings: fixed.amount,
            },
            None => PayBucket::default(),
        };

        let surcharges: Vec<SurchargeLine> = surcharges.into_values().collect();
        let surcharge_hours: Decimal = surcharges.iter().map(|line| line.hours).sum();
        let surcharge_earnings: Decimal = surcharges.iter().map(|line| line.earnings).sum();

        let gross_earnings =
            regular.earnings + surcharge_earnings + absences.amount + monthly_bonus.earnings;
        let totals = SummaryTotals {
            hours: regular.hours + surcharge_hours + absences.hours + monthly_bonus.hours,
            gross_earnings,
            net_earnings: gross_earnings * self.settings.net_factor(),
        };

        Ok(MonthlySummary {
            user_id,
            year,
            month,
            regular,
            surcharges,
            absences,
            monthly_bonus,
            totals,
        })
    }
}

impl SurchargeLine {
    fn add(&mut self, hours: Decimal, earnings: Decimal) {
        self.hours += hours;
        self.earnings += earnings;
    }
}

/// Fails when the month is outside 1–12.
pub(super) fn check_month(month: u32) -> EngineResult<()> {
    if (1..=12).contains(&month) {
        Ok(())
    } else {
        Err(EngineError::validation("month", "must be between 1 and 12"))
    }
}
