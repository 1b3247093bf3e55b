//! Daily and ISO-week work reports.
//!
//! Reports follow the same start-instant classification as the monthly
//! summary but aggregate minute counts per local day or ISO week, and track
//! the first check-in and last check-out of each group.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{Actor, PayCategory};
use crate::rates::surcharge;
use crate::store::RecordStore;

use super::calculator::WageCalculator;

/// Net minute sums per pay category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MinutesByCategory {
    /// Plain base-rate minutes.
    pub regular: i64,
    /// Night surcharge minutes.
    pub night: i64,
    /// Weekend surcharge minutes.
    pub weekend: i64,
    /// Holiday surcharge minutes.
    pub holiday: i64,
}

impl MinutesByCategory {
    /// Adds minutes to the category's sum.
    pub fn add(&mut self, category: PayCategory, minutes: i64) {
        match category {
            PayCategory::Regular => self.regular += minutes,
            PayCategory::Night => self.night += minutes,
            PayCategory::Weekend => self.weekend += minutes,
            PayCategory::Holiday => self.holiday += minutes,
        }
    }

    /// Sum over all categories.
    pub fn total(&self) -> i64 {
        self.regular + self.night + self.weekend + self.holiday
    }
}

/// One local day of a daily report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyReport {
    /// The local calendar date.
    pub date: NaiveDate,
    /// Number of closed sessions that started on this day.
    pub entry_count: usize,
    /// Earliest check-in of the day.
    pub first_check_in: DateTime<Utc>,
    /// Latest check-out of the day.
    pub last_check_out: DateTime<Utc>,
    /// Net minutes per pay category.
    pub minutes: MinutesByCategory,
    /// Accumulated pause minutes.
    pub pause_minutes: i64,
}

/// One ISO week of a weekly report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyReport {
    /// The ISO week-numbering year (which can differ from the calendar
    /// year at the boundaries).
    pub iso_year: i32,
    /// The ISO week number, 1-53.
    pub iso_week: u32,
    /// Number of closed sessions in the week.
    pub entry_count: usize,
    /// Earliest check-in of the week.
    pub first_check_in: DateTime<Utc>,
    /// Latest check-out of the week.
    pub last_check_out: DateTime<Utc>,
    /// Net minutes per pay category.
    pub minutes: MinutesByCategory,
    /// Accumulated pause minutes.
    pub pause_minutes: i64,
}

/// A closed interval with its classification, ready for grouping.
struct ClassifiedInterval {
    local_start: NaiveDateTime,
    started_at: DateTime<Utc>,
    ended_at: DateTime<Utc>,
    duration_minutes: i64,
    pause_minutes: i64,
    category: PayCategory,
}

impl<S: RecordStore> WageCalculator<S> {
    /// Closed intervals of the user whose local start date falls in
    /// [from, to], classified by their start instant.
    fn classified_intervals(
        &self,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Vec<ClassifiedInterval> {
        let rates = self.catalog().list_rates();
        let settings = self.settings().clone();

        let raw = self.store().read(|records| {
            records
                .intervals_for(user_id)
                .into_iter()
                .filter_map(|interval| {
                    let ended_at = interval.ended_at()?;
                    let duration_minutes = interval.duration_minutes()?;
                    let local_start = settings.to_local(interval.started_at);
                    if local_start.date() < from || local_start.date() > to {
                        return None;
                    }
                    Some((
                        local_start,
                        interval.started_at,
                        ended_at,
                        duration_minutes,
                        interval.pause_total_minutes,
                    ))
                })
                .collect::<Vec<_>>()
        });

        raw.into_iter()
            .map(
                |(local_start, started_at, ended_at, duration_minutes, pause_minutes)| {
                    let is_holiday = self
                        .calendar()
                        .is_holiday(local_start.date(), &settings.region);
                    let category = surcharge::resolve(&rates, local_start, is_holiday)
                        .map(|matched| matched.class.pay_category())
                        .unwrap_or(PayCategory::Regular);
                    ClassifiedInterval {
                        local_start,
                        started_at,
                        ended_at,
                        duration_minutes,
                        pause_minutes,
                        category,
                    }
                },
            )
            .collect()
    }

    /// Per-day report over an inclusive local date range. Days without
    /// closed sessions are omitted.
    pub fn daily_report(
        &self,
        actor: &Actor,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> EngineResult<Vec<DailyReport>> {
        actor.authorize(user_id)?;
        check_range(from, to)?;

        let mut days: BTreeMap<NaiveDate, DailyReport> = BTreeMap::new();
        for interval in self.classified_intervals(user_id, from, to) {
            let day = days
                .entry(interval.local_start.date())
                .or_insert_with(|| DailyReport {
                    date: interval.local_start.date(),
                    entry_count: 0,
                    first_check_in: interval.started_at,
                    last_check_out: interval.ended_at,
                    minutes: MinutesByCategory::default(),
                    pause_minutes: 0,
                });
            day.entry_count += 1;
            day.first_check_in = day.first_check_in.min(interval.started_at);
            day.last_check_out = day.last_check_out.max(interval.ended_at);
            day.minutes.add(interval.category, interval.duration_minutes);
            day.pause_minutes += interval.pause_minutes;
        }

        Ok(days.into_values().collect())
    }

    /// Per-ISO-week report over an inclusive local date range. Weeks
    /// without closed sessions are omitted.
    pub fn weekly_report(
        &self,
        actor: &Actor,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> EngineResult<Vec<WeeklyReport>> {
        actor.authorize(user_id)?;
        check_range(from, to)?;

        let mut weeks: BTreeMap<(i32, u32), WeeklyReport> = BTreeMap::new();
        for interval in self.classified_intervals(user_id, from, to) {
            let iso = interval.local_start.date().iso_week();
            let week = weeks
                .entry((iso.year(), iso.week()))
                .or_insert_with(|| WeeklyReport {
                    iso_year: iso.year(),
                    iso_week: iso.week(),
                    entry_count: 0,
                    first_check_in: interval.started_at,
                    last_check_out: interval.ended_at,
                    minutes: MinutesByCategory::default(),
                    pause_minutes: 0,
                });
            week.entry_count += 1;
            week.first_check_in = week.first_check_in.min(interval.started_at);
            week.last_check_out = week.last_check_out.max(interval.ended_at);
            week.minutes.add(interval.category, interval.duration_minutes);
            week.pause_minutes += interval.pause_minutes;
        }

        Ok(weeks.into_values().collect())
    }
}

/// Fails when the range is inverted.
fn check_range(from: NaiveDate, to: NaiveDate) -> EngineResult<()> {
    if from <= to {
        Ok(())
    } else {
        Err(EngineError::validation("to", "must not be before from"))
    }
}
