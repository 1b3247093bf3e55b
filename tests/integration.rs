//! End-to-end tests for the time tracking engine.
//!
//! This suite wires the seeded configuration, the clock engine, the rate
//! catalog, the holiday calendar and the wage calculator together and
//! covers the cross-component invariants:
//! - at most one open session per user, also under concurrent check-ins
//! - pause arithmetic through a whole day
//! - manual entry overlap rules
//! - surcharge precedence as seen from monthly summaries
//! - bucket sums, gross/net totals and absence snapshots

use std::str::FromStr;
use std::sync::{Arc, Barrier};
use std::thread;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use timeclock_engine::clock::{ClockEngine, ManualClock, ManualEntry};
use timeclock_engine::config::{ConfigLoader, EngineSettings};
use timeclock_engine::error::{EngineError, EngineResult};
use timeclock_engine::models::{AbsenceKind, Actor};
use timeclock_engine::store::InMemoryStore;
use timeclock_engine::wage::{AbsenceLedger, WageCalculator};

// =============================================================================
// Test Helpers
// =============================================================================

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// Loads ./config/default into a fresh store and returns the pieces the
/// tests drive. The seeded table: base 14.50/h, night 1.25 (Mon-Fri from
/// 21:00), Saturday 1.30 (from 13:00), Sunday 1.50, holiday 2.00, sick and
/// vacation 116.00 for 8h, monthly bonus 50.00.
fn seeded() -> (Arc<InMemoryStore>, EngineSettings, Actor) {
    let loader = ConfigLoader::load("./config/default").expect("failed to load config");
    let store = Arc::new(InMemoryStore::new());
    let admin = Actor::admin(Uuid::new_v4());
    loader.seed_store(&store, &admin).expect("failed to seed store");
    (store, loader.settings().clone(), admin)
}

fn engine_at(
    store: &Arc<InMemoryStore>,
    settings: &EngineSettings,
    start: DateTime<Utc>,
) -> (ClockEngine<InMemoryStore, Arc<ManualClock>>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(start));
    let engine = ClockEngine::with_clock(Arc::clone(store), settings.clone(), Arc::clone(&clock));
    (engine, clock)
}

fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
}

fn entry(start: DateTime<Utc>, end: DateTime<Utc>) -> ManualEntry {
    ManualEntry {
        start,
        end: Some(end),
        category: None,
        note: None,
        project: None,
    }
}

/// Checks a closed interval in for `hours` starting at `start`.
fn work_hours(
    store: &Arc<InMemoryStore>,
    settings: &EngineSettings,
    user: Uuid,
    start: DateTime<Utc>,
    hours: i64,
) {
    let (engine, clock) = engine_at(store, settings, start);
    let actor = Actor::employee(user);
    engine.check_in(&actor, user).unwrap();
    clock.advance(Duration::hours(hours));
    engine.check_out(&actor, user).unwrap();
}

// =============================================================================
// Clock flow
// =============================================================================

#[test]
fn full_day_with_pause_yields_465_minutes() {
    let (store, settings, _admin) = seeded();
    let user = Uuid::new_v4();
    let actor = Actor::employee(user);

    // Thursday 2026-01-15: check in 09:00, pause 09:30-09:45, out 17:00.
    let (engine, clock) = engine_at(&store, &settings, utc(2026, 1, 15, 9, 0));
    engine.check_in(&actor, user).unwrap();

    clock.set(utc(2026, 1, 15, 9, 30));
    engine.pause_start(&actor, user).unwrap();
    clock.set(utc(2026, 1, 15, 9, 45));
    engine.pause_stop(&actor, user).unwrap();

    clock.set(utc(2026, 1, 15, 17, 0));
    let closed = engine.check_out(&actor, user).unwrap();

    assert_eq!(closed.duration_minutes(), Some(465));
    assert_eq!(closed.pause_total_minutes, 15);
}

#[test]
fn check_out_without_pause_rounds_the_raw_span() {
    let (store, settings, _admin) = seeded();
    let user = Uuid::new_v4();
    let actor = Actor::employee(user);

    let (engine, clock) = engine_at(&store, &settings, utc(2026, 1, 15, 9, 0));
    engine.check_in(&actor, user).unwrap();
    clock.advance(Duration::minutes(123) + Duration::seconds(31));
    let closed = engine.check_out(&actor, user).unwrap();
    assert_eq!(closed.duration_minutes(), Some(124));
}

#[test]
fn concurrent_check_ins_yield_one_success_and_one_conflict() {
    let (store, settings, _admin) = seeded();

    for _ in 0..16 {
        let user = Uuid::new_v4();
        let engine = Arc::new(ClockEngine::new(Arc::clone(&store), settings.clone()));
        let barrier = Arc::new(Barrier::new(2));

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let engine = Arc::clone(&engine);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    engine.check_in(&Actor::employee(user), user)
                })
            })
            .collect();

        let results: Vec<EngineResult<_>> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();

        let successes = results.iter().filter(|r| r.is_ok()).count();
        let conflicts = results
            .iter()
            .filter(|r| matches!(r, Err(EngineError::Conflict { .. })))
            .count();
        assert_eq!(successes, 1, "exactly one check-in must win the race");
        assert_eq!(conflicts, 1, "the loser must see a conflict");
    }
}

#[test]
fn manual_entries_enforce_half_open_overlap() {
    let (store, settings, _admin) = seeded();
    let user = Uuid::new_v4();
    let actor = Actor::employee(user);
    let (engine, _clock) = engine_at(&store, &settings, utc(2026, 1, 20, 12, 0));

    engine
        .create_entry(&actor, user, entry(utc(2026, 1, 15, 9, 0), utc(2026, 1, 15, 12, 0)))
        .unwrap();

    // Overlapping range is rejected...
    assert!(matches!(
        engine.create_entry(
            &actor,
            user,
            entry(utc(2026, 1, 15, 11, 0), utc(2026, 1, 15, 14, 0))
        ),
        Err(EngineError::Conflict { .. })
    ));

    // ...while an adjacent one (end of A == start of B) is accepted.
    engine
        .create_entry(&actor, user, entry(utc(2026, 1, 15, 12, 0), utc(2026, 1, 15, 17, 0)))
        .unwrap();
}

#[test]
fn live_session_blocks_overlapping_manual_entry() {
    let (store, settings, _admin) = seeded();
    let user = Uuid::new_v4();
    let actor = Actor::employee(user);

    let (engine, _clock) = engine_at(&store, &settings, utc(2026, 1, 20, 9, 0));
    engine.check_in(&actor, user).unwrap();

    // The open session is unbounded on the right, so a later manual entry
    // collides with it.
    assert!(matches!(
        engine.create_entry(
            &actor,
            user,
            entry(utc(2026, 1, 20, 10, 0), utc(2026, 1, 20, 11, 0))
        ),
        Err(EngineError::Conflict { .. })
    ));
}

// =============================================================================
// Rate catalog administration
// =============================================================================

#[test]
fn base_rate_stays_unique_but_editable() {
    let (store, settings, admin) = seeded();
    let calculator = WageCalculator::new(Arc::clone(&store), settings);
    let catalog = calculator.catalog();

    // A second base rate is rejected.
    let mut second = catalog
        .list_rates()
        .into_iter()
        .find(|rate| rate.code == "night")
        .unwrap();
    second.is_base_rate = true;
    second.hourly_amount = Some(dec("20.00"));
    assert!(matches!(
        catalog.update_rate(&admin, second),
        Err(EngineError::Conflict { .. })
    ));

    // Changing only the hourly amount of the existing base rate succeeds.
    let mut base = catalog
        .list_rates()
        .into_iter()
        .find(|rate| rate.is_base_rate)
        .unwrap();
    base.hourly_amount = Some(dec("15.00"));
    catalog.update_rate(&admin, base).unwrap();
    assert_eq!(catalog.base_hourly_amount().unwrap(), dec("15.00"));
}

// =============================================================================
// Monthly summary
// =============================================================================

#[test]
fn monthly_summary_prices_a_mixed_month() {
    let (store, settings, _admin) = seeded();
    let user = Uuid::new_v4();
    let actor = Actor::employee(user);

    // January 2026. The seeded calendar makes Jan 1 and Jan 6 holidays.
    // Thursday Jan 15, 09:00-17:00: regular.
    work_hours(&store, &settings, user, utc(2026, 1, 15, 9, 0), 8);
    // Tuesday Jan 13, 22:00-00:00: night window.
    work_hours(&store, &settings, user, utc(2026, 1, 13, 22, 0), 2);
    // Saturday Jan 17, 14:00-18:00: Saturday afternoon.
    work_hours(&store, &settings, user, utc(2026, 1, 17, 14, 0), 4);
    // Sunday Jan 18, 22:00-23:00: Sunday outranks the night window.
    work_hours(&store, &settings, user, utc(2026, 1, 18, 22, 0), 1);
    // Tuesday Jan 6 (Epiphany), 09:00-13:00: holiday outranks everything.
    work_hours(&store, &settings, user, utc(2026, 1, 6, 9, 0), 4);
    // One sick day.
    let ledger = AbsenceLedger::new(Arc::clone(&store));
    ledger
        .record_absence(
            &actor,
            user,
            NaiveDate::from_ymd_opt(2026, 1, 21).unwrap(),
            AbsenceKind::Sick,
            None,
            None,
        )
        .unwrap();

    let calculator = WageCalculator::new(Arc::clone(&store), settings);
    let summary = calculator.monthly_summary(&actor, user, 2026, 1).unwrap();

    // Regular: 8h * 14.50.
    assert_eq!(summary.regular.hours, dec("8"));
    assert_eq!(summary.regular.earnings, dec("116.00"));

    // Surcharge lines, ordered night < weekend < holiday.
    let codes: Vec<&str> = summary
        .surcharges
        .iter()
        .map(|line| line.code.as_str())
        .collect();
    assert_eq!(
        codes,
        vec!["night", "saturday_afternoon", "sunday", "holiday"]
    );
    let by_code = |code: &str| {
        summary
            .surcharges
            .iter()
            .find(|line| line.code == code)
            .unwrap()
    };
    assert_eq!(by_code("night").earnings, dec("36.25")); // 2 * 14.50 * 1.25
    assert_eq!(by_code("saturday_afternoon").earnings, dec("75.40")); // 4 * 14.50 * 1.30
    assert_eq!(by_code("sunday").earnings, dec("21.75")); // 1 * 14.50 * 1.50
    assert_eq!(by_code("holiday").earnings, dec("116.00")); // 4 * 14.50 * 2.00

    // Absence snapshot and bonus.
    assert_eq!(summary.absences.hours, dec("8"));
    assert_eq!(summary.absences.amount, dec("116.00"));
    assert_eq!(summary.monthly_bonus.earnings, dec("50.00"));

    // totals.hours is exactly the bucket sum.
    assert_eq!(
        summary.totals.hours,
        summary.regular.hours
            + summary.surcharge_hours()
            + summary.absences.hours
            + summary.monthly_bonus.hours
    );
    assert_eq!(summary.totals.hours, dec("27"));

    // Gross is the sum of every bucket; net is exactly 70 % of it.
    let gross = dec("116.00")
        + dec("36.25")
        + dec("75.40")
        + dec("21.75")
        + dec("116.00")
        + dec("116.00")
        + dec("50.00");
    assert_eq!(summary.totals.gross_earnings, gross);
    assert_eq!(summary.totals.net_earnings, gross * dec("0.70"));
}

#[test]
fn summary_respects_the_local_utc_offset() {
    let (store, mut settings, _admin) = seeded();
    settings.utc_offset_minutes = 60;
    let user = Uuid::new_v4();
    let actor = Actor::employee(user);

    // Tuesday 2026-01-13 20:30 UTC is 21:30 local: inside the night window.
    work_hours(&store, &settings, user, utc(2026, 1, 13, 20, 30), 2);

    let calculator = WageCalculator::new(Arc::clone(&store), settings);
    let summary = calculator.monthly_summary(&actor, user, 2026, 1).unwrap();
    assert_eq!(summary.surcharges.len(), 1);
    assert_eq!(summary.surcharges[0].code, "night");
}

#[test]
fn reports_follow_the_same_classification() {
    let (store, settings, _admin) = seeded();
    let user = Uuid::new_v4();
    let actor = Actor::employee(user);

    work_hours(&store, &settings, user, utc(2026, 1, 15, 9, 0), 8);
    work_hours(&store, &settings, user, utc(2026, 1, 18, 10, 0), 2);

    let calculator = WageCalculator::new(Arc::clone(&store), settings);
    let from = NaiveDate::from_ymd_opt(2026, 1, 12).unwrap();
    let to = NaiveDate::from_ymd_opt(2026, 1, 18).unwrap();

    let daily = calculator.daily_report(&actor, user, from, to).unwrap();
    assert_eq!(daily.len(), 2);
    assert_eq!(daily[0].minutes.regular, 480);
    assert_eq!(daily[1].minutes.weekend, 120);

    let weekly = calculator.weekly_report(&actor, user, from, to).unwrap();
    assert_eq!(weekly.len(), 1);
    assert_eq!(weekly[0].iso_week, 3);
    assert_eq!(weekly[0].entry_count, 2);
    assert_eq!(weekly[0].minutes.total(), 600);
    assert_eq!(weekly[0].first_check_in, utc(2026, 1, 15, 9, 0));
    assert_eq!(weekly[0].last_check_out, utc(2026, 1, 18, 12, 0));
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Net earnings are exactly gross * 0.70 for any worked duration.
    #[test]
    fn prop_net_is_seventy_percent_of_gross(minutes in 1i64..6000) {
        let (store, settings, _admin) = seeded();
        let user = Uuid::new_v4();
        let actor = Actor::employee(user);

        let (engine, clock) = engine_at(&store, &settings, utc(2026, 1, 15, 0, 0));
        engine.check_in(&actor, user).unwrap();
        clock.advance(Duration::minutes(minutes));
        engine.check_out(&actor, user).unwrap();

        let calculator = WageCalculator::new(Arc::clone(&store), settings);
        let summary = calculator.monthly_summary(&actor, user, 2026, 1).unwrap();
        prop_assert_eq!(
            summary.totals.net_earnings,
            summary.totals.gross_earnings * dec("0.70")
        );
    }

    /// Check-out stores round((end - start) / 60000) minutes exactly.
    #[test]
    fn prop_check_out_rounds_to_nearest_minute(seconds in 60i64..86_400) {
        let (store, settings, _admin) = seeded();
        let user = Uuid::new_v4();
        let actor = Actor::employee(user);

        let (engine, clock) = engine_at(&store, &settings, utc(2026, 1, 15, 0, 0));
        engine.check_in(&actor, user).unwrap();
        clock.advance(Duration::seconds(seconds));
        let closed = engine.check_out(&actor, user).unwrap();

        let expected = (seconds * 1000 + 30_000) / 60_000;
        prop_assert_eq!(closed.duration_minutes(), Some(expected));
    }

    /// Two manual intervals coexist exactly when their half-open ranges do
    /// not intersect.
    #[test]
    fn prop_manual_overlap_matches_half_open_semantics(
        a_start in 0i64..480,
        a_len in 1i64..240,
        b_start in 0i64..480,
        b_len in 1i64..240,
    ) {
        let (store, settings, _admin) = seeded();
        let user = Uuid::new_v4();
        let actor = Actor::employee(user);
        let (engine, _clock) = engine_at(&store, &settings, utc(2026, 1, 20, 12, 0));

        let base = utc(2026, 1, 15, 0, 0);
        engine
            .create_entry(
                &actor,
                user,
                entry(
                    base + Duration::minutes(a_start),
                    base + Duration::minutes(a_start + a_len),
                ),
            )
            .unwrap();

        let second = engine.create_entry(
            &actor,
            user,
            entry(
                base + Duration::minutes(b_start),
                base + Duration::minutes(b_start + b_len),
            ),
        );

        let intersects = a_start < b_start + b_len && b_start < a_start + a_len;
        if intersects {
            prop_assert!(
                matches!(second, Err(EngineError::Conflict { .. })),
                "expected Conflict error"
            );
        } else {
            prop_assert!(second.is_ok());
        }
    }
}
