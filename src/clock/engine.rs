//! The per-user session state machine.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::EngineSettings;
use crate::error::{EngineError, EngineResult};
use crate::models::{Actor, AuditRecord, IntervalState, WorkInterval, floor_ms_to_minutes};
use crate::store::RecordStore;

use super::{Clock, SystemClock};

/// A view of the user's open session for status display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenSessionView {
    /// The open interval's id.
    pub interval_id: Uuid,
    /// When the session started.
    pub started_at: DateTime<Utc>,
    /// Whether a pause is currently running.
    pub paused: bool,
    /// Total pause seconds so far, including the running pause delta.
    pub pause_seconds: i64,
}

/// Aggregate over the user's sessions of the current local day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DayTally {
    /// Number of sessions started today.
    pub entry_count: usize,
    /// Net worked minutes, live-computed for the open session.
    pub net_minutes: i64,
    /// Pause minutes, including the in-progress pause delta.
    pub pause_minutes: i64,
}

/// The result of a status query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockStatus {
    /// Whether the user currently has an open session.
    pub checked_in: bool,
    /// The open session, if any.
    pub open: Option<OpenSessionView>,
    /// Today's aggregate.
    pub today: DayTally,
}

/// The check-in/check-out/pause state machine over a record store.
///
/// Every mutation runs its existence check and its write inside one store
/// transaction, so the at-most-one-open-session rule holds under
/// concurrent callers.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use timeclock_engine::clock::ClockEngine;
/// use timeclock_engine::config::EngineSettings;
/// use timeclock_engine::models::Actor;
/// use timeclock_engine::store::InMemoryStore;
/// use uuid::Uuid;
///
/// let engine = ClockEngine::new(Arc::new(InMemoryStore::new()), EngineSettings::default());
/// let user = Uuid::new_v4();
/// let interval = engine.check_in(&Actor::employee(user), user).unwrap();
/// assert!(interval.is_open());
/// ```
#[derive(Debug)]
pub struct ClockEngine<S: RecordStore, C: Clock = SystemClock> {
    pub(super) store: Arc<S>,
    pub(super) clock: C,
    pub(super) settings: EngineSettings,
}

impl<S: RecordStore> ClockEngine<S> {
    /// Creates an engine reading the system clock.
    pub fn new(store: Arc<S>, settings: EngineSettings) -> Self {
        ClockEngine::with_clock(store, settings, SystemClock)
    }
}

impl<S: RecordStore, C: Clock> ClockEngine<S, C> {
    /// Creates an engine with an explicit time source.
    pub fn with_clock(store: Arc<S>, settings: EngineSettings, clock: C) -> Self {
        ClockEngine {
            store,
            clock,
            settings,
        }
    }

    /// Opens a session for the user at the current instant.
    ///
    /// Fails with [`EngineError::Conflict`] when the user already has an
    /// open session; the check and the insert share one transaction, so a
    /// concurrent race yields exactly one success.
    pub fn check_in(&self, actor: &Actor, user_id: Uuid) -> EngineResult<WorkInterval> {
        actor.authorize(user_id)?;
        let now = self.clock.now();

        let created = self.store.transaction(|records| {
            if records.open_interval_for(user_id).is_some() {
                return Err(EngineError::conflict(format!(
                    "user {user_id} already has an open session"
                )));
            }
            let interval = WorkInterval::open(user_id, now);
            records.push_audit(AuditRecord::new(
                actor.user_id,
                "clock.check_in",
                interval.id,
                now,
            ));
            records.insert_interval(interval.clone());
            Ok(interval)
        });

        match &created {
            Ok(interval) => info!(%user_id, interval_id = %interval.id, "checked in"),
            Err(error) => warn!(%user_id, %error, "check-in rejected"),
        }
        created
    }

    /// Closes the user's open session at the current instant.
    ///
    /// Net minutes are the raw span minus accumulated pause minutes and the
    /// running pause delta, rounded half up and floored at zero. A pause
    /// still running at close is priced into the net figure but not folded
    /// into `pause_total_minutes`; the stored total remains the pre-close
    /// accumulated value.
    pub fn check_out(&self, actor: &Actor, user_id: Uuid) -> EngineResult<WorkInterval> {
        actor.authorize(user_id)?;
        let now = self.clock.now();

        let closed = self.store.transaction(|records| {
            let mut interval = records
                .open_interval_for(user_id)
                .cloned()
                .ok_or_else(|| {
                    EngineError::not_found(format!("no open session for user {user_id}"))
                })?;
            if now <= interval.started_at {
                return Err(EngineError::validation(
                    "ended_at",
                    "check-out must be after check-in",
                ));
            }
            let net_minutes = interval.net_minutes_at(now);
            interval.state = IntervalState::Closed {
                ended_at: now,
                duration_minutes: net_minutes,
            };
            records.update_interval(interval.clone())?;
            records.push_audit(AuditRecord::new(
                actor.user_id,
                "clock.check_out",
                interval.id,
                now,
            ));
            Ok(interval)
        })?;

        info!(
            %user_id,
            interval_id = %closed.id,
            duration_minutes = closed.duration_minutes().unwrap_or(0),
            "checked out"
        );
        Ok(closed)
    }

    /// Starts a pause on the user's open session.
    pub fn pause_start(&self, actor: &Actor, user_id: Uuid) -> EngineResult<WorkInterval> {
        actor.authorize(user_id)?;
        let now = self.clock.now();

        self.store.transaction(|records| {
            let mut interval = records
                .open_interval_for(user_id)
                .cloned()
                .ok_or_else(|| {
                    EngineError::not_found(format!("no open session for user {user_id}"))
                })?;
            if interval.is_paused() {
                return Err(EngineError::conflict(format!(
                    "a pause is already running for user {user_id}"
                )));
            }
            interval.state = IntervalState::Paused { since: now };
            records.update_interval(interval.clone())?;
            records.push_audit(AuditRecord::new(
                actor.user_id,
                "clock.pause_start",
                interval.id,
                now,
            ));
            Ok(interval)
        })
    }

    /// Stops the running pause, folding its whole minutes (truncated) into
    /// the accumulated pause total.
    pub fn pause_stop(&self, actor: &Actor, user_id: Uuid) -> EngineResult<WorkInterval> {
        actor.authorize(user_id)?;
        let now = self.clock.now();

        self.store.transaction(|records| {
            let mut interval = records
                .open_interval_for(user_id)
                .cloned()
                .ok_or_else(|| {
                    EngineError::not_found(format!("no open session for user {user_id}"))
                })?;
            let since = match interval.state {
                IntervalState::Paused { since } => since,
                _ => {
                    return Err(EngineError::conflict(format!(
                        "no pause is running for user {user_id}"
                    )));
                }
            };
            let extra_minutes = floor_ms_to_minutes((now - since).num_milliseconds());
            interval.pause_total_minutes += extra_minutes;
            interval.state = IntervalState::Running;
            records.update_interval(interval.clone())?;
            records.push_audit(AuditRecord::new(
                actor.user_id,
                "clock.pause_stop",
                interval.id,
                now,
            ));
            Ok(interval)
        })
    }

    /// The user's live clock status and same-day aggregate.
    pub fn status(&self, actor: &Actor, user_id: Uuid) -> EngineResult<ClockStatus> {
        actor.authorize(user_id)?;
        let now = self.clock.now();
        let today = self.settings.to_local(now).date();

        Ok(self.store.read(|records| {
            let open = records.open_interval_for(user_id).map(|interval| {
                OpenSessionView {
                    interval_id: interval.id,
                    started_at: interval.started_at,
                    paused: interval.is_paused(),
                    pause_seconds: interval.pause_seconds_at(now),
                }
            });

            let mut tally = DayTally::default();
            for interval in records.intervals_for(user_id) {
                if self.settings.to_local(interval.started_at).date() != today {
                    continue;
                }
                tally.entry_count += 1;
                tally.net_minutes += interval
                    .duration_minutes()
                    .unwrap_or_else(|| interval.net_minutes_at(now));
                tally.pause_minutes += interval.pause_minutes_at(now);
            }

            ClockStatus {
                checked_in: open.is_some(),
                open,
                today: tally,
            }
        }))
    }
}
