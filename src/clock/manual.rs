//! Manual interval creation and editing.
//!
//! Entries recorded outside the live clock go through the same invariants
//! as the state machine: end after start, no overlap with any other
//! interval of the user, and at most one open session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{Actor, AuditRecord, IntervalState, WorkInterval, round_ms_to_minutes};
use crate::store::{RecordStore, Records};

use super::{Clock, ClockEngine};

/// Bounds and tags for a manually recorded interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualEntry {
    /// Start instant.
    pub start: DateTime<Utc>,
    /// End instant; `None` records the entry as a still-open session.
    pub end: Option<DateTime<Utc>>,
    /// Informational category tag.
    #[serde(default)]
    pub category: Option<String>,
    /// Free-text note.
    #[serde(default)]
    pub note: Option<String>,
    /// Project tag.
    #[serde(default)]
    pub project: Option<String>,
}

impl ManualEntry {
    fn validate(&self) -> EngineResult<()> {
        if let Some(end) = self.end {
            if end <= self.start {
                return Err(EngineError::validation(
                    "end",
                    "must be strictly after start",
                ));
            }
        }
        Ok(())
    }

    /// The closed-state for the entry's bounds, when both are given.
    /// Manual durations come from the bounds alone and are never below one
    /// minute.
    fn state(&self) -> IntervalState {
        match self.end {
            Some(end) => IntervalState::Closed {
                ended_at: end,
                duration_minutes: round_ms_to_minutes((end - self.start).num_milliseconds()).max(1),
            },
            None => IntervalState::Running,
        }
    }
}

/// Fails when the candidate overlaps any other interval of its user.
fn check_no_overlap(records: &Records, candidate: &WorkInterval) -> EngineResult<()> {
    for other in records.intervals_for(candidate.user_id) {
        if other.id == candidate.id {
            continue;
        }
        if candidate.overlaps(other) {
            return Err(EngineError::conflict(format!(
                "interval overlaps existing entry {}",
                other.id
            )));
        }
    }
    Ok(())
}

/// Fails when another interval of the user is open.
fn check_no_other_open(records: &Records, candidate: &WorkInterval) -> EngineResult<()> {
    match records.open_interval_for(candidate.user_id) {
        Some(open) if open.id != candidate.id => Err(EngineError::conflict(format!(
            "user {} already has an open session",
            candidate.user_id
        ))),
        _ => Ok(()),
    }
}

impl<S: RecordStore, C: Clock> ClockEngine<S, C> {
    /// Records an interval outside the live clock.
    pub fn create_entry(
        &self,
        actor: &Actor,
        user_id: Uuid,
        entry: ManualEntry,
    ) -> EngineResult<WorkInterval> {
        actor.authorize(user_id)?;
        entry.validate()?;
        let now = self.clock.now();

        let created = self.store.transaction(|records| {
            let interval = WorkInterval {
                id: Uuid::new_v4(),
                user_id,
                started_at: entry.start,
                state: entry.state(),
                pause_total_minutes: 0,
                category: entry.category.clone(),
                note: entry.note.clone(),
                project: entry.project.clone(),
            };
            if interval.is_open() {
                check_no_other_open(records, &interval)?;
            }
            check_no_overlap(records, &interval)?;
            records.push_audit(AuditRecord::new(
                actor.user_id,
                "clock.entry_create",
                interval.id,
                now,
            ));
            records.insert_interval(interval.clone());
            Ok(interval)
        })?;

        info!(%user_id, interval_id = %created.id, "manual entry created");
        Ok(created)
    }

    /// Rewrites the bounds and tags of an existing interval.
    ///
    /// The interval's net duration is recomputed from the new bounds; the
    /// accumulated pause total is left untouched as informational history.
    pub fn update_entry(
        &self,
        actor: &Actor,
        interval_id: Uuid,
        entry: ManualEntry,
    ) -> EngineResult<WorkInterval> {
        entry.validate()?;
        let now = self.clock.now();

        self.store.transaction(|records| {
            let mut interval = records
                .interval(interval_id)
                .cloned()
                .ok_or_else(|| {
                    EngineError::not_found(format!("work interval {interval_id} does not exist"))
                })?;
            actor.authorize(interval.user_id)?;

            interval.started_at = entry.start;
            interval.state = entry.state();
            interval.category = entry.category.clone();
            interval.note = entry.note.clone();
            interval.project = entry.project.clone();

            if interval.is_open() {
                check_no_other_open(records, &interval)?;
            }
            check_no_overlap(records, &interval)?;
            records.update_interval(interval.clone())?;
            records.push_audit(AuditRecord::new(
                actor.user_id,
                "clock.entry_update",
                interval.id,
                now,
            ));
            Ok(interval)
        })
    }

    /// Deletes an interval explicitly.
    pub fn delete_entry(&self, actor: &Actor, interval_id: Uuid) -> EngineResult<()> {
        let now = self.clock.now();
        self.store.transaction(|records| {
            let interval = records
                .interval(interval_id)
                .cloned()
                .ok_or_else(|| {
                    EngineError::not_found(format!("work interval {interval_id} does not exist"))
                })?;
            actor.authorize(interval.user_id)?;
            records.remove_interval(interval_id)?;
            records.push_audit(AuditRecord::new(
                actor.user_id,
                "clock.entry_delete",
                interval_id,
                now,
            ));
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::EngineSettings;
    use crate::store::InMemoryStore;
    use chrono::TimeZone;
    use std::sync::Arc;

    fn ts(day: u32, h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, day, h, m, 0).unwrap()
    }

    fn entry(start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> ManualEntry {
        ManualEntry {
            start,
            end,
            category: None,
            note: None,
            project: None,
        }
    }

    fn engine() -> (ClockEngine<InMemoryStore, Arc<ManualClock>>, Actor, Uuid) {
        let clock = Arc::new(ManualClock::new(ts(20, 12, 0)));
        let engine = ClockEngine::with_clock(
            Arc::new(InMemoryStore::new()),
            EngineSettings::default(),
            clock,
        );
        let user = Uuid::new_v4();
        (engine, Actor::employee(user), user)
    }

    #[test]
    fn test_closed_entry_gets_duration_from_bounds() {
        let (engine, actor, user) = engine();
        let created = engine
            .create_entry(&actor, user, entry(ts(15, 9, 0), Some(ts(15, 17, 0))))
            .unwrap();
        assert_eq!(created.duration_minutes(), Some(480));
    }

    #[test]
    fn test_end_before_start_is_rejected() {
        let (engine, actor, user) = engine();
        for end in [ts(15, 8, 0), ts(15, 9, 0)] {
            assert!(matches!(
                engine.create_entry(&actor, user, entry(ts(15, 9, 0), Some(end))),
                Err(EngineError::Validation { .. })
            ));
        }
    }

    #[test]
    fn test_duration_is_at_least_one_minute() {
        let (engine, actor, user) = engine();
        let end = ts(15, 9, 0) + chrono::Duration::seconds(10);
        let created = engine
            .create_entry(&actor, user, entry(ts(15, 9, 0), Some(end)))
            .unwrap();
        assert_eq!(created.duration_minutes(), Some(1));
    }

    #[test]
    fn test_overlapping_entries_conflict() {
        let (engine, actor, user) = engine();
        engine
            .create_entry(&actor, user, entry(ts(15, 9, 0), Some(ts(15, 17, 0))))
            .unwrap();
        assert!(matches!(
            engine.create_entry(&actor, user, entry(ts(15, 16, 0), Some(ts(15, 18, 0)))),
            Err(EngineError::Conflict { .. })
        ));
    }

    #[test]
    fn test_adjacent_entries_are_accepted() {
        let (engine, actor, user) = engine();
        engine
            .create_entry(&actor, user, entry(ts(15, 9, 0), Some(ts(15, 12, 0))))
            .unwrap();
        // End of A == start of B.
        engine
            .create_entry(&actor, user, entry(ts(15, 12, 0), Some(ts(15, 17, 0))))
            .unwrap();
    }

    #[test]
    fn test_overlap_is_per_user() {
        let (engine, actor, user) = engine();
        engine
            .create_entry(&actor, user, entry(ts(15, 9, 0), Some(ts(15, 17, 0))))
            .unwrap();

        let other_user = Uuid::new_v4();
        let other_actor = Actor::employee(other_user);
        engine
            .create_entry(&other_actor, other_user, entry(ts(15, 9, 0), Some(ts(15, 17, 0))))
            .unwrap();
    }

    #[test]
    fn test_open_manual_entry_respects_single_open_rule() {
        let (engine, actor, user) = engine();
        engine.create_entry(&actor, user, entry(ts(20, 8, 0), None)).unwrap();
        assert!(matches!(
            engine.create_entry(&actor, user, entry(ts(20, 11, 0), None)),
            Err(EngineError::Conflict { .. })
        ));
    }

    #[test]
    fn test_update_rewrites_bounds_and_duration() {
        let (engine, actor, user) = engine();
        let created = engine
            .create_entry(&actor, user, entry(ts(15, 9, 0), Some(ts(15, 17, 0))))
            .unwrap();

        let updated = engine
            .update_entry(&actor, created.id, entry(ts(15, 10, 0), Some(ts(15, 16, 30))))
            .unwrap();
        assert_eq!(updated.started_at, ts(15, 10, 0));
        assert_eq!(updated.duration_minutes(), Some(390));
    }

    #[test]
    fn test_update_cannot_create_overlap() {
        let (engine, actor, user) = engine();
        engine
            .create_entry(&actor, user, entry(ts(15, 9, 0), Some(ts(15, 12, 0))))
            .unwrap();
        let afternoon = engine
            .create_entry(&actor, user, entry(ts(15, 13, 0), Some(ts(15, 17, 0))))
            .unwrap();

        assert!(matches!(
            engine.update_entry(&actor, afternoon.id, entry(ts(15, 11, 0), Some(ts(15, 17, 0)))),
            Err(EngineError::Conflict { .. })
        ));
        // The rejected update left the original bounds in place.
        let unchanged = engine
            .store
            .read(|records| records.interval(afternoon.id).cloned())
            .unwrap();
        assert_eq!(unchanged.started_at, ts(15, 13, 0));
    }

    #[test]
    fn test_delete_removes_interval() {
        let (engine, actor, user) = engine();
        let created = engine
            .create_entry(&actor, user, entry(ts(15, 9, 0), Some(ts(15, 17, 0))))
            .unwrap();
        engine.delete_entry(&actor, created.id).unwrap();
        assert!(matches!(
            engine.delete_entry(&actor, created.id),
            Err(EngineError::NotFound { .. })
        ));
    }

    #[test]
    fn test_foreign_entries_are_protected() {
        let (engine, actor, user) = engine();
        let created = engine
            .create_entry(&actor, user, entry(ts(15, 9, 0), Some(ts(15, 17, 0))))
            .unwrap();

        let stranger = Actor::employee(Uuid::new_v4());
        assert!(matches!(
            engine.delete_entry(&stranger, created.id),
            Err(EngineError::Authorization { .. })
        ));
        assert!(matches!(
            engine.update_entry(&stranger, created.id, entry(ts(15, 9, 0), Some(ts(15, 10, 0)))),
            Err(EngineError::Authorization { .. })
        ));
    }
}
