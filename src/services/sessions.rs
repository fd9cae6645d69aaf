//! Live session merging, timers and the shared session feed
//!
//! The monitoring table shows one row per logical session: back-to-back
//! bookings for the same console and customer collapse into a single
//! timer. Timers re-derive from the time basis on every call; overtime
//! amounts are advisory until an operator settles them.

use std::collections::HashSet;
use std::sync::{PoisonError, RwLock};

use indexmap::IndexMap;

use crate::models::{ActiveSession, CafeNotification, MergedSession, SessionStatus};

use super::time::TimeBasis;

#[derive(Clone)]
pub struct SessionMerger {
    time: TimeBasis,
    /// Configured house overtime rate; rows fall back to their unit price
    default_rate_per_hour: Option<f64>,
}

impl SessionMerger {
    pub fn new(time: TimeBasis, default_rate_per_hour: Option<f64>) -> Self {
        Self {
            time,
            default_rate_per_hour,
        }
    }

    /// Collapse time-adjacent rows into merged display rows.
    ///
    /// Two rows merge iff they share console number, date and customer,
    /// both are active, and one ends exactly when the other starts. The
    /// operation is closed over [`MergedSession`] and idempotent:
    /// `merge(merge(rows)) == merge(rows)`.
    pub fn merge(&self, mut rows: Vec<MergedSession>) -> Vec<MergedSession> {
        rows.sort_by(|a, b| {
            a.console_number
                .cmp(&b.console_number)
                .then_with(|| a.date.cmp(&b.date))
                .then_with(|| a.username.cmp(&b.username))
                .then_with(|| a.start_time.cmp(&b.start_time))
        });

        let mut merged: Vec<MergedSession> = Vec::with_capacity(rows.len());
        for row in rows {
            match merged.last_mut() {
                Some(prev) if can_merge(prev, &row) => absorb(prev, row),
                _ => merged.push(row),
            }
        }
        merged
    }

    /// Convenience over raw feed records
    pub fn merge_sessions(&self, sessions: Vec<ActiveSession>) -> Vec<MergedSession> {
        self.merge(sessions.into_iter().map(MergedSession::from).collect())
    }

    /// Minutes the session has been running, floored at zero
    pub fn elapsed_minutes(&self, row: &MergedSession) -> i64 {
        match self.time.to_instant(&row.date, &row.start_time) {
            Ok(start) => (self.time.now() - start).num_minutes().max(0),
            Err(e) => {
                tracing::warn!(booking_id = row.booking_id, error = %e, "cannot compute elapsed time");
                0
            }
        }
    }

    /// Minutes past the booked end time ("extra time"), floored at zero
    pub fn extra_minutes(&self, row: &MergedSession) -> i64 {
        match self.time.to_instant(&row.date, &row.end_time) {
            Ok(end) => (self.time.now() - end).num_minutes().max(0),
            Err(e) => {
                tracing::warn!(booking_id = row.booking_id, error = %e, "cannot compute extra time");
                0
            }
        }
    }

    /// Fill level for the session progress meter, capped at 100
    pub fn progress_percent(&self, row: &MergedSession) -> f64 {
        let start = self.time.to_instant(&row.date, &row.start_time);
        let end = self.time.to_instant(&row.date, &row.end_time);
        let (start, end) = match (start, end) {
            (Ok(s), Ok(e)) => (s, e),
            _ => return 0.0,
        };
        let booked = (end - start).num_seconds();
        if booked <= 0 {
            return 100.0;
        }
        let elapsed = (self.time.now() - start).num_seconds().max(0);
        (elapsed as f64 / booked as f64 * 100.0).min(100.0)
    }

    /// Advisory overtime charge: `ceil(extra_hours * rate_per_hour)`.
    /// An explicit rate wins, then the configured house rate, then the
    /// row's own unit price.
    pub fn overtime_amount(&self, row: &MergedSession, rate_per_hour: Option<f64>) -> f64 {
        let rate = match rate_per_hour.or(self.default_rate_per_hour) {
            Some(r) if r.is_finite() && r > 0.0 => r,
            _ => {
                if row.unit_price.is_finite() {
                    row.unit_price.max(0.0)
                } else {
                    0.0
                }
            }
        };
        let extra_hours = self.extra_minutes(row) as f64 / 60.0;
        (extra_hours * rate).ceil()
    }
}

fn can_merge(prev: &MergedSession, next: &MergedSession) -> bool {
    prev.status == SessionStatus::Active
        && next.status == SessionStatus::Active
        && prev.console_number == next.console_number
        && prev.date == next.date
        && prev.username == next.username
        && prev.end_time == next.start_time
}

fn absorb(prev: &mut MergedSession, next: MergedSession) {
    prev.end_time = next.end_time;
    // Release/settle actions target the most recent booking
    prev.booking_id = next.booking_id;
    prev.slot_ids.extend(next.slot_ids);
    prev.price += next.price;
    prev.unit_price = next.unit_price;
}

/// Shared live-session store: single writer (poll/notification path),
/// multiple readers. Updates are idempotent by `booking_id`; once a
/// booking is rejected or its console released, late duplicate events
/// for it are dropped regardless of arrival order.
#[derive(Default)]
pub struct LiveSessionFeed {
    inner: RwLock<FeedState>,
}

#[derive(Default)]
struct FeedState {
    /// Running sessions keyed by booking_id
    sessions: IndexMap<i64, ActiveSession>,
    /// Pay-at-cafe requests awaiting an operator decision
    pending: IndexMap<i64, ActiveSession>,
    /// Booking ids already rejected/released; tombstones for late arrivals
    decided: HashSet<i64>,
}

impl LiveSessionFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one push notification. Duplicate deliveries are no-ops.
    pub fn apply(&self, event: &CafeNotification) {
        tracing::debug!(booking_id = event.booking_id(), "applying cafe notification");
        let mut state = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        match event {
            CafeNotification::PayAtCafeRequested {
                booking_id,
                session,
            } => {
                if state.decided.contains(booking_id)
                    || state.sessions.contains_key(booking_id)
                    || state.pending.contains_key(booking_id)
                {
                    return;
                }
                state.pending.insert(*booking_id, session.clone());
            }
            CafeNotification::BookingAccepted {
                booking_id,
                session,
            } => {
                if state.decided.contains(booking_id) {
                    return;
                }
                state.pending.shift_remove(booking_id);
                if !state.sessions.contains_key(booking_id) {
                    state.sessions.insert(*booking_id, session.clone());
                }
            }
            CafeNotification::BookingRejected { booking_id }
            | CafeNotification::ConsoleReleased { booking_id } => {
                state.pending.shift_remove(booking_id);
                state.sessions.shift_remove(booking_id);
                state.decided.insert(*booking_id);
            }
        }
    }

    /// Upsert from the polling path. Decided bookings stay removed even if
    /// a stale poll still carries them.
    pub fn upsert(&self, session: ActiveSession) {
        let mut state = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if state.decided.contains(&session.booking_id) {
            return;
        }
        state.sessions.insert(session.booking_id, session);
    }

    /// Replace the whole feed from an authoritative poll. Tombstoned
    /// bookings are still filtered out so a stale snapshot cannot
    /// resurrect a released console.
    pub fn replace_all(&self, sessions: Vec<ActiveSession>) {
        let mut state = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let decided = std::mem::take(&mut state.decided);
        state.sessions = sessions
            .into_iter()
            .filter(|s| !decided.contains(&s.booking_id))
            .map(|s| (s.booking_id, s))
            .collect();
        state.decided = decided;
    }

    /// Pay-at-cafe requests awaiting a decision
    pub fn pending(&self) -> Vec<ActiveSession> {
        let state = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        state.pending.values().cloned().collect()
    }

    /// Raw running sessions, in insertion order
    pub fn sessions(&self) -> Vec<ActiveSession> {
        let state = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        state.sessions.values().cloned().collect()
    }

    /// Merged display rows for the monitoring table
    pub fn rows(&self, merger: &SessionMerger) -> Vec<MergedSession> {
        merger.merge_sessions(self.sessions())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::time::FixedClock;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    fn merger_at_ist(h: u32, mi: u32) -> SessionMerger {
        let utc = Utc.with_ymd_and_hms(2025, 1, 10, h, mi, 0).unwrap()
            - chrono::Duration::minutes(330);
        SessionMerger::new(TimeBasis::new(Arc::new(FixedClock(utc)), 330).unwrap(), None)
    }

    fn session(
        booking_id: i64,
        console: &str,
        user: &str,
        start: &str,
        end: &str,
    ) -> ActiveSession {
        ActiveSession {
            slot_id: booking_id * 10,
            booking_id,
            console_number: console.to_string(),
            console_type: "PC".to_string(),
            username: user.to_string(),
            date: "2025-01-10".to_string(),
            start_time: start.to_string(),
            end_time: end.to_string(),
            price: 100.0,
            status: SessionStatus::Active,
        }
    }

    #[test]
    fn back_to_back_sessions_merge_into_one_row() {
        let merger = merger_at_ist(14, 30);
        let rows = merger.merge_sessions(vec![
            session(1, "PC-3", "ravi", "14:00", "15:00"),
            session(2, "PC-3", "ravi", "15:00", "16:00"),
        ]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].start_time, "14:00");
        assert_eq!(rows[0].end_time, "16:00");
        assert_eq!(rows[0].booking_id, 2);
        assert_eq!(rows[0].slot_ids, vec![10, 20]);
        assert_eq!(rows[0].price, 200.0);
    }

    #[test]
    fn chains_collapse_transitively() {
        let merger = merger_at_ist(14, 30);
        let rows = merger.merge_sessions(vec![
            session(3, "PC-3", "ravi", "16:00", "17:00"),
            session(1, "PC-3", "ravi", "14:00", "15:00"),
            session(2, "PC-3", "ravi", "15:00", "16:00"),
        ]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].end_time, "17:00");
    }

    #[test]
    fn different_customer_or_console_does_not_merge() {
        let merger = merger_at_ist(14, 30);
        let rows = merger.merge_sessions(vec![
            session(1, "PC-3", "ravi", "14:00", "15:00"),
            session(2, "PC-3", "asha", "15:00", "16:00"),
            session(3, "PC-4", "ravi", "15:00", "16:00"),
        ]);
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn another_customer_sharing_the_console_does_not_split_a_chain() {
        let merger = merger_at_ist(14, 30);
        // asha's row starts at the same minute as ravi's second segment
        let rows = merger.merge_sessions(vec![
            session(1, "PC-3", "ravi", "14:00", "15:00"),
            session(2, "PC-3", "asha", "15:00", "16:00"),
            session(3, "PC-3", "ravi", "15:00", "16:00"),
        ]);
        assert_eq!(rows.len(), 2);
        let ravi = rows
            .iter()
            .find(|r| r.username == "ravi")
            .expect("merged ravi row");
        assert_eq!(ravi.start_time, "14:00");
        assert_eq!(ravi.end_time, "16:00");
    }

    #[test]
    fn gap_between_sessions_does_not_merge() {
        let merger = merger_at_ist(14, 30);
        let rows = merger.merge_sessions(vec![
            session(1, "PC-3", "ravi", "14:00", "15:00"),
            session(2, "PC-3", "ravi", "15:30", "16:00"),
        ]);
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn merge_is_idempotent() {
        let merger = merger_at_ist(14, 30);
        let once = merger.merge_sessions(vec![
            session(1, "PC-3", "ravi", "14:00", "15:00"),
            session(2, "PC-3", "ravi", "15:00", "16:00"),
            session(4, "PC-4", "asha", "14:00", "15:00"),
        ]);
        let twice = merger.merge(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn timers_derive_from_the_time_basis() {
        let merger = merger_at_ist(15, 20);
        let row = MergedSession::from(session(1, "PC-3", "ravi", "14:00", "15:00"));
        assert_eq!(merger.elapsed_minutes(&row), 80);
        assert_eq!(merger.extra_minutes(&row), 20);
        assert_eq!(merger.progress_percent(&row), 100.0);
        // 20 minutes over at 100/hr -> ceil(33.33..) = 34
        assert_eq!(merger.overtime_amount(&row, None), 34.0);
        assert_eq!(merger.overtime_amount(&row, Some(60.0)), 20.0);
    }

    #[test]
    fn configured_house_rate_overrides_unit_price() {
        let utc = Utc.with_ymd_and_hms(2025, 1, 10, 15, 30, 0).unwrap()
            - chrono::Duration::minutes(330);
        let merger = SessionMerger::new(
            TimeBasis::new(Arc::new(FixedClock(utc)), 330).unwrap(),
            Some(120.0),
        );
        let row = MergedSession::from(session(1, "PC-3", "ravi", "14:00", "15:00"));
        // 30 minutes over at the house rate of 120/hr
        assert_eq!(merger.overtime_amount(&row, None), 60.0);
        // An explicit rate still wins over the house rate
        assert_eq!(merger.overtime_amount(&row, Some(60.0)), 30.0);
    }

    #[test]
    fn session_within_booked_window_has_no_overtime() {
        let merger = merger_at_ist(14, 30);
        let row = MergedSession::from(session(1, "PC-3", "ravi", "14:00", "15:00"));
        assert_eq!(merger.extra_minutes(&row), 0);
        assert_eq!(merger.overtime_amount(&row, None), 0.0);
        assert_eq!(merger.progress_percent(&row), 50.0);
    }

    #[test]
    fn duplicate_accept_notification_is_a_noop() {
        let feed = LiveSessionFeed::new();
        let event = CafeNotification::BookingAccepted {
            booking_id: 7,
            session: session(7, "PC-1", "ravi", "14:00", "15:00"),
        };
        feed.apply(&event);
        let after_once = feed.sessions();
        feed.apply(&event);
        assert_eq!(feed.sessions(), after_once);
        assert_eq!(after_once.len(), 1);
    }

    #[test]
    fn rejection_tombstones_late_duplicates() {
        let feed = LiveSessionFeed::new();
        let request = CafeNotification::PayAtCafeRequested {
            booking_id: 7,
            session: session(7, "PC-1", "ravi", "14:00", "15:00"),
        };
        feed.apply(&request);
        feed.apply(&CafeNotification::BookingRejected { booking_id: 7 });
        // A duplicate of the original request arrives after the decision
        feed.apply(&request);
        assert!(feed.pending().is_empty());
        assert!(feed.sessions().is_empty());
    }

    #[test]
    fn poll_upsert_cannot_resurrect_a_released_session() {
        let feed = LiveSessionFeed::new();
        feed.upsert(session(5, "PC-2", "asha", "14:00", "15:00"));
        assert_eq!(feed.sessions().len(), 1);
        feed.apply(&CafeNotification::ConsoleReleased { booking_id: 5 });
        // A stale poll result arrives after the release decision
        feed.upsert(session(5, "PC-2", "asha", "14:00", "15:00"));
        assert!(feed.sessions().is_empty());
    }

    #[test]
    fn replace_all_respects_tombstones() {
        let feed = LiveSessionFeed::new();
        feed.apply(&CafeNotification::ConsoleReleased { booking_id: 3 });
        feed.replace_all(vec![
            session(3, "PC-1", "ravi", "14:00", "15:00"),
            session(4, "PC-2", "asha", "14:00", "15:00"),
        ]);
        let ids: Vec<i64> = feed.sessions().iter().map(|s| s.booking_id).collect();
        assert_eq!(ids, vec![4]);
    }
}
