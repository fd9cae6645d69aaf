//! Automatic waive-off ("auto waive-off") for selected slots
//!
//! When a booking is entered after a slot's window has partially or fully
//! elapsed, the elapsed portion is discounted automatically. The result
//! depends on wall-clock time and must be recomputed on every selection
//! or time change, never cached.

use chrono::{DateTime, FixedOffset};

use crate::models::TimeSlot;

use super::time::TimeBasis;

#[derive(Clone)]
pub struct ProrationEngine {
    time: TimeBasis,
}

impl ProrationEngine {
    pub fn new(time: TimeBasis) -> Self {
        Self { time }
    }

    /// Waive-off contribution of one slot at `now`, clamped to
    /// `[0, unit_price]`. Unparseable slots contribute zero.
    pub fn slot_contribution(&self, slot: &TimeSlot, now: DateTime<FixedOffset>) -> f64 {
        let start = self.time.to_instant(&slot.date, &slot.start_time);
        let end = self.time.to_instant(&slot.date, &slot.end_time);
        let (start, end) = match (start, end) {
            (Ok(s), Ok(e)) => (s, e),
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!(slot_id = slot.slot_id, error = %e, "skipping slot with unparseable time");
                return 0.0;
            }
        };
        if end <= start {
            tracing::warn!(slot_id = slot.slot_id, "skipping slot with non-positive duration");
            return 0.0;
        }

        let price = if slot.unit_price.is_finite() {
            slot.unit_price.max(0.0)
        } else {
            0.0
        };

        if now < start {
            // Booked in advance: nothing has elapsed
            return 0.0;
        }
        if now >= end {
            // Window fully elapsed before booking entry: the whole slot is
            // waived. Flagged as a product question; behavior preserved.
            return price;
        }

        let duration_min = (end - start).num_seconds() as f64 / 60.0;
        let elapsed_min = (now - start).num_seconds() as f64 / 60.0;
        (price * elapsed_min / duration_min).clamp(0.0, price)
    }

    /// Total auto waive-off over a selection at `now`: summed per slot,
    /// rounded to the nearest currency unit once at the end, floored at zero.
    pub fn auto_waive_off<'a>(
        &self,
        slots: impl IntoIterator<Item = &'a TimeSlot>,
        now: DateTime<FixedOffset>,
    ) -> f64 {
        let sum: f64 = slots
            .into_iter()
            .map(|slot| self.slot_contribution(slot, now))
            .sum();
        sum.round().max(0.0)
    }

    /// Total auto waive-off as of the current instant
    pub fn auto_waive_off_now<'a>(&self, slots: impl IntoIterator<Item = &'a TimeSlot>) -> f64 {
        self.auto_waive_off(slots, self.time.now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::time::FixedClock;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    fn basis_at_ist(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> TimeBasis {
        // Store the instant as UTC so the fixture reads in IST wall time
        let utc = Utc
            .with_ymd_and_hms(y, mo, d, h, mi, 0)
            .unwrap()
            - chrono::Duration::minutes(330);
        TimeBasis::new(Arc::new(FixedClock(utc)), 330).unwrap()
    }

    fn slot(start: &str, end: &str, unit_price: f64) -> TimeSlot {
        TimeSlot {
            slot_id: 1,
            date: "2025-01-10".to_string(),
            start_time: start.to_string(),
            end_time: end.to_string(),
            console_id: 3,
            console_name: "PC-3".to_string(),
            unit_price,
            is_available: true,
        }
    }

    #[test]
    fn mid_slot_booking_waives_elapsed_portion() {
        // Scenario: 14:00-15:00 slot at 100, booked at 14:30 IST
        let basis = basis_at_ist(2025, 1, 10, 14, 30);
        let engine = ProrationEngine::new(basis.clone());
        let s = slot("14:00", "15:00", 100.0);
        assert_eq!(engine.slot_contribution(&s, basis.now()), 50.0);
        assert_eq!(engine.auto_waive_off(std::iter::once(&s), basis.now()), 50.0);
    }

    #[test]
    fn advance_booking_waives_nothing() {
        let basis = basis_at_ist(2025, 1, 10, 13, 0);
        let engine = ProrationEngine::new(basis.clone());
        let slots = vec![slot("14:00", "15:00", 100.0), slot("15:00", "16:00", 100.0)];
        assert_eq!(engine.auto_waive_off(slots.iter(), basis.now()), 0.0);
    }

    #[test]
    fn fully_elapsed_slot_is_waived_in_full() {
        let basis = basis_at_ist(2025, 1, 10, 16, 0);
        let engine = ProrationEngine::new(basis.clone());
        let s = slot("14:00", "15:00", 100.0);
        assert_eq!(engine.slot_contribution(&s, basis.now()), 100.0);
    }

    #[test]
    fn contribution_is_bounded_by_unit_price() {
        let engine_times = [
            basis_at_ist(2025, 1, 10, 13, 0),
            basis_at_ist(2025, 1, 10, 14, 15),
            basis_at_ist(2025, 1, 10, 14, 59),
            basis_at_ist(2025, 1, 10, 23, 0),
        ];
        let s = slot("14:00", "15:00", 80.0);
        for basis in engine_times {
            let engine = ProrationEngine::new(basis.clone());
            let c = engine.slot_contribution(&s, basis.now());
            assert!((0.0..=80.0).contains(&c), "contribution {} out of bounds", c);
        }
    }

    #[test]
    fn rounding_happens_once_at_the_end() {
        // Two slots each 20 minutes into a 60-minute window at price 50:
        // contributions 16.66.. each, sum 33.33.. -> rounds to 33 (not 17+17)
        let basis = basis_at_ist(2025, 1, 10, 14, 20);
        let engine = ProrationEngine::new(basis.clone());
        let mut a = slot("14:00", "15:00", 50.0);
        a.slot_id = 1;
        let mut b = slot("14:00", "15:00", 50.0);
        b.slot_id = 2;
        let slots = vec![a, b];
        assert_eq!(engine.auto_waive_off(slots.iter(), basis.now()), 33.0);
    }

    #[test]
    fn unparseable_slot_is_skipped_not_fatal() {
        let basis = basis_at_ist(2025, 1, 10, 14, 30);
        let engine = ProrationEngine::new(basis.clone());
        let mut bad = slot("garbage", "15:00", 100.0);
        bad.slot_id = 9;
        let good = slot("14:00", "15:00", 100.0);
        let slots = vec![bad, good];
        // Bad record contributes zero; the rest of the set still prices
        assert_eq!(engine.auto_waive_off(slots.iter(), basis.now()), 50.0);
    }

    #[test]
    fn non_positive_duration_contributes_zero() {
        let basis = basis_at_ist(2025, 1, 10, 14, 30);
        let engine = ProrationEngine::new(basis.clone());
        let s = slot("15:00", "15:00", 100.0);
        assert_eq!(engine.slot_contribution(&s, basis.now()), 0.0);
    }
}
