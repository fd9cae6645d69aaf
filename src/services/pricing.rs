//! Booking price aggregation
//!
//! Single source of truth for the displayed total. All call sites
//! (regular bookings, private bookings, live settle) must route through
//! [`PricingAggregator::quote`]; there is deliberately no second formula.

use serde::Serialize;

/// Itemized price breakdown for one booking
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quote {
    pub console_total: f64,
    pub addons_total: f64,
    pub manual_waive_off: f64,
    pub auto_waive_off: f64,
    pub extra_fee: f64,
    /// `max(0, console - manual - auto + extra + addons)`
    pub total: f64,
}

#[derive(Debug, Clone)]
pub struct PricingAggregator {
    slot_unit_minutes: i64,
}

impl PricingAggregator {
    pub fn new(slot_unit_minutes: i64) -> Self {
        Self { slot_unit_minutes }
    }

    /// Combine the five pricing inputs into a non-negative total.
    ///
    /// Inputs are coerced: non-finite or negative values count as zero, so
    /// a bad upstream value can never surface as NaN in the display.
    /// Waive-offs are not capped at `console_total` before extras/add-ons
    /// are applied; add-ons are never discounted by the slot waive-off.
    pub fn quote(
        &self,
        console_total: f64,
        addons_total: f64,
        manual_waive_off: f64,
        auto_waive_off: f64,
        extra_fee: f64,
    ) -> Quote {
        let console_total = sanitize(console_total);
        let addons_total = sanitize(addons_total);
        let manual_waive_off = sanitize(manual_waive_off);
        let auto_waive_off = sanitize(auto_waive_off);
        let extra_fee = sanitize(extra_fee);

        let total = (console_total - manual_waive_off - auto_waive_off + extra_fee + addons_total)
            .max(0.0);

        Quote {
            console_total,
            addons_total,
            manual_waive_off,
            auto_waive_off,
            extra_fee,
            total,
        }
    }

    /// Pass hours needed to cover `slot_count` fixed-length slots
    pub fn hours_required(&self, slot_count: usize) -> f64 {
        slot_count as f64 * self.slot_unit_minutes as f64 / 60.0
    }

    /// Pass hours needed to cover an explicit manual duration
    pub fn hours_for_duration(&self, duration_minutes: i64) -> f64 {
        duration_minutes.max(0) as f64 / 60.0
    }
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aggregator() -> PricingAggregator {
        PricingAggregator::new(30)
    }

    #[test]
    fn combines_all_inputs() {
        // console 200, manual 20, auto 50, extra 30, addons 80 -> 240
        let quote = aggregator().quote(200.0, 80.0, 20.0, 50.0, 30.0);
        assert_eq!(quote.total, 240.0);
    }

    #[test]
    fn total_is_floored_at_zero() {
        let quote = aggregator().quote(100.0, 0.0, 500.0, 50.0, 0.0);
        assert_eq!(quote.total, 0.0);
    }

    #[test]
    fn large_waive_off_plus_addons_nets_positive() {
        // Waive-offs exceed the console total, but add-ons are not discounted
        let quote = aggregator().quote(100.0, 60.0, 90.0, 90.0, 0.0);
        assert_eq!(quote.total, 0.0);

        let quote = aggregator().quote(100.0, 60.0, 80.0, 40.0, 0.0);
        assert_eq!(quote.total, 40.0);
    }

    #[test]
    fn invalid_inputs_are_coerced_to_zero() {
        let quote = aggregator().quote(f64::NAN, f64::INFINITY, -5.0, f64::NEG_INFINITY, -1.0);
        assert_eq!(quote.total, 0.0);
        assert!(quote.total.is_finite());

        let quote = aggregator().quote(200.0, f64::NAN, -20.0, 0.0, 0.0);
        assert_eq!(quote.total, 200.0);
    }

    #[test]
    fn hours_required_uses_slot_unit() {
        assert_eq!(aggregator().hours_required(3), 1.5);
        assert_eq!(aggregator().hours_required(0), 0.0);
        // 60-minute house policy
        assert_eq!(PricingAggregator::new(60).hours_required(2), 2.0);
    }

    #[test]
    fn hours_for_duration_clamps_negative() {
        assert_eq!(aggregator().hours_for_duration(90), 1.5);
        assert_eq!(aggregator().hours_for_duration(-30), 0.0);
    }
}
