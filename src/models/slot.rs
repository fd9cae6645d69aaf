//! Bookable time slot and the operator's working selection

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// A bookable interval for one console on one calendar date.
/// Immutable once fetched; supplied by the external scheduling service.
/// Slots never cross midnight: `start_time < end_time` on the same date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub slot_id: i64,
    /// Calendar date (YYYY-MM-DD)
    pub date: String,
    /// Start time (HH:MM or HH:MM:SS)
    pub start_time: String,
    /// End time (HH:MM or HH:MM:SS)
    pub end_time: String,
    pub console_id: i64,
    pub console_name: String,
    pub unit_price: f64,
    #[serde(default)]
    pub is_available: bool,
}

/// Ordered, duplicate-free set of slots chosen for one booking.
///
/// In the regular flow all slots must belong to one console and one date;
/// private/manual bookings bypass this set entirely and carry an explicit
/// date + duration instead.
#[derive(Debug, Clone, Default)]
pub struct SelectedSlotSet {
    slots: IndexMap<i64, TimeSlot>,
}

impl SelectedSlotSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a slot to the selection. Re-selecting an already-present
    /// `slot_id` replaces it. Fails when the slot belongs to a different
    /// console or date than the existing selection.
    pub fn select(&mut self, slot: TimeSlot) -> AppResult<()> {
        if let Some(first) = self.slots.values().next() {
            if first.console_id != slot.console_id {
                return Err(AppError::Validation(
                    "All slots in a booking must be for the same console".to_string(),
                ));
            }
            if first.date != slot.date {
                return Err(AppError::Validation(
                    "All slots in a booking must be on the same date".to_string(),
                ));
            }
        }
        self.slots.insert(slot.slot_id, slot);
        Ok(())
    }

    pub fn deselect(&mut self, slot_id: i64) {
        self.slots.shift_remove(&slot_id);
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn contains(&self, slot_id: i64) -> bool {
        self.slots.contains_key(&slot_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimeSlot> {
        self.slots.values()
    }

    pub fn slot_ids(&self) -> Vec<i64> {
        self.slots.keys().copied().collect()
    }

    /// Sum of unit prices over the selection
    pub fn console_total(&self) -> f64 {
        self.slots
            .values()
            .map(|s| if s.unit_price.is_finite() { s.unit_price } else { 0.0 })
            .sum()
    }

    /// Earliest start and latest end of the selection (lexicographic on
    /// zero-padded HH:MM strings), for the session audit window.
    pub fn window(&self) -> Option<(String, String)> {
        let start = self.slots.values().map(|s| s.start_time.clone()).min()?;
        let end = self.slots.values().map(|s| s.end_time.clone()).max()?;
        Some((start, end))
    }

    pub fn first(&self) -> Option<&TimeSlot> {
        self.slots.values().next()
    }
}
