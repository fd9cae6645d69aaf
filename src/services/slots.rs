//! Slot availability fetching with supersession
//!
//! When the operator changes console or date while a fetch is in flight,
//! the stale response must be discarded, not applied. Each fetch takes a
//! generation ticket; any later fetch or explicit invalidation makes
//! earlier tickets stale.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::{client::BookingApi, error::AppResult, models::TimeSlot};

pub struct SlotFetcher {
    api: Arc<dyn BookingApi>,
    generation: AtomicU64,
}

impl SlotFetcher {
    pub fn new(api: Arc<dyn BookingApi>) -> Self {
        Self {
            api,
            generation: AtomicU64::new(0),
        }
    }

    /// Mark every in-flight fetch stale (e.g. after a slot conflict forces
    /// a hard refresh, or the selection changed without a new fetch yet).
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Fetch availability for a console/date. Returns `Ok(None)` when the
    /// response was superseded by a newer selection and must not be applied.
    pub async fn fetch(
        &self,
        vendor: &str,
        console_id: i64,
        date: &str,
    ) -> AppResult<Option<Vec<TimeSlot>>> {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let slots = self.api.fetch_slots(vendor, console_id, date).await?;
        if self.generation.load(Ordering::SeqCst) != ticket {
            tracing::debug!(console_id, date, "discarding superseded slot fetch");
            return Ok(None);
        }
        Ok(Some(slots))
    }
}
