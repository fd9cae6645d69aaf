//! Unsolicited events from the process-wide notification channel
//!
//! Delivery is best-effort and may duplicate; every event carries the
//! identifier needed to apply it idempotently.

use serde::{Deserialize, Serialize};

use super::session::ActiveSession;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CafeNotification {
    /// A customer asked to pay at the cafe; awaiting an operator decision
    PayAtCafeRequested {
        booking_id: i64,
        session: ActiveSession,
    },
    BookingAccepted {
        booking_id: i64,
        session: ActiveSession,
    },
    BookingRejected {
        booking_id: i64,
    },
    ConsoleReleased {
        booking_id: i64,
    },
}

impl CafeNotification {
    pub fn booking_id(&self) -> i64 {
        match self {
            Self::PayAtCafeRequested { booking_id, .. }
            | Self::BookingAccepted { booking_id, .. }
            | Self::BookingRejected { booking_id }
            | Self::ConsoleReleased { booking_id } => *booking_id,
        }
    }
}
