//! Classification of booking submission outcomes

use crate::models::CreateBookingResponse;

/// Failure half of a submission outcome
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionFailure {
    /// Transient or business-rule failure; shown inline, data kept
    Recoverable(String),
    /// The authoritative slot grid diverged from the local selection.
    /// Slot availability must be re-fetched before another attempt: the
    /// listed slot ids may have been taken, reused or invalidated.
    Conflict {
        message: String,
        failed_slot_ids: Vec<i64>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    Accepted { booking_id: i64 },
    Failed(SubmissionFailure),
}

/// Interpret a create-booking response. Pure; no I/O.
pub fn classify(response: &CreateBookingResponse) -> SubmissionOutcome {
    if response.success {
        return match response.booking_id {
            Some(booking_id) => SubmissionOutcome::Accepted { booking_id },
            None => SubmissionOutcome::Failed(SubmissionFailure::Recoverable(
                "Booking service accepted without a booking id".to_string(),
            )),
        };
    }

    match response.failed_slots.as_deref() {
        Some(slots) if !slots.is_empty() => {
            SubmissionOutcome::Failed(SubmissionFailure::Conflict {
                message: response
                    .message
                    .clone()
                    .unwrap_or_else(|| "Selected slots are no longer available".to_string()),
                failed_slot_ids: slots.to_vec(),
            })
        }
        _ => SubmissionOutcome::Failed(SubmissionFailure::Recoverable(
            response
                .message
                .clone()
                .unwrap_or_else(|| "Booking could not be created".to_string()),
        )),
    }
}
