//! Booking wire types and the mutable draft aggregate

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::addon::AddOnLine;
use super::pass::Pass;
use super::slot::SelectedSlotSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Upi,
    Pass,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BookingMode {
    #[default]
    Regular,
    /// Private/manual booking: explicit date + duration instead of discrete slots
    Private,
}

/// Explicit interval for private/manual bookings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualInterval {
    pub console_id: i64,
    pub console_name: String,
    /// Calendar date (YYYY-MM-DD)
    pub date: String,
    /// Start time (HH:MM)
    pub start_time: String,
    pub duration_minutes: i64,
}

/// The mutable aggregate built by the booking form state machine.
/// Created empty when the booking UI opens, mutated field-by-field,
/// consumed exactly once on submit.
#[derive(Debug, Clone, Default)]
pub struct BookingDraft {
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub payment_method: Option<PaymentMethod>,
    pub booking_mode: BookingMode,
    pub slots: SelectedSlotSet,
    pub manual_interval: Option<ManualInterval>,
    /// Keyed by item_id; re-selecting an item replaces its line
    pub addons: IndexMap<i64, AddOnLine>,
    pub manual_waive_off: f64,
    pub extra_fee: f64,
    /// Present only after a successful server-side validation
    pub validated_pass: Option<Pass>,
}

impl BookingDraft {
    pub fn console_total(&self) -> f64 {
        self.slots.console_total()
    }

    pub fn addons_total(&self) -> f64 {
        self.addons.values().map(AddOnLine::total).sum()
    }
}

/// Create booking request sent to the external booking service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateBookingRequest {
    pub vendor: String,
    pub console_type: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    /// Calendar date (YYYY-MM-DD)
    pub date: String,
    pub slot_ids: Vec<i64>,
    pub payment_type: PaymentMethod,
    /// Manual + automatic waive-off, combined
    pub waive_off_total: f64,
    pub extra_fee: f64,
    pub addons: Vec<AddOnLine>,
    pub booking_mode: BookingMode,
    /// Set for private/manual bookings only
    pub duration_minutes: Option<i64>,
}

/// Create booking response from the external booking service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookingResponse {
    pub success: bool,
    pub booking_id: Option<i64>,
    pub message: Option<String>,
    /// Slot ids already taken by a competing booking
    pub failed_slots: Option<Vec<i64>>,
}

/// Pass redemption request. Redemption is not reversible from this layer,
/// so it must precede booking creation when paying by pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedeemPassRequest {
    pub pass_uid: String,
    pub vendor: String,
    pub hours_to_deduct: f64,
    /// Session window carried as audit notes
    pub session_start: String,
    pub session_end: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedeemPassResponse {
    pub success: bool,
    pub error: Option<String>,
}
