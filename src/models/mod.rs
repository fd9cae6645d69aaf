//! Data models for ConsoleDesk

pub mod addon;
pub mod booking;
pub mod customer;
pub mod notification;
pub mod pass;
pub mod session;
pub mod slot;

// Re-export commonly used types
pub use addon::{AddOnCategory, AddOnLine};
pub use booking::{
    BookingDraft, BookingMode, CreateBookingRequest, CreateBookingResponse, ManualInterval,
    PaymentMethod, RedeemPassRequest, RedeemPassResponse,
};
pub use customer::CustomerRecord;
pub use notification::CafeNotification;
pub use pass::{Pass, PassValidationResponse};
pub use session::{ActiveSession, MergedSession, SessionStatus};
pub use slot::{SelectedSlotSet, TimeSlot};
