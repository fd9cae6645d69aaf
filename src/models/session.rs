//! Live session models for the monitoring view

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Pending,
    Completed,
}

/// A currently running booking as returned by the live-monitoring feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveSession {
    pub slot_id: i64,
    pub booking_id: i64,
    pub console_number: String,
    pub console_type: String,
    pub username: String,
    /// Calendar date (YYYY-MM-DD)
    pub date: String,
    /// Start time (HH:MM or HH:MM:SS); the feed uses one format consistently
    pub start_time: String,
    pub end_time: String,
    pub price: f64,
    pub status: SessionStatus,
}

/// One display row of the live-monitoring table: a single session, or
/// several back-to-back sessions for the same console/customer collapsed
/// into one timer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedSession {
    /// Most recent segment's booking id, used for release/settle actions
    pub booking_id: i64,
    /// All segment slot ids, in chronological order
    pub slot_ids: Vec<i64>,
    pub console_number: String,
    pub console_type: String,
    pub username: String,
    pub date: String,
    /// Earliest segment start
    pub start_time: String,
    /// Latest segment end
    pub end_time: String,
    /// Combined price over all segments
    pub price: f64,
    /// Per-segment price of the most recent segment; default overtime rate
    pub unit_price: f64,
    pub status: SessionStatus,
}

impl From<ActiveSession> for MergedSession {
    fn from(session: ActiveSession) -> Self {
        Self {
            booking_id: session.booking_id,
            slot_ids: vec![session.slot_id],
            console_number: session.console_number,
            console_type: session.console_type,
            username: session.username,
            date: session.date,
            start_time: session.start_time,
            end_time: session.end_time,
            price: session.price,
            unit_price: session.price,
            status: session.status,
        }
    }
}
