//! ConsoleDesk - Gaming Cafe Booking Engine
//!
//! The slot booking, pricing and live-session core of a gaming-cafe
//! front-of-house dashboard: proration of partially elapsed slots,
//! price aggregation with waive-offs and add-ons, pass-hour redemption
//! gating, merging of back-to-back sessions for live monitoring, and
//! classification of submission outcomes. All slot/booking state is
//! owned by a remote booking service consumed through [`client::BookingApi`];
//! this crate computes derived values and drives the booking form state
//! machine, and exposes no network endpoints of its own.

use std::sync::Arc;

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod telemetry;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across an embedding dashboard
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
