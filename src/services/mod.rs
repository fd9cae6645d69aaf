//! Business logic services

pub mod booking;
pub mod booking_form;
pub mod conflict;
pub mod directory;
pub mod pricing;
pub mod proration;
pub mod sessions;
pub mod slots;
pub mod time;

use std::sync::Arc;

use crate::{client::BookingApi, config::AppConfig, error::AppResult};

/// Container for all services
pub struct Services {
    pub time: time::TimeBasis,
    pub proration: proration::ProrationEngine,
    pub pricing: pricing::PricingAggregator,
    pub merger: sessions::SessionMerger,
    pub feed: Arc<sessions::LiveSessionFeed>,
    pub directory: Arc<directory::CustomerDirectory>,
    pub slots: slots::SlotFetcher,
    pub booking: booking::BookingService,
}

impl Services {
    /// Create all services against the given booking service client
    pub fn new(api: Arc<dyn BookingApi>, config: &AppConfig) -> AppResult<Self> {
        let clock = Arc::new(time::SystemClock);
        Self::with_clock(api, config, clock)
    }

    /// Like [`Self::new`] but with an explicit clock, for deterministic tests
    pub fn with_clock(
        api: Arc<dyn BookingApi>,
        config: &AppConfig,
        clock: Arc<dyn time::Clock>,
    ) -> AppResult<Self> {
        let time = time::TimeBasis::new(clock, config.business.utc_offset_minutes)?;
        let directory = Arc::new(directory::CustomerDirectory::new(
            config.business.directory_ttl_minutes,
        ));

        Ok(Self {
            time: time.clone(),
            proration: proration::ProrationEngine::new(time.clone()),
            pricing: pricing::PricingAggregator::new(config.business.slot_unit_minutes),
            merger: sessions::SessionMerger::new(
                time,
                config.business.overtime_rate_per_hour,
            ),
            feed: Arc::new(sessions::LiveSessionFeed::new()),
            directory: Arc::clone(&directory),
            slots: slots::SlotFetcher::new(Arc::clone(&api)),
            booking: booking::BookingService::new(
                api,
                directory,
                config.booking_service.vendor_id.clone(),
            ),
        })
    }
}
