//! Configuration management for the ConsoleDesk engine

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct BookingServiceConfig {
    /// Base URL of the external booking service
    pub base_url: String,
    /// Vendor identity claim sent with every request
    pub vendor_id: String,
    pub timeout_seconds: u64,
}

/// Business policy constants. These encode cafe policy, not code
/// convenience, so they live in configuration rather than as literals.
#[derive(Debug, Deserialize, Clone)]
pub struct BusinessConfig {
    /// Fixed civil timezone of the cafe, as minutes east of UTC (IST = 330)
    pub utc_offset_minutes: i32,
    /// Length of one bookable slot in the regular flow
    pub slot_unit_minutes: i64,
    /// Customer directory cache lifetime
    pub directory_ttl_minutes: u64,
    /// Explicit overtime rate; falls back to the session's unit price when unset
    pub overtime_rate_per_hour: Option<f64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub booking_service: BookingServiceConfig,
    #[serde(default)]
    pub business: BusinessConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on the environment-specific file
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add environment variables (with prefix CONSOLEDESK_)
            .add_source(
                Environment::with_prefix("CONSOLEDESK")
                    .separator("_")
                    .try_parsing(true),
            )
            // Override booking service URL from BOOKING_SERVICE_URL env var if present
            .set_override_option(
                "booking_service.base_url",
                env::var("BOOKING_SERVICE_URL").ok(),
            )?
            .build()?;

        config.try_deserialize()
    }
}

impl Default for BookingServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api/v1".to_string(),
            vendor_id: String::new(),
            timeout_seconds: 15,
        }
    }
}

impl Default for BusinessConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 330,
            slot_unit_minutes: 30,
            directory_ttl_minutes: 10,
            overtime_rate_per_hour: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
