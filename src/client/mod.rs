//! Client for the external booking service
//!
//! The booking service owns all slot/booking state; this crate only
//! computes derived values from what it is handed. [`BookingApi`] is the
//! seam the services are written against; [`HttpBookingClient`] is the
//! production implementation.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::{
    config::BookingServiceConfig,
    error::{AppError, AppResult},
    models::{
        CreateBookingRequest, CreateBookingResponse, CustomerRecord, PassValidationResponse,
        RedeemPassRequest, RedeemPassResponse, TimeSlot,
    },
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingApi: Send + Sync {
    /// Fetch available slots for a console on a date
    async fn fetch_slots(
        &self,
        vendor: &str,
        console_id: i64,
        date: &str,
    ) -> AppResult<Vec<TimeSlot>>;

    /// Fetch the vendor's customer directory
    async fn fetch_customers(&self, vendor: &str) -> AppResult<Vec<CustomerRecord>>;

    /// Validate a pass without consuming hours
    async fn validate_pass(
        &self,
        vendor: &str,
        pass_uid: &str,
    ) -> AppResult<PassValidationResponse>;

    /// Deduct hours from a pass. Not reversible from this layer.
    async fn redeem_pass(&self, request: &RedeemPassRequest) -> AppResult<RedeemPassResponse>;

    /// Create a booking. Application-level failures (including slot
    /// conflicts) come back in the response body, not as an `Err`.
    async fn create_booking(
        &self,
        request: &CreateBookingRequest,
    ) -> AppResult<CreateBookingResponse>;
}

#[derive(Serialize)]
struct ValidatePassBody<'a> {
    vendor: &'a str,
    pass_uid: &'a str,
}

/// HTTP implementation of [`BookingApi`]
#[derive(Clone)]
pub struct HttpBookingClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpBookingClient {
    pub fn new(config: &BookingServiceConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl BookingApi for HttpBookingClient {
    async fn fetch_slots(
        &self,
        vendor: &str,
        console_id: i64,
        date: &str,
    ) -> AppResult<Vec<TimeSlot>> {
        let response = self
            .http
            .get(format!("{}/slots", self.base_url))
            .query(&[
                ("vendor", vendor),
                ("console_id", &console_id.to_string()),
                ("date", date),
            ])
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }

    async fn fetch_customers(&self, vendor: &str) -> AppResult<Vec<CustomerRecord>> {
        let response = self
            .http
            .get(format!("{}/customers", self.base_url))
            .query(&[("vendor", vendor)])
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }

    async fn validate_pass(
        &self,
        vendor: &str,
        pass_uid: &str,
    ) -> AppResult<PassValidationResponse> {
        let response = self
            .http
            .post(format!("{}/passes/validate", self.base_url))
            .json(&ValidatePassBody { vendor, pass_uid })
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }

    async fn redeem_pass(&self, request: &RedeemPassRequest) -> AppResult<RedeemPassResponse> {
        let response = self
            .http
            .post(format!("{}/passes/redeem", self.base_url))
            .json(request)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }

    async fn create_booking(
        &self,
        request: &CreateBookingRequest,
    ) -> AppResult<CreateBookingResponse> {
        let response = self
            .http
            .post(format!("{}/bookings", self.base_url))
            .json(request)
            .send()
            .await?;

        // Conflict and business-rule failures arrive as non-2xx with a
        // regular response body; only an unparseable reply is structural.
        let status = response.status();
        match response.json::<CreateBookingResponse>().await {
            Ok(body) => Ok(body),
            Err(e) if status.is_success() => Err(e.into()),
            Err(_) => Err(AppError::ServiceUnavailable(format!(
                "booking service returned {}",
                status
            ))),
        }
    }
}
