//! Booking submission orchestration
//!
//! All I/O around the pure form state machine: pass redemption before
//! booking creation, outcome classification, the booking-created domain
//! event, and the conditional customer directory refresh.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::{
    client::BookingApi,
    error::AppResult,
    models::{PassValidationResponse, PaymentMethod, RedeemPassRequest},
};

use super::booking_form::{BookingForm, SubmissionPayload};
use super::conflict::{self, SubmissionFailure, SubmissionOutcome};
use super::directory::CustomerDirectory;
use super::pricing::PricingAggregator;
use super::proration::ProrationEngine;

/// Events for interested dashboards (e.g. the live-monitoring view)
#[derive(Debug, Clone)]
pub enum DomainEvent {
    BookingCreated { booking_id: i64 },
}

const EVENT_CHANNEL_CAPACITY: usize = 32;

pub struct BookingService {
    api: Arc<dyn BookingApi>,
    directory: Arc<CustomerDirectory>,
    events: broadcast::Sender<DomainEvent>,
    vendor: String,
}

impl BookingService {
    pub fn new(api: Arc<dyn BookingApi>, directory: Arc<CustomerDirectory>, vendor: String) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            api,
            directory,
            events,
            vendor,
        }
    }

    /// Subscribe to domain events. Best-effort: lagging receivers miss events.
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.events.subscribe()
    }

    /// Validate a pass with the booking service. A transport failure means
    /// the Pass payment option degrades (disabled), not that the form dies.
    pub async fn validate_pass(&self, pass_uid: &str) -> AppResult<PassValidationResponse> {
        self.api.validate_pass(&self.vendor, pass_uid).await
    }

    /// Submit the form. Validation failures surface as `Err` with the form
    /// still `Editing`; service-side results are applied to the form and
    /// returned as the classified outcome.
    pub async fn submit(
        &self,
        form: &mut BookingForm,
        pricing: &PricingAggregator,
        proration: &ProrationEngine,
    ) -> AppResult<SubmissionOutcome> {
        let auto_waive_off = proration.auto_waive_off_now(form.draft().slots.iter());
        let payload = form.begin_submit(pricing, auto_waive_off, &self.vendor)?;

        let outcome = self.run_submission(&payload).await;
        form.complete(outcome.clone());

        if let SubmissionOutcome::Accepted { booking_id } = &outcome {
            tracing::info!(booking_id, "booking created");
            // Receiver count may be zero; that is fine
            let _ = self.events.send(DomainEvent::BookingCreated {
                booking_id: *booking_id,
            });

            // Repeat customers are already in the directory; skip the refetch
            if !self
                .directory
                .contains_identity(&payload.request.customer_email, &payload.request.customer_phone)
            {
                if let Err(e) = self.directory.refresh(self.api.as_ref(), &self.vendor).await {
                    tracing::warn!(error = %e, "post-booking directory refresh failed");
                }
            }
        }

        Ok(outcome)
    }

    /// Redeem-before-create: redemption is not reversible from this layer,
    /// so when paying by pass no booking call happens until the hours are
    /// successfully deducted.
    async fn run_submission(&self, payload: &SubmissionPayload) -> SubmissionOutcome {
        if payload.payment_method == PaymentMethod::Pass {
            let pass = match &payload.pass {
                Some(pass) => pass,
                None => {
                    return SubmissionOutcome::Failed(SubmissionFailure::Recoverable(
                        "No validated pass on the booking".to_string(),
                    ))
                }
            };
            let request = RedeemPassRequest {
                pass_uid: pass.pass_uid.clone(),
                vendor: self.vendor.clone(),
                hours_to_deduct: payload.hours_required,
                session_start: payload.session_start.clone(),
                session_end: payload.session_end.clone(),
                notes: Some(format!(
                    "Booking for {} ({})",
                    payload.request.customer_name, payload.request.date
                )),
            };
            match self.api.redeem_pass(&request).await {
                Ok(response) if response.success => {}
                Ok(response) => {
                    return SubmissionOutcome::Failed(SubmissionFailure::Recoverable(
                        response
                            .error
                            .unwrap_or_else(|| "Pass redemption failed".to_string()),
                    ))
                }
                Err(e) => {
                    return SubmissionOutcome::Failed(SubmissionFailure::Recoverable(
                        e.to_string(),
                    ))
                }
            }
        }

        match self.api.create_booking(&payload.request).await {
            Ok(response) => conflict::classify(&response),
            Err(e) => SubmissionOutcome::Failed(SubmissionFailure::Recoverable(e.to_string())),
        }
    }
}
