//! Booking form state machine
//!
//! A reducer-style state container: field mutations are pure transitions
//! applied while `Editing`, validation runs on submit (not per keystroke),
//! and all I/O lives in the orchestrating caller
//! ([`super::booking::BookingService`]), which drives this machine with
//! classified submission outcomes.

use std::collections::BTreeMap;

use chrono::{NaiveTime, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    error::{AppError, AppResult},
    models::{
        AddOnLine, BookingDraft, BookingMode, CreateBookingRequest, ManualInterval, Pass,
        PaymentMethod, TimeSlot,
    },
};

use super::conflict::{SubmissionFailure, SubmissionOutcome};
use super::pricing::{PricingAggregator, Quote};

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"));

/// Lifecycle of one booking attempt
#[derive(Debug, Clone, PartialEq)]
pub enum FormState {
    Editing,
    Submitting,
    Succeeded { booking_id: i64 },
    /// Conflict failures park here until the operator re-fetches slots
    /// and acknowledges; recoverable failures return straight to `Editing`.
    Failed(SubmissionFailure),
}

/// Reducer actions. Each mutation clears its own field's validation error.
#[derive(Debug, Clone)]
pub enum FormAction {
    SetName(String),
    SetEmail(String),
    SetPhone(String),
    SetPaymentMethod(PaymentMethod),
    SelectSlot(TimeSlot),
    DeselectSlot(i64),
    ClearSlots,
    /// Switch between the regular slot flow and the private/manual flow
    ToggleBookingMode,
    SetManualInterval(ManualInterval),
    /// Re-selecting an item_id replaces its line
    SetAddOn(AddOnLine),
    RemoveAddOn(i64),
    SetManualWaiveOff(f64),
    SetExtraFee(f64),
    SetValidatedPass(Pass),
    ClearPass,
}

impl FormAction {
    /// Error-map key of the field this action touches
    fn field(&self) -> &'static str {
        match self {
            Self::SetName(_) => "name",
            Self::SetEmail(_) => "email",
            Self::SetPhone(_) => "phone",
            Self::SetPaymentMethod(_) => "payment",
            Self::SelectSlot(_)
            | Self::DeselectSlot(_)
            | Self::ClearSlots
            | Self::ToggleBookingMode
            | Self::SetManualInterval(_) => "slots",
            Self::SetAddOn(_) | Self::RemoveAddOn(_) => "addons",
            Self::SetManualWaiveOff(_) => "manual_waive_off",
            Self::SetExtraFee(_) => "extra_fee",
            Self::SetValidatedPass(_) | Self::ClearPass => "pass",
        }
    }
}

/// Immutable submission payload, built exactly once per attempt
#[derive(Debug, Clone)]
pub struct SubmissionPayload {
    pub request: CreateBookingRequest,
    pub payment_method: PaymentMethod,
    pub pass: Option<Pass>,
    pub hours_required: f64,
    /// Session window carried into the redemption audit notes
    pub session_start: String,
    pub session_end: String,
    pub quote: Quote,
}

#[derive(Debug, Default)]
pub struct BookingForm {
    state: FormState,
    draft: BookingDraft,
    errors: BTreeMap<&'static str, String>,
}

impl Default for FormState {
    fn default() -> Self {
        Self::Editing
    }
}

impl BookingForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn draft(&self) -> &BookingDraft {
        &self.draft
    }

    pub fn errors(&self) -> &BTreeMap<&'static str, String> {
        &self.errors
    }

    /// Apply one reducer action. Ignored outside `Editing` (the UI
    /// disables inputs while submitting, this is the backstop).
    pub fn apply(&mut self, action: FormAction) {
        if self.state != FormState::Editing {
            tracing::debug!(?action, "ignoring form action outside Editing");
            return;
        }
        self.errors.remove(action.field());
        // A slot/pass change invalidates a previously computed pass gate
        match &action {
            FormAction::SelectSlot(_)
            | FormAction::DeselectSlot(_)
            | FormAction::ClearSlots
            | FormAction::ToggleBookingMode
            | FormAction::SetManualInterval(_) => {
                self.errors.remove("pass");
            }
            _ => {}
        }

        match action {
            FormAction::SetName(name) => self.draft.customer_name = name,
            FormAction::SetEmail(email) => self.draft.customer_email = email,
            FormAction::SetPhone(phone) => self.draft.customer_phone = phone,
            FormAction::SetPaymentMethod(method) => {
                self.draft.payment_method = Some(method);
                if method != PaymentMethod::Pass {
                    self.draft.validated_pass = None;
                }
            }
            FormAction::SelectSlot(slot) => {
                if let Err(e) = self.draft.slots.select(slot) {
                    self.errors.insert("slots", e.to_string());
                }
            }
            FormAction::DeselectSlot(slot_id) => self.draft.slots.deselect(slot_id),
            FormAction::ClearSlots => self.draft.slots.clear(),
            FormAction::ToggleBookingMode => {
                self.draft.booking_mode = match self.draft.booking_mode {
                    BookingMode::Regular => BookingMode::Private,
                    BookingMode::Private => BookingMode::Regular,
                };
            }
            FormAction::SetManualInterval(interval) => {
                self.draft.manual_interval = Some(interval);
            }
            FormAction::SetAddOn(line) => {
                self.draft.addons.insert(line.item_id, line);
            }
            FormAction::RemoveAddOn(item_id) => {
                self.draft.addons.shift_remove(&item_id);
            }
            FormAction::SetManualWaiveOff(amount) => self.draft.manual_waive_off = amount,
            FormAction::SetExtraFee(fee) => self.draft.extra_fee = fee,
            FormAction::SetValidatedPass(pass) => self.draft.validated_pass = Some(pass),
            FormAction::ClearPass => self.draft.validated_pass = None,
        }
    }

    /// Pass hours the current selection requires
    pub fn hours_required(&self, pricing: &PricingAggregator) -> f64 {
        match self.draft.booking_mode {
            BookingMode::Regular => pricing.hours_required(self.draft.slots.len()),
            BookingMode::Private => {
                let minutes = self
                    .draft
                    .manual_interval
                    .as_ref()
                    .map(|i| i.duration_minutes)
                    .unwrap_or(0);
                pricing.hours_for_duration(minutes)
            }
        }
    }

    /// Validate the whole draft, filling the field error map.
    /// Returns true when submission may proceed.
    pub fn validate(&mut self, pricing: &PricingAggregator) -> bool {
        self.errors.clear();

        if self.draft.customer_name.trim().is_empty() {
            self.errors.insert("name", "Name is required".to_string());
        }
        if !EMAIL_PATTERN.is_match(self.draft.customer_email.trim()) {
            self.errors
                .insert("email", "Enter a valid email address".to_string());
        }
        let phone = self.draft.customer_phone.trim();
        if phone.is_empty() || !phone.chars().all(|c| c.is_ascii_digit()) {
            self.errors
                .insert("phone", "Enter a valid phone number".to_string());
        }

        match self.draft.booking_mode {
            BookingMode::Regular => {
                if self.draft.slots.is_empty() {
                    self.errors
                        .insert("slots", "Select at least one slot".to_string());
                }
            }
            BookingMode::Private => match &self.draft.manual_interval {
                Some(interval) if interval.duration_minutes > 0 => {
                    match NaiveTime::parse_from_str(&interval.start_time, "%H:%M") {
                        Err(_) => {
                            self.errors
                                .insert("slots", "Enter a valid start time".to_string());
                        }
                        Ok(start) => {
                            // NaiveTime arithmetic wraps past midnight; the
                            // session window is same-day only
                            let start_minutes = i64::from(start.num_seconds_from_midnight()) / 60;
                            if start_minutes + interval.duration_minutes >= 24 * 60 {
                                self.errors.insert(
                                    "slots",
                                    "Session must end before midnight".to_string(),
                                );
                            }
                        }
                    }
                }
                _ => {
                    self.errors
                        .insert("slots", "Enter a session duration".to_string());
                }
            },
        }

        match self.draft.payment_method {
            None => {
                self.errors
                    .insert("payment", "Choose a payment method".to_string());
            }
            Some(PaymentMethod::Pass) => {
                let need = self.hours_required(pricing);
                match &self.draft.validated_pass {
                    None => {
                        self.errors.insert(
                            "pass",
                            "Validate a pass before submitting".to_string(),
                        );
                    }
                    Some(pass) if pass.remaining_hours < need => {
                        self.errors.insert(
                            "pass",
                            format!(
                                "Insufficient hours. Need {:.1} hrs, available {:.1} hrs",
                                need, pass.remaining_hours
                            ),
                        );
                    }
                    Some(_) => {}
                }
            }
            Some(_) => {}
        }

        self.errors.is_empty()
    }

    /// Validate, price and freeze the draft into one immutable payload,
    /// transitioning `Editing -> Submitting`. Repeat submission while
    /// `Submitting` is rejected.
    pub fn begin_submit(
        &mut self,
        pricing: &PricingAggregator,
        auto_waive_off: f64,
        vendor: &str,
    ) -> AppResult<SubmissionPayload> {
        match self.state {
            FormState::Editing => {}
            FormState::Submitting => {
                return Err(AppError::Validation(
                    "A submission is already in progress".to_string(),
                ))
            }
            _ => {
                return Err(AppError::Validation(
                    "The form is not editable".to_string(),
                ))
            }
        }
        if !self.validate(pricing) {
            return Err(AppError::Validation(
                "Fix the highlighted fields before submitting".to_string(),
            ));
        }

        let draft = &self.draft;
        let quote = pricing.quote(
            draft.console_total(),
            draft.addons_total(),
            draft.manual_waive_off,
            auto_waive_off,
            draft.extra_fee,
        );

        let (date, console_type, slot_ids, duration_minutes, session_start, session_end) =
            match draft.booking_mode {
                BookingMode::Regular => {
                    // validate() guarantees a non-empty selection
                    let first = draft.slots.first().ok_or_else(|| {
                        AppError::Internal("validated draft has no slots".to_string())
                    })?;
                    let (start, end) = draft.slots.window().ok_or_else(|| {
                        AppError::Internal("validated draft has no slot window".to_string())
                    })?;
                    (
                        first.date.clone(),
                        first.console_name.clone(),
                        draft.slots.slot_ids(),
                        None,
                        start,
                        end,
                    )
                }
                BookingMode::Private => {
                    let interval = draft.manual_interval.as_ref().ok_or_else(|| {
                        AppError::Internal("validated draft has no interval".to_string())
                    })?;
                    let start = NaiveTime::parse_from_str(&interval.start_time, "%H:%M")
                        .map_err(|e| {
                            AppError::InvalidTimeInput(format!(
                                "bad interval start {:?}: {}",
                                interval.start_time, e
                            ))
                        })?;
                    let end = start + chrono::Duration::minutes(interval.duration_minutes);
                    (
                        interval.date.clone(),
                        interval.console_name.clone(),
                        Vec::new(),
                        Some(interval.duration_minutes),
                        start.format("%H:%M").to_string(),
                        end.format("%H:%M").to_string(),
                    )
                }
            };

        let payment_method = draft
            .payment_method
            .ok_or_else(|| AppError::Internal("validated draft has no payment".to_string()))?;

        let payload = SubmissionPayload {
            request: CreateBookingRequest {
                vendor: vendor.to_string(),
                console_type,
                customer_name: draft.customer_name.trim().to_string(),
                customer_email: draft.customer_email.trim().to_string(),
                customer_phone: draft.customer_phone.trim().to_string(),
                date,
                slot_ids,
                payment_type: payment_method,
                waive_off_total: quote.manual_waive_off + quote.auto_waive_off,
                extra_fee: quote.extra_fee,
                addons: draft.addons.values().cloned().collect(),
                booking_mode: draft.booking_mode,
                duration_minutes,
            },
            payment_method,
            pass: draft.validated_pass.clone(),
            hours_required: self.hours_required(pricing),
            session_start,
            session_end,
            quote,
        };

        self.state = FormState::Submitting;
        Ok(payload)
    }

    /// Apply the classified submission result.
    ///
    /// Recoverable failures return to `Editing` with all entered data
    /// intact and the message surfaced under the `submit` key. Conflicts
    /// invalidate the slot selection; the caller must re-fetch slot
    /// availability and then [`Self::acknowledge_conflict`].
    pub fn complete(&mut self, outcome: SubmissionOutcome) {
        if self.state != FormState::Submitting {
            tracing::warn!("completing a form that is not submitting");
            return;
        }
        match outcome {
            SubmissionOutcome::Accepted { booking_id } => {
                self.state = FormState::Succeeded { booking_id };
            }
            SubmissionOutcome::Failed(SubmissionFailure::Recoverable(message)) => {
                self.errors.insert("submit", message);
                self.state = FormState::Editing;
            }
            SubmissionOutcome::Failed(failure @ SubmissionFailure::Conflict { .. }) => {
                self.draft.slots.clear();
                self.state = FormState::Failed(failure);
            }
        }
    }

    /// Return to editing after a conflict, once slot data has been
    /// re-fetched. The cleared selection stays cleared: the operator
    /// re-picks from fresh availability.
    pub fn acknowledge_conflict(&mut self) {
        if matches!(self.state, FormState::Failed(SubmissionFailure::Conflict { .. })) {
            self.state = FormState::Editing;
        }
    }
}
