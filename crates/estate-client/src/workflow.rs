//! # Booking Workflow
//!
//! Drives one flat through `free → booked → sold`. The controller keeps a
//! local view of the flat, applies each action optimistically, then re-fetches
//! from the backend to converge on server truth.
//!
//! ## Action Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      BookingController Action                           │
//! │                                                                         │
//! │  1. Role::can(capability)?         no  → FORBIDDEN                      │
//! │  2. in-flight flag free?           no  → BUSY (nothing sent)            │
//! │  3. validate input                 bad → VALIDATION_ERROR (nothing sent)│
//! │  4. Transition::apply(status)      bad → INVALID_STATE (nothing sent)   │
//! │  5. remote write ──────────────────┐                                    │
//! │       │ ok                         │ err                                │
//! │       ▼                            ▼                                    │
//! │  6. view ← resolver (Tentative)    book: view untouched                 │
//! │       │                            pay:  view ← snapshot, re-fetch      │
//! │       ▼                                                                 │
//! │  7. re-fetch booking + history → view (Confirmed)                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Thread Safety
//! The view sits behind a `std::sync::Mutex` that is only ever locked inside
//! [`BookingController::with_view`], so no guard lives across an `.await`.
//! One mutation at a time is enforced by an `AtomicBool` held through an RAII
//! guard for the whole action.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use estate_core::validation::{
    parse_payment_amount, validate_booking_customer, validate_confirmed,
    validate_payment_amount, validate_revert_confirmation, validate_total_payment,
};
use estate_core::{
    paid_after, resolve_booking, resolve_status, BookedFlat, Capability, CoreError, Customer,
    Flat, FlatKey, FlatPayment, FlatStatus, Money, PaymentSummary, Transition, ValidationError,
};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::api::LedgerApi;
use crate::directory::DUPLICATE_KYC_MESSAGE;
use crate::error::ClientError;
use crate::ledger::PaymentLedger;
use crate::session::Session;

// =============================================================================
// Action Errors
// =============================================================================

/// Error returned to the operator when an action fails.
///
/// ```json
/// { "code": "VALIDATION_ERROR", "message": "amount must be positive" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionError {
    pub code: ActionCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionCode {
    /// Input rejected before anything was sent.
    ValidationError,

    /// The role lacks the capability, or nobody is signed in.
    Forbidden,

    /// Another action on this flat is still running.
    Busy,

    /// The action is not legal from the flat's current status.
    InvalidState,

    /// The backend already holds a conflicting record (409).
    Conflict,

    NotFound,

    /// The backend failed or could not be reached.
    RemoteError,

    Internal,
}

impl ActionCode {
    /// Wire name, as serialized.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionCode::ValidationError => "VALIDATION_ERROR",
            ActionCode::Forbidden => "FORBIDDEN",
            ActionCode::Busy => "BUSY",
            ActionCode::InvalidState => "INVALID_STATE",
            ActionCode::Conflict => "CONFLICT",
            ActionCode::NotFound => "NOT_FOUND",
            ActionCode::RemoteError => "REMOTE_ERROR",
            ActionCode::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for ActionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ActionError {
    pub fn new(code: ActionCode, message: impl Into<String>) -> Self {
        ActionError {
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ActionError::new(ActionCode::ValidationError, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ActionError::new(ActionCode::Forbidden, message)
    }

    pub fn busy() -> Self {
        ActionError::new(
            ActionCode::Busy,
            "Another action on this flat is still in progress",
        )
    }
}

/// Checks that the session may perform an action.
pub fn require(session: &Session, capability: Capability) -> Result<(), ActionError> {
    if !session.is_active() {
        return Err(ActionError::forbidden("Not signed in"));
    }
    if !session.can(capability) {
        return Err(ActionError::forbidden(format!(
            "Role '{}' is not allowed to {:?}",
            session.role, capability
        )));
    }
    Ok(())
}

impl From<ClientError> for ActionError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Validation(e) => ActionError::validation(e.to_string()),
            ClientError::Conflict(detail) => {
                debug!(detail = %detail, "Backend reported a conflict");
                ActionError::new(ActionCode::Conflict, DUPLICATE_KYC_MESSAGE)
            }
            ClientError::NotFound(what) => {
                ActionError::new(ActionCode::NotFound, format!("Not found: {}", what))
            }
            ClientError::MissingSession => ActionError::forbidden("Not signed in"),
            ClientError::Unauthorized(message) => {
                warn!(message = %message, "Backend refused the session");
                ActionError::forbidden("Session expired or not permitted")
            }
            err @ (ClientError::Timeout(_)
            | ClientError::Rejected(_)
            | ClientError::Status { .. }) => {
                error!(error = %err, "Backend request failed");
                ActionError::new(ActionCode::RemoteError, err.to_string())
            }
            ClientError::Http(e) => {
                error!(error = %e, "Backend unreachable");
                ActionError::new(ActionCode::RemoteError, "Could not reach the server")
            }
            ClientError::Decode(e) => {
                error!(error = %e, "Unexpected backend response");
                ActionError::new(ActionCode::RemoteError, "Unexpected response from the server")
            }
            err @ (ClientError::InvalidConfig(_)
            | ClientError::InvalidUrl(_)
            | ClientError::ConfigLoadFailed(_)
            | ClientError::ConfigSaveFailed(_)) => {
                error!(error = %err, "Client misconfigured");
                ActionError::new(ActionCode::Internal, err.to_string())
            }
        }
    }
}

impl From<CoreError> for ActionError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidTransition { .. } => {
                ActionError::new(ActionCode::InvalidState, err.to_string())
            }
            CoreError::Validation(e) => ActionError::validation(e.to_string()),
            CoreError::CustomerNotApproved { .. }
            | CoreError::InvalidTotalPayment { .. }
            | CoreError::NegativePaid { .. }
            | CoreError::AmountOverflow { .. } => ActionError::validation(err.to_string()),
        }
    }
}

impl From<ValidationError> for ActionError {
    fn from(err: ValidationError) -> Self {
        ActionError::validation(err.to_string())
    }
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ActionError {}

pub type ActionResult<T> = Result<T, ActionError>;

// =============================================================================
// Flat View
// =============================================================================

/// Whether a displayed status was computed locally or read back from the
/// backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Tentative,
    Confirmed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DisplayStatus {
    pub status: FlatStatus,
    pub phase: Phase,
}

/// Everything the operator sees about one flat.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatView {
    pub flat: Flat,
    pub booking: Option<BookedFlat>,

    /// Oldest first.
    pub history: Vec<FlatPayment>,

    pub display: DisplayStatus,

    /// The flat is held sold, either because the backend listed it sold or
    /// because a loan was approved here. Later reads never demote it.
    pub held_sold: bool,
}

impl FlatView {
    /// A view of a flat as listed by the inventory.
    ///
    /// Booking records carry no loan flag, so a flat the backend lists as
    /// sold stays sold even when its payments are under the threshold.
    pub fn new(flat: Flat) -> Self {
        let held_sold = flat.status == FlatStatus::Sold;
        let display = DisplayStatus {
            status: flat.status,
            phase: Phase::Confirmed,
        };
        FlatView {
            flat,
            booking: None,
            history: Vec::new(),
            display,
            held_sold,
        }
    }

    pub fn key(&self) -> FlatKey {
        self.flat.key()
    }

    /// Sold by loan approval rather than by payments.
    pub fn loan_approved(&self) -> bool {
        match &self.booking {
            Some(b) => {
                b.loan_approved
                    || (self.display.status == FlatStatus::Sold
                        && matches!(
                            resolve_status(b.paid, b.total_payment),
                            Ok(FlatStatus::Booked)
                        ))
            }
            None => false,
        }
    }

    /// Amount still owed, if the flat is booked.
    pub fn remaining(&self) -> Option<Money> {
        self.booking.as_ref().map(BookedFlat::remaining)
    }

    fn set_status(&mut self, status: FlatStatus, phase: Phase) {
        self.flat.status = status;
        self.display = DisplayStatus { status, phase };
    }
}

// =============================================================================
// In-flight Guard
// =============================================================================

struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> ActionResult<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| InFlight(flag))
            .map_err(|_| ActionError::busy())
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

// =============================================================================
// Controller
// =============================================================================

pub struct BookingController<B> {
    ledger: PaymentLedger<B>,
    session: Session,
    view: Mutex<FlatView>,
    in_flight: AtomicBool,
}

impl<B: LedgerApi> BookingController<B> {
    pub fn new(backend: Arc<B>, session: Session, flat: Flat) -> Self {
        BookingController {
            ledger: PaymentLedger::new(backend),
            session,
            view: Mutex::new(FlatView::new(flat)),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Snapshot of the current view.
    pub fn view(&self) -> FlatView {
        self.with_view(|v| v.clone())
    }

    /// True while an action is running; the shell disables submit meanwhile.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn with_view<R>(&self, f: impl FnOnce(&mut FlatView) -> R) -> R {
        let mut view = self.view.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut view)
    }

    /// Books the free flat for an approved customer with a first payment.
    pub async fn book(
        &self,
        customer: Option<&Customer>,
        total_payment: Money,
        amount: Money,
        summary: PaymentSummary,
    ) -> ActionResult<FlatView> {
        require(&self.session, Capability::BookFlat)?;
        let _in_flight = InFlight::acquire(&self.in_flight)?;

        let customer = validate_booking_customer(customer)?;
        validate_total_payment(total_payment)?;
        validate_payment_amount(amount)?;

        let (key, current) = self.with_view(|v| (v.key(), v.flat.status));
        let tentative = Transition::Book {
            amount,
            total: total_payment,
        }
        .apply(current)?;

        self.ledger
            .book(&key, customer.to_ref(), total_payment, amount, summary)
            .await?;

        self.with_view(|v| {
            v.booking = Some(BookedFlat {
                project_id: key.project_id.clone(),
                flat_id: key.flat_id.clone(),
                customer_id: customer.id.clone(),
                customer_name: customer.name.clone(),
                total_payment,
                paid: amount,
                loan_approved: false,
            });
            v.held_sold = false;
            v.set_status(tentative, Phase::Tentative);
        });
        info!(flat = %key, status = %tentative, "Booking applied");

        self.converge(&key).await;
        Ok(self.view())
    }

    /// Records a further payment typed by the operator.
    pub async fn add_payment(
        &self,
        amount_text: &str,
        summary: PaymentSummary,
    ) -> ActionResult<FlatView> {
        require(&self.session, Capability::AddPayment)?;
        let _in_flight = InFlight::acquire(&self.in_flight)?;

        let amount = parse_payment_amount(amount_text)?;

        let snapshot = self.view();
        let key = snapshot.key();
        let booking = snapshot.booking.as_ref().ok_or_else(|| {
            ActionError::new(
                ActionCode::InvalidState,
                format!("No booking loaded for flat {}", key),
            )
        })?;
        let paid = paid_after(booking.paid, amount)?;
        let tentative = Transition::AddPayment {
            paid: booking.paid,
            amount,
            total: booking.total_payment,
        }
        .apply(snapshot.flat.status)?;

        self.with_view(|v| {
            if let Some(b) = v.booking.as_mut() {
                b.paid = paid;
            }
            v.set_status(tentative, Phase::Tentative);
        });

        match self.ledger.pay(&key, amount, summary).await {
            Ok(paid) => {
                self.with_view(|v| {
                    if let Some(b) = v.booking.as_mut() {
                        b.paid = paid;
                    }
                });
                self.converge(&key).await;
                Ok(self.view())
            }
            Err(e) => {
                warn!(flat = %key, amount = %amount, error = %e, "Payment failed, restoring view");
                self.with_view(|v| *v = snapshot);
                self.converge(&key).await;
                Err(e.into())
            }
        }
    }

    /// Returns a booked flat to free. Local only; the backend keeps its
    /// booking record until it is cleared there.
    pub async fn revert(&self, confirmation: &str) -> ActionResult<FlatView> {
        require(&self.session, Capability::RevertBooking)?;
        let _in_flight = InFlight::acquire(&self.in_flight)?;

        validate_revert_confirmation(confirmation)?;

        self.with_view(|v| -> ActionResult<()> {
            let status = Transition::Revert.apply(v.flat.status)?;
            v.booking = None;
            v.set_status(status, Phase::Tentative);
            warn!(flat = %v.key(), "Booking reverted locally; backend record unchanged");
            Ok(())
        })?;

        Ok(self.view())
    }

    /// Forces a booked flat to sold regardless of how much has been paid.
    pub async fn approve_loan(&self, confirmed: bool) -> ActionResult<FlatView> {
        require(&self.session, Capability::ApproveLoan)?;
        let _in_flight = InFlight::acquire(&self.in_flight)?;

        validate_confirmed("approve loan", confirmed)?;

        let (key, current) = self.with_view(|v| (v.key(), v.flat.status));
        let status = Transition::ApproveLoan.apply(current)?;

        self.ledger.approve_loan(&key).await?;

        self.with_view(|v| {
            v.held_sold = true;
            if let Some(b) = v.booking.as_mut() {
                b.loan_approved = true;
            }
            v.set_status(status, Phase::Tentative);
        });

        self.converge(&key).await;
        Ok(self.view())
    }

    /// Re-reads the booking and payment history and confirms the status.
    pub async fn refresh(&self) -> ActionResult<FlatView> {
        require(&self.session, Capability::ViewApartments)?;
        let _in_flight = InFlight::acquire(&self.in_flight)?;

        let key = self.with_view(|v| v.key());
        self.reconcile(&key).await?;
        Ok(self.view())
    }

    /// Reconciles after a write. The write already happened, so a failed
    /// read only leaves the view tentative.
    async fn converge(&self, key: &FlatKey) {
        if let Err(e) = self.reconcile(key).await {
            warn!(flat = %key, error = %e, "Re-fetch failed; status stays tentative");
        }
    }

    async fn reconcile(&self, key: &FlatKey) -> ActionResult<()> {
        // A locally reverted flat is free but tentative: ask the backend
        // whether the booking still exists.
        let (booked, tentative) = self.with_view(|v| {
            (
                v.flat.status.has_booking(),
                v.display.phase == Phase::Tentative,
            )
        });

        let booking = if booked || tentative {
            match self.ledger.booking(key).await {
                Ok(b) => Some(b),
                Err(ClientError::NotFound(_)) if !booked => None,
                Err(e) => return Err(e.into()),
            }
        } else {
            None
        };
        let history = self.ledger.history(key).await?;

        self.with_view(|v| -> ActionResult<()> {
            let status = match booking {
                Some(b) => {
                    let resolved = resolve_booking(&b)?;
                    v.booking = Some(b);
                    if v.held_sold {
                        FlatStatus::Sold
                    } else {
                        resolved
                    }
                }
                None => {
                    v.booking = None;
                    FlatStatus::Free
                }
            };
            v.history = history;
            v.set_status(status, Phase::Confirmed);
            debug!(flat = %key, status = %status, payments = v.history.len(), "View confirmed");
            Ok(())
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
