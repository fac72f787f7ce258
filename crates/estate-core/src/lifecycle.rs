//! # Flat Lifecycle
//!
//! The booking state resolver and the flat state machine.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │            book(amount, total)                                          │
//! │   ┌──────┐  amount < 50%   ┌────────┐  pay: paid+amount ≥ 50%  ┌──────┐ │
//! │   │ free │ ──────────────► │ booked │ ───────────────────────► │ sold │ │
//! │   └──────┘                 └────────┘        approve loan      └──────┘ │
//! │     ▲  │                     │    ▲                              │  ▲   │
//! │     │  │   amount ≥ 50%      │    │ pay: paid+amount < 50%       │  │   │
//! │     │  └─────────────────────┼────┼──────────────────────────────┘  │   │
//! │     │                        │    └────┘                   pay ─────┘   │
//! │     └──── revert (typed) ────┘                                          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Sold Threshold
//! A booking is `sold` once `paid ≥ 50% × totalPayment`. The comparison runs
//! in basis points on widened integers, so no rounding ever decides it:
//!
//! ```text
//!   paid × 10_000  ≥  totalPayment × SOLD_THRESHOLD_BPS
//! ```

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{BookedFlat, FlatStatus};
use crate::SOLD_THRESHOLD_BPS;

const BPS_SCALE: i128 = 10_000;

// =============================================================================
// Resolver
// =============================================================================

/// Resolves a booking's status from the amount collected and the agreed price.
///
/// ## Rules
/// - `total` must be positive, `paid` must not be negative
/// - `paid ≥ total / 2` → [`FlatStatus::Sold`] (inclusive)
/// - otherwise → [`FlatStatus::Booked`]
/// - overpayment is allowed and resolves to `Sold`
///
/// ## Example
/// ```rust
/// use estate_core::{resolve_status, FlatStatus, Money};
///
/// let total = Money::from_rupees(200_000);
/// assert_eq!(resolve_status(Money::from_rupees(50_000), total).unwrap(), FlatStatus::Booked);
/// assert_eq!(resolve_status(Money::from_rupees(100_000), total).unwrap(), FlatStatus::Sold);
/// assert!(resolve_status(Money::from_rupees(1), Money::zero()).is_err());
/// ```
pub fn resolve_status(paid: Money, total: Money) -> CoreResult<FlatStatus> {
    if !total.is_positive() {
        return Err(CoreError::InvalidTotalPayment {
            total: total.to_string(),
        });
    }
    if paid.is_negative() {
        return Err(CoreError::NegativePaid {
            paid: paid.to_string(),
        });
    }

    let lhs = i128::from(paid.paise()) * BPS_SCALE;
    let rhs = i128::from(total.paise()) * i128::from(SOLD_THRESHOLD_BPS);

    if lhs >= rhs {
        Ok(FlatStatus::Sold)
    } else {
        Ok(FlatStatus::Booked)
    }
}

/// Resolves a booking record, honouring the loan override before the threshold.
pub fn resolve_booking(booked: &BookedFlat) -> CoreResult<FlatStatus> {
    if booked.loan_approved {
        return Ok(FlatStatus::Sold);
    }
    resolve_status(booked.paid, booked.total_payment)
}

// =============================================================================
// Transitions
// =============================================================================

/// A requested change to a flat's lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// First booking with an initial payment.
    Book { amount: Money, total: Money },

    /// Another payment against an existing booking.
    AddPayment {
        paid: Money,
        amount: Money,
        total: Money,
    },

    /// Manual sale override after a home loan is sanctioned.
    ApproveLoan,

    /// Cancel the booking and free the flat.
    Revert,
}

impl Transition {
    /// Verb used in error messages.
    pub fn action(&self) -> &'static str {
        match self {
            Transition::Book { .. } => "book",
            Transition::AddPayment { .. } => "add a payment to",
            Transition::ApproveLoan => "approve a loan for",
            Transition::Revert => "revert",
        }
    }

    /// Returns the status the flat lands in, or why the move is illegal.
    ///
    /// ```rust
    /// use estate_core::{FlatStatus, Money, Transition};
    ///
    /// let pay = Transition::AddPayment {
    ///     paid: Money::from_rupees(50_000),
    ///     amount: Money::from_rupees(50_000),
    ///     total: Money::from_rupees(200_000),
    /// };
    /// assert_eq!(pay.apply(FlatStatus::Booked).unwrap(), FlatStatus::Sold);
    /// assert!(Transition::Revert.apply(FlatStatus::Sold).is_err());
    /// ```
    pub fn apply(&self, current: FlatStatus) -> CoreResult<FlatStatus> {
        match (self, current) {
            (Transition::Book { amount, total }, FlatStatus::Free) => {
                resolve_status(*amount, *total)
            }
            (
                Transition::AddPayment {
                    paid,
                    amount,
                    total,
                },
                FlatStatus::Booked,
            ) => resolve_status(paid_after(*paid, *amount)?, *total),
            // A sold flat keeps collecting instalments without changing state.
            (Transition::AddPayment { paid, amount, .. }, FlatStatus::Sold) => {
                paid_after(*paid, *amount).map(|_| FlatStatus::Sold)
            }
            (Transition::ApproveLoan, FlatStatus::Booked) => Ok(FlatStatus::Sold),
            (Transition::Revert, FlatStatus::Booked) => Ok(FlatStatus::Free),
            (transition, current) => Err(CoreError::InvalidTransition {
                action: transition.action(),
                current,
            }),
        }
    }
}

/// Running total after one more payment.
pub fn paid_after(paid: Money, amount: Money) -> CoreResult<Money> {
    paid.checked_add(amount).ok_or_else(|| CoreError::AmountOverflow {
        paid: paid.to_string(),
        amount: amount.to_string(),
    })
}

/// Free-function form of [`Transition::apply`].
pub fn apply(current: FlatStatus, transition: &Transition) -> CoreResult<FlatStatus> {
    transition.apply(current)
}

// =============================================================================
// Unit Tests
// =============================================================================
