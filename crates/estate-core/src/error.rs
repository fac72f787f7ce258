//! # Error Types
//!
//! Domain-specific error types for estate-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  estate-core errors (this file)                                        │
//! │  ├── CoreError        - Lifecycle / business rule violations           │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  estate-client errors (separate crate)                                 │
//! │  ├── ClientError      - Transport and remote failures                  │
//! │  └── ActionError      - What the operator sees (code + message)        │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ActionError → Operator            │
//! │        ClientError ─────────────────┘                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::types::FlatStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Agreed sale price is zero or negative.
    ///
    /// ## When This Occurs
    /// - A booking record came back from the server with `totalPayment = 0`
    /// - The operator typed a zero rate when booking
    ///
    /// The sold threshold is undefined for a zero price, so resolution refuses
    /// to guess.
    #[error("Total payment must be greater than zero, got {total}")]
    InvalidTotalPayment { total: String },

    /// Cumulative paid amount is negative.
    #[error("Paid amount cannot be negative, got {paid}")]
    NegativePaid { paid: String },

    /// The flat is not in a state that allows the requested transition.
    ///
    /// ## When This Occurs
    /// - Booking a flat that is already booked or sold
    /// - Adding a payment to a free flat
    /// - Reverting or approving a loan on a sold flat
    #[error("Cannot {action} a flat that is {current}")]
    InvalidTransition {
        action: &'static str,
        current: FlatStatus,
    },

    /// Adding a payment would overflow the running total.
    #[error("Payment of {amount} on top of {paid} is out of range")]
    AmountOverflow { paid: String, amount: String },

    /// Customer has not passed KYC.
    #[error("Customer {customer_id} is not KYC approved")]
    CustomerNotApproved { customer_id: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when operator input doesn't meet requirements and are
/// raised before any network call is made.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., non-numeric amount, bad phone number).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Typed acknowledgment did not match the required literal.
    #[error("Type '{expected}' to confirm")]
    ConfirmationMismatch { expected: String },

    /// Destructive action requested without explicit acknowledgment.
    #[error("{action} requires explicit confirmation")]
    NotConfirmed { action: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
