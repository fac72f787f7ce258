//! # Validation Module
//!
//! Operator input validation. Everything here runs before a request leaves
//! the machine, so a rejected input never reaches the backend.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Shell (CLI / web form)                                       │
//! │  ├── Raw text capture                                                  │
//! │  └── Immediate feedback                                                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Workflow controller                                          │
//! │  ├── Capability check (role)                                           │
//! │  └── THIS MODULE: amounts, customer, confirmations                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Backend                                                      │
//! │  ├── Duplicate KYC (409)                                               │
//! │  └── Canonical flat/booking state                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use estate_core::validation::{parse_payment_amount, validate_revert_confirmation};
//! use estate_core::Money;
//!
//! assert_eq!(parse_payment_amount("1,500.50").unwrap(), Money::from_paise(150_050));
//! assert!(parse_payment_amount("-10").is_err());
//! assert!(validate_revert_confirmation("Confirm").is_err());
//! ```

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::{Money, ParseMoneyError};
use crate::types::{Customer, KycSubmission};
use crate::{MAX_SEARCH_QUERY_LEN, REVERT_CONFIRMATION_PHRASE};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Trims a required text field and rejects it when blank.
pub fn validate_required(field: &str, value: &str) -> ValidationResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(value.to_string())
}

/// Validates a search query.
///
/// ## Rules
/// - Can be empty (callers treat that as "no search")
/// - Maximum [`MAX_SEARCH_QUERY_LEN`] characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > MAX_SEARCH_QUERY_LEN {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: MAX_SEARCH_QUERY_LEN,
        });
    }

    Ok(query.to_string())
}

/// Lowercases a customer name and strips all whitespace.
///
/// The backend deduplicates KYC records on this value.
///
/// ```rust
/// use estate_core::validation::normalize_name;
///
/// assert_eq!(normalize_name("  Asha  K Rao "), "ashakrao");
/// ```
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Validates a phone number: 10 to 15 digits, an optional leading `+`.
pub fn validate_phone(phone: &str) -> ValidationResult<String> {
    let phone = validate_required("phone", phone)?;
    let digits = phone.strip_prefix('+').unwrap_or(&phone);

    if !digits.chars().all(|c| c.is_ascii_digit()) || !(10..=15).contains(&digits.len()) {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "expected 10 to 15 digits".to_string(),
        });
    }

    Ok(phone)
}

// =============================================================================
// Amount Validators
// =============================================================================

/// Parses an amount typed by the operator.
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Flat: Add Payment                                                      │
/// │                                                                         │
/// │  Operator types: "25,000"                                              │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  parse_payment_amount("25,000") ← THIS FUNCTION                        │
/// │       │                                                                 │
/// │       ├── blank?          → Error: "payment amount is required"        │
/// │       ├── not a number?   → Error: "payment amount has invalid format" │
/// │       ├── zero/negative?  → Error: "payment amount must be positive"   │
/// │       │                                                                 │
/// │       └── OK → ₹25,000.00 (paise, exact)                               │
/// │                                                                         │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn parse_payment_amount(text: &str) -> ValidationResult<Money> {
    let amount = parse_amount("payment amount", text)?;
    validate_payment_amount(amount)?;
    Ok(amount)
}

/// Parses the agreed sale price typed by the operator.
pub fn parse_total_payment(text: &str) -> ValidationResult<Money> {
    let total = parse_amount("total payment", text)?;
    validate_total_payment(total)?;
    Ok(total)
}

fn parse_amount(field: &str, text: &str) -> ValidationResult<Money> {
    text.parse::<Money>().map_err(|err| match err {
        ParseMoneyError::Empty => ValidationError::Required {
            field: field.to_string(),
        },
        other => ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: other.to_string(),
        },
    })
}

/// Validates a payment amount.
///
/// ## Rules
/// - Must be positive (> 0)
pub fn validate_payment_amount(amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "payment amount".to_string(),
        });
    }
    Ok(())
}

/// Validates an agreed sale price.
pub fn validate_total_payment(total: Money) -> ValidationResult<()> {
    if !total.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "total payment".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Booking Validators
// =============================================================================

/// Checks that a customer was picked and has passed KYC.
pub fn validate_booking_customer(customer: Option<&Customer>) -> CoreResult<&Customer> {
    let customer = customer.ok_or_else(|| ValidationError::Required {
        field: "customer".to_string(),
    })?;

    if !customer.is_approved() {
        return Err(CoreError::CustomerNotApproved {
            customer_id: customer.id.clone(),
        });
    }

    Ok(customer)
}

/// Validates the typed acknowledgment for reverting a booking.
///
/// The text must equal [`REVERT_CONFIRMATION_PHRASE`] exactly: no trimming,
/// no case folding.
pub fn validate_revert_confirmation(text: &str) -> ValidationResult<()> {
    if text != REVERT_CONFIRMATION_PHRASE {
        return Err(ValidationError::ConfirmationMismatch {
            expected: REVERT_CONFIRMATION_PHRASE.to_string(),
        });
    }
    Ok(())
}

/// Rejects an action the operator has not explicitly acknowledged.
pub fn validate_confirmed(action: &str, confirmed: bool) -> ValidationResult<()> {
    if !confirmed {
        return Err(ValidationError::NotConfirmed {
            action: action.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// KYC Validators
// =============================================================================

/// Validates a KYC submission and fills in its normalised name.
///
/// Aadhaar and PAN (numbers and uploaded document keys) are mandatory. Voter
/// and other ids are optional; blank ones are dropped.
pub fn validate_kyc_submission(mut submission: KycSubmission) -> ValidationResult<KycSubmission> {
    submission.customer_id = validate_required("customer id", &submission.customer_id)?;
    submission.name = validate_required("name", &submission.name)?;
    submission.phone = validate_phone(&submission.phone)?;
    submission.address = validate_required("address", &submission.address)?;
    submission.aadhaar = validate_required("aadhaar", &submission.aadhaar)?;
    submission.pan = validate_required("pan", &submission.pan)?;
    submission.aadhaar_key = validate_required("aadhaar document", &submission.aadhaar_key)?;
    submission.pan_key = validate_required("pan document", &submission.pan_key)?;

    submission.voter = submission.voter.filter(|v| !v.trim().is_empty());
    submission.other = submission.other.filter(|v| !v.trim().is_empty());
    submission.normalized_name = normalize_name(&submission.name);

    Ok(submission)
}

// =============================================================================
// Unit Tests
// =============================================================================
