//! # estate-core: Pure Business Logic for Estate ERP
//!
//! This crate is the **heart** of the sales administration client. It holds
//! the flat lifecycle rules, money handling and input validation as pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Estate ERP Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    apps/cli (operator shell)                    │   │
//! │  │     projects ──► flat ──► book / pay / approve-loan / revert    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          estate-client (REST client + booking workflow)         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ estate-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │ lifecycle │  │ validation│  │   │
//! │  │   │   Flat    │  │   Money   │  │ resolver  │  │   rules   │  │   │
//! │  │   │  Booking  │  │  (paise)  │  │ Transition│  │  amounts  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • PURE FUNCTIONS                          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Flat, BookedFlat, FlatPayment, Customer, etc.)
//! - [`money`] - Money type with integer paise (no floating point math!)
//! - [`lifecycle`] - Booking state resolver and flat state machine
//! - [`access`] - Roles and the capabilities they grant
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use estate_core::lifecycle::resolve_status;
//! use estate_core::money::Money;
//! use estate_core::FlatStatus;
//!
//! let total = Money::from_rupees(100_000);
//!
//! // Half the agreed price is the sold threshold (inclusive)
//! assert_eq!(resolve_status(Money::from_rupees(50_000), total).unwrap(), FlatStatus::Sold);
//! assert_eq!(resolve_status(Money::from_rupees(49_999), total).unwrap(), FlatStatus::Booked);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod access;
pub mod error;
pub mod lifecycle;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use access::{Capability, Role};
pub use error::{CoreError, CoreResult, ValidationError};
pub use lifecycle::{Transition, paid_after, resolve_booking, resolve_status};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Share of the agreed price, in basis points, at which a booking counts as sold.
///
/// 5000 bps = 50%. The comparison is inclusive: paying exactly half sells the flat.
pub const SOLD_THRESHOLD_BPS: i64 = 5_000;

/// Literal the operator must type before a booked flat can be reverted to free.
pub const REVERT_CONFIRMATION_PHRASE: &str = "confirm";

/// Maximum length of a free-text search query.
pub const MAX_SEARCH_QUERY_LEN: usize = 100;
