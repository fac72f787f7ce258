//! # estate-client: Backend Client and Booking Workflow for Estate ERP
//!
//! This crate connects the operator shell to the Estate ERP REST backend and
//! drives the flat booking workflow on top of it.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Estate ERP Client Layer                          │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │              BookingController (one flat's view)                 │  │
//! │  │                                                                  │  │
//! │  │  role check → busy guard → validate → write → resolve → re-fetch │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │         ┌─────────────────────┼─────────────────────┐                  │
//! │         ▼                     ▼                     ▼                   │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────┐    │
//! │  │ PaymentLedger  │  │ CustomerDir.   │  │  Inventory             │    │
//! │  │                │  │                │  │                        │    │
//! │  │ book / pay     │  │ approved search│  │ projects, flats        │    │
//! │  │ history, search│  │ KYC submit     │  │ block/floor grouping   │    │
//! │  │ never retried  │  │ 409 → Conflict │  │ status tally           │    │
//! │  └───────┬────────┘  └───────┬────────┘  └───────────┬────────────┘    │
//! │          │  LedgerApi        │  DirectoryApi         │  InventoryApi   │
//! │          └───────────────────┼───────────────────────┘                 │
//! │                              ▼                                          │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  RestClient (reqwest): bearer auth, timeout, envelope decoding  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! ### Plumbing
//! - [`config`] - Client configuration (base URL, timeout, user agent)
//! - [`error`] - Client error types
//! - [`session`] - Signed-in operator and bearer token
//! - [`wire`] - Backend request and response envelopes
//! - [`api`] - Backend traits, one per area
//! - [`rest`] - HTTP implementation of the backend traits
//!
//! ### Domain Clients
//! - [`ledger`] - Bookings, payments and payment search
//! - [`directory`] - Customer search and KYC records
//! - [`inventory`] - Projects and flats
//! - [`workflow`] - Booking workflow controller and user-facing errors
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use estate_client::{BookingController, ClientConfig, Inventory, RestClient, Session};
//!
//! let config = ClientConfig::load_or_default(None);
//! let backend = Arc::new(RestClient::new(&config, Session::from_env()?)?);
//!
//! let flat = Inventory::new(Arc::clone(&backend)).find_flat(&key).await?;
//! let controller = BookingController::new(backend, session, flat);
//! let view = controller.add_payment("25000", PaymentSummary::default()).await?;
//! println!("{} ({:?})", view.display.status, view.display.phase);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

// Plumbing
pub mod api;
pub mod config;
pub mod error;
pub mod rest;
pub mod session;
pub mod wire;

// Domain clients
pub mod directory;
pub mod inventory;
pub mod ledger;
pub mod workflow;

#[cfg(test)]
pub(crate) mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use api::{DirectoryApi, InventoryApi, LedgerApi};
pub use config::{ApiSettings, ClientConfig};
pub use error::{ClientError, ClientResult};
pub use rest::RestClient;
pub use session::Session;

pub use directory::CustomerDirectory;
pub use inventory::{group_by_block_floor, tally, BlockLayout, Inventory, StatusTally};
pub use ledger::PaymentLedger;
pub use workflow::{
    require, ActionCode, ActionError, ActionResult, BookingController, DisplayStatus, FlatView,
    Phase,
};
