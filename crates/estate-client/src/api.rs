//! # Backend Seams
//!
//! One trait per backend area. [`RestClient`](crate::RestClient) implements
//! all three over HTTP; tests substitute an in-memory backend.
//!
//! ```text
//! ┌──────────────────────┐    ┌──────────────────────┐    ┌────────────────┐
//! │ BookingController    │───►│ LedgerApi            │    │                │
//! │ PaymentLedger        │    │  book / pay / history│    │                │
//! ├──────────────────────┤    ├──────────────────────┤    │   RestClient   │
//! │ CustomerDirectory    │───►│ DirectoryApi         │───►│   (reqwest)    │
//! ├──────────────────────┤    ├──────────────────────┤    │                │
//! │ Inventory            │───►│ InventoryApi         │    │                │
//! └──────────────────────┘    └──────────────────────┘    └────────────────┘
//! ```

use std::future::Future;

use estate_core::{
    BookedFlat, Customer, Flat, FlatKey, FlatPayment, KycFilter, KycSubmission, Money, NewProject,
    Page, Project, ProjectName,
};

use crate::error::ClientResult;
use crate::wire::{AddPaymentRequest, BookFlatRequest};

/// Bookings and payments.
pub trait LedgerApi: Send + Sync {
    /// Creates the booking together with its first payment.
    fn book_flat(
        &self,
        key: &FlatKey,
        request: &BookFlatRequest,
    ) -> impl Future<Output = ClientResult<()>> + Send;

    /// Fetches the booking record of a non-free flat.
    fn booked_flat(&self, key: &FlatKey) -> impl Future<Output = ClientResult<BookedFlat>> + Send;

    /// Appends a payment. Returns the cumulative paid amount.
    fn add_payment(
        &self,
        key: &FlatKey,
        request: &AddPaymentRequest,
    ) -> impl Future<Output = ClientResult<Money>> + Send;

    /// All payments recorded against one flat.
    fn payment_history(
        &self,
        key: &FlatKey,
    ) -> impl Future<Output = ClientResult<Vec<FlatPayment>>> + Send;

    fn all_payments(&self, page: u32)
        -> impl Future<Output = ClientResult<Page<FlatPayment>>> + Send;

    fn search_payments(
        &self,
        query: &str,
        page: u32,
    ) -> impl Future<Output = ClientResult<Page<FlatPayment>>> + Send;

    /// Marks the booking's home loan as sanctioned.
    fn approve_loan(&self, key: &FlatKey) -> impl Future<Output = ClientResult<()>> + Send;
}

/// Customer KYC records.
pub trait DirectoryApi: Send + Sync {
    fn list_customers(
        &self,
        filter: KycFilter,
        page: u32,
    ) -> impl Future<Output = ClientResult<Page<Customer>>> + Send;

    fn search_customers(
        &self,
        filter: KycFilter,
        query: &str,
        page: u32,
    ) -> impl Future<Output = ClientResult<Page<Customer>>> + Send;

    /// Registers a customer whose documents are already uploaded.
    fn submit_kyc(
        &self,
        submission: &KycSubmission,
    ) -> impl Future<Output = ClientResult<Option<Customer>>> + Send;

    fn approve_kyc(&self, customer_id: &str) -> impl Future<Output = ClientResult<()>> + Send;

    fn delete_kyc(&self, customer_id: &str) -> impl Future<Output = ClientResult<()>> + Send;
}

/// Projects and their flats.
pub trait InventoryApi: Send + Sync {
    fn projects(&self) -> impl Future<Output = ClientResult<Vec<Project>>> + Send;

    fn project_names(&self) -> impl Future<Output = ClientResult<Vec<ProjectName>>> + Send;

    fn project_flats(
        &self,
        project_id: &str,
    ) -> impl Future<Output = ClientResult<Vec<Flat>>> + Send;

    fn create_project(
        &self,
        project: &NewProject,
    ) -> impl Future<Output = ClientResult<Project>> + Send;

    fn delete_project(&self, project_id: &str) -> impl Future<Output = ClientResult<()>> + Send;
}
