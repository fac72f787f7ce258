//! # Payment Ledger
//!
//! Typed wrapper over the bookings and payments endpoints. Writes are sent
//! once and never retried; a failed write goes straight back to the caller.

use std::sync::Arc;

use estate_core::validation::validate_search_query;
use estate_core::{BookedFlat, CustomerRef, FlatKey, FlatPayment, Money, Page, PaymentSummary};
use tracing::{debug, info};

use crate::api::LedgerApi;
use crate::error::ClientResult;
use crate::wire::{AddPaymentRequest, BookFlatRequest};

/// Records bookings and payments against flats.
#[derive(Debug)]
pub struct PaymentLedger<B> {
    backend: Arc<B>,
}

impl<B> Clone for PaymentLedger<B> {
    fn clone(&self) -> Self {
        PaymentLedger {
            backend: Arc::clone(&self.backend),
        }
    }
}

impl<B: LedgerApi> PaymentLedger<B> {
    pub fn new(backend: Arc<B>) -> Self {
        PaymentLedger { backend }
    }

    /// Books a free flat with its first payment.
    pub async fn book(
        &self,
        key: &FlatKey,
        customer: CustomerRef,
        total_payment: Money,
        amount: Money,
        summary: PaymentSummary,
    ) -> ClientResult<()> {
        let request = BookFlatRequest {
            customer,
            amount,
            total_payment,
            summary: summary.normalized(),
        };
        self.backend.book_flat(key, &request).await?;
        info!(flat = %key, amount = %amount, total = %total_payment, "Flat booked");
        Ok(())
    }

    /// Appends a payment and returns the cumulative paid amount.
    pub async fn pay(&self, key: &FlatKey, amount: Money, summary: PaymentSummary) -> ClientResult<Money> {
        let request = AddPaymentRequest {
            amount,
            summary: summary.normalized(),
        };
        let paid = self.backend.add_payment(key, &request).await?;
        info!(flat = %key, amount = %amount, paid = %paid, "Payment recorded");
        Ok(paid)
    }

    pub async fn booking(&self, key: &FlatKey) -> ClientResult<BookedFlat> {
        self.backend.booked_flat(key).await
    }

    /// Payment history, oldest first.
    pub async fn history(&self, key: &FlatKey) -> ClientResult<Vec<FlatPayment>> {
        let mut payments = self.backend.payment_history(key).await?;
        payments.sort_by_key(|p| p.created_at);
        debug!(flat = %key, count = payments.len(), "Loaded payment history");
        Ok(payments)
    }

    pub async fn approve_loan(&self, key: &FlatKey) -> ClientResult<()> {
        self.backend.approve_loan(key).await?;
        info!(flat = %key, "Loan approved");
        Ok(())
    }

    /// Lists payments across all flats. A blank query lists everything.
    ///
    /// The query matches customer, project, flat and payment id on the
    /// backend.
    pub async fn payments(&self, query: Option<&str>, page: u32) -> ClientResult<Page<FlatPayment>> {
        let query = validate_search_query(query.unwrap_or_default())?;

        if query.is_empty() {
            self.backend.all_payments(page).await
        } else {
            self.backend.search_payments(&query, page).await
        }
    }
}
