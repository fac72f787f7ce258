//! # Customer Directory
//!
//! Lookup and registration of KYC customers.
//!
//! ## Search Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  search_approved(query)                                                 │
//! │       │                                                                 │
//! │       ├── blank query?      → [] (no request sent)                      │
//! │       ├── query too long?   → [] + warn                                 │
//! │       ├── backend error?    → [] + warn                                 │
//! │       └── OK                → approved customers (id, name, phone)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The picker behind the booking form must never fail, so search swallows
//! errors after logging them. Listing and KYC writes return errors normally.

use std::sync::Arc;

use estate_core::validation::{validate_kyc_submission, validate_required, validate_search_query};
use estate_core::{Customer, KycFilter, KycSubmission, Page};
use tracing::{debug, info, warn};

use crate::api::DirectoryApi;
use crate::error::{ClientError, ClientResult};

/// Message shown when the backend reports a duplicate KYC record.
pub const DUPLICATE_KYC_MESSAGE: &str = "Duplicate exists";

#[derive(Debug)]
pub struct CustomerDirectory<B> {
    backend: Arc<B>,
}

impl<B> Clone for CustomerDirectory<B> {
    fn clone(&self) -> Self {
        CustomerDirectory {
            backend: Arc::clone(&self.backend),
        }
    }
}

impl<B: DirectoryApi> CustomerDirectory<B> {
    pub fn new(backend: Arc<B>) -> Self {
        CustomerDirectory { backend }
    }

    /// Finds approved customers for the booking picker. Never fails.
    pub async fn search_approved(&self, query: &str) -> Vec<Customer> {
        let query = match validate_search_query(query) {
            Ok(q) if q.is_empty() => return Vec::new(),
            Ok(q) => q,
            Err(e) => {
                warn!(error = %e, "Rejected customer search query");
                return Vec::new();
            }
        };

        match self
            .backend
            .search_customers(KycFilter::Approved, &query, 1)
            .await
        {
            Ok(page) => {
                debug!(query = %query, hits = page.items.len(), "Customer search");
                page.items.into_iter().filter(Customer::is_approved).collect()
            }
            Err(e) => {
                warn!(query = %query, error = %e, "Customer search failed");
                Vec::new()
            }
        }
    }

    /// Lists customers by KYC state, optionally narrowed by a query.
    pub async fn list(
        &self,
        filter: KycFilter,
        query: Option<&str>,
        page: u32,
    ) -> ClientResult<Page<Customer>> {
        let query = validate_search_query(query.unwrap_or_default())?;

        if query.is_empty() {
            self.backend.list_customers(filter, page).await
        } else {
            self.backend.search_customers(filter, &query, page).await
        }
    }

    /// Registers a customer whose identity documents are already uploaded.
    pub async fn submit_kyc(&self, submission: KycSubmission) -> ClientResult<Option<Customer>> {
        let submission = validate_kyc_submission(submission)?;

        match self.backend.submit_kyc(&submission).await {
            Ok(customer) => {
                info!(customer_id = %submission.customer_id, "KYC submitted");
                Ok(customer)
            }
            Err(e) if e.is_conflict() => {
                warn!(
                    customer_id = %submission.customer_id,
                    normalized_name = %submission.normalized_name,
                    "Duplicate KYC submission"
                );
                Err(ClientError::Conflict(DUPLICATE_KYC_MESSAGE.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    pub async fn approve(&self, customer_id: &str) -> ClientResult<()> {
        let customer_id = validate_required("customer id", customer_id)?;
        self.backend.approve_kyc(&customer_id).await?;
        info!(customer_id = %customer_id, "KYC approved");
        Ok(())
    }

    pub async fn delete(&self, customer_id: &str) -> ClientResult<()> {
        let customer_id = validate_required("customer id", customer_id)?;
        self.backend.delete_kyc(&customer_id).await?;
        info!(customer_id = %customer_id, "KYC record deleted");
        Ok(())
    }
}
