//! # Wire Envelopes
//!
//! Request bodies and response envelopes exchanged with the backend. Domain
//! records (`Flat`, `BookedFlat`, `FlatPayment`, ...) live in `estate-core`;
//! this module only wraps them the way the backend does.
//!
//! Every response carries a `success` flag. A 2xx with `success: false` is
//! still a failure and surfaces as [`ClientError::Rejected`](crate::ClientError::Rejected).

use estate_core::{
    BookedFlat, Customer, CustomerRef, Flat, FlatPayment, Money, Page, PaymentSummary, Project,
    ProjectName,
};
use serde::{Deserialize, Serialize};

fn accepted() -> bool {
    true
}

/// Shared view over every response envelope.
pub trait Envelope {
    fn success(&self) -> bool;
    fn message(&self) -> Option<&str>;
}

macro_rules! envelope {
    ($ty:ty) => {
        impl Envelope for $ty {
            fn success(&self) -> bool {
                self.success
            }
            fn message(&self) -> Option<&str> {
                None
            }
        }
    };
    ($ty:ty, message) => {
        impl Envelope for $ty {
            fn success(&self) -> bool {
                self.success
            }
            fn message(&self) -> Option<&str> {
                self.message.as_deref()
            }
        }
    };
}

// =============================================================================
// Auth
// =============================================================================

/// User block of the login response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    pub role: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Login response from the auth service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub user: AuthUser,
}

// =============================================================================
// Requests
// =============================================================================

/// `POST bookings/flats/{projectId}/{flatId}/book`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookFlatRequest {
    pub customer: CustomerRef,
    pub amount: Money,
    pub total_payment: Money,
    pub summary: PaymentSummary,
}

/// `POST payments/flats/{projectId}/{flatId}/pay`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddPaymentRequest {
    pub amount: Money,
    pub summary: PaymentSummary,
}

// =============================================================================
// Responses
// =============================================================================

/// Plain `{success, message}` acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ack {
    #[serde(default = "accepted")]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}
envelope!(Ack, message);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookedResponse {
    #[serde(default = "accepted")]
    pub success: bool,
    pub booked: BookedFlat,
}
envelope!(BookedResponse);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayResponse {
    #[serde(default = "accepted")]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    /// Cumulative paid after this payment, as recorded by the backend.
    pub paid: Money,
}
envelope!(PayResponse, message);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    #[serde(default = "accepted")]
    pub success: bool,
    #[serde(default)]
    pub count: u64,
    pub payments: Vec<FlatPayment>,
}
envelope!(HistoryResponse);

/// `GET payments/all` and `GET payments/search`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentsPage {
    #[serde(default = "accepted")]
    pub success: bool,
    pub payments: Vec<FlatPayment>,
    pub total_count: u64,
    pub total_pages: u32,
    pub current_page: u32,
    #[serde(default)]
    pub count: Option<u64>,
}
envelope!(PaymentsPage);

impl From<PaymentsPage> for Page<FlatPayment> {
    fn from(page: PaymentsPage) -> Self {
        Page {
            items: page.payments,
            total_count: page.total_count,
            total_pages: page.total_pages,
            current_page: page.current_page,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectsResponse {
    #[serde(default = "accepted")]
    pub success: bool,
    pub projects: Vec<Project>,
}
envelope!(ProjectsResponse);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectNamesResponse {
    #[serde(default = "accepted")]
    pub success: bool,
    pub projects: Vec<ProjectName>,
}
envelope!(ProjectNamesResponse);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProjectResponse {
    #[serde(default = "accepted")]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    pub project: Project,
}
envelope!(CreateProjectResponse, message);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlatsResponse {
    #[serde(default = "accepted")]
    pub success: bool,
    pub flats: Vec<Flat>,
}
envelope!(FlatsResponse);

/// Customer listings. Older endpoints omit the paging fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomersResponse {
    #[serde(default = "accepted")]
    pub success: bool,
    #[serde(default)]
    pub count: Option<u64>,
    pub customers: Vec<Customer>,
    #[serde(default)]
    pub total_count: Option<u64>,
    #[serde(default)]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub current_page: Option<u32>,
}
envelope!(CustomersResponse);

impl From<CustomersResponse> for Page<Customer> {
    fn from(response: CustomersResponse) -> Self {
        let total_count = response
            .total_count
            .or(response.count)
            .unwrap_or(response.customers.len() as u64);
        Page {
            total_pages: response.total_pages.unwrap_or(1),
            current_page: response.current_page.unwrap_or(1),
            total_count,
            items: response.customers,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KycResponse {
    #[serde(default = "accepted")]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub customer: Option<Customer>,
}
envelope!(KycResponse, message);

#[cfg(test)]
mod tests {
    use super::*;
    use estate_core::PaymentMode;
    use serde_json::json;

    #[test]
    fn test_book_request_body() {
        let body = BookFlatRequest {
            customer: CustomerRef {
                id: "c1".to_string(),
                name: Some("Asha".to_string()),
                phone: None,
            },
            amount: Money::from_rupees(50_000),
            total_payment: Money::from_rupees(200_000),
            summary: PaymentSummary::new(PaymentMode::BankTransfer),
        };

        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(
            value,
            json!({
                "customer": {"id": "c1", "name": "Asha"},
                "amount": 50000,
                "totalPayment": 200000,
                "summary": {"mode": "Bank Transfer", "chequeNumber": null, "bankName": null}
            })
        );
    }

    #[test]
    fn test_payments_page_into_page() {
        let page: PaymentsPage = serde_json::from_value(json!({
            "success": true,
            "payments": [],
            "totalCount": 41,
            "totalPages": 5,
            "currentPage": 2
        }))
        .unwrap();
        let page: Page<FlatPayment> = page.into();
        assert_eq!(page.total_count, 41);
        assert!(page.has_next());
    }

    #[test]
    fn test_customers_without_paging_fields() {
        let response: CustomersResponse = serde_json::from_value(json!({
            "success": true,
            "count": 1,
            "customers": [{"_id": "c1", "name": "Ravi", "phone": "9800000000", "status": "approved"}]
        }))
        .unwrap();
        let page: Page<Customer> = response.into();
        assert_eq!(page.total_count, 1);
        assert_eq!(page.total_pages, 1);
        assert!(page.items[0].is_approved());
    }

    #[test]
    fn test_missing_success_counts_as_accepted() {
        let ack: Ack = serde_json::from_value(json!({"message": "ok"})).unwrap();
        assert!(ack.success());
        assert_eq!(ack.message(), Some("ok"));
    }
}
