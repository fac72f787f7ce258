//! # Domain Types
//!
//! Core domain types shared by the client, the workflow controller and the
//! web frontend (via ts-rs bindings).
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Flat       │   │   BookedFlat    │   │   FlatPayment   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  projectId      │   │  projectId      │   │  paymentId      │       │
//! │  │  flatId         │──►│  flatId         │◄──│  flatId         │       │
//! │  │  block / floor  │   │  customer       │   │  amount         │       │
//! │  │  status         │   │  totalPayment   │   │  summary (mode) │       │
//! │  └─────────────────┘   │  paid           │   │  createdAt      │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   FlatStatus    │   │   PaymentMode   │   │    Customer     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  Free           │   │  Bank Transfer  │   │  _id, name      │       │
//! │  │  Booked         │   │  Cheque  UPI    │   │  phone          │       │
//! │  │  Sold           │   │  Cash  DD       │   │  status (KYC)   │       │
//! │  └─────────────────┘   │  Others         │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Names
//! Field names follow the backend's JSON exactly. Most are camelCase, but a
//! few legacy fields (`customer_id`, `flatno`, `_id`) are renamed one by one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Flat Status
// =============================================================================

/// Lifecycle state of a flat.
///
/// ```text
///   free ──book──► booked ──pay / approve loan──► sold
///     ▲               │
///     └───revert──────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum FlatStatus {
    /// Available for booking.
    #[default]
    Free,
    /// Booked with less than half the agreed price collected.
    Booked,
    /// Half the agreed price collected, or loan approved.
    Sold,
}

impl FlatStatus {
    /// Returns true when a booking record should exist for the flat.
    pub fn has_booking(&self) -> bool {
        !matches!(self, FlatStatus::Free)
    }
}

impl fmt::Display for FlatStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlatStatus::Free => write!(f, "free"),
            FlatStatus::Booked => write!(f, "booked"),
            FlatStatus::Sold => write!(f, "sold"),
        }
    }
}

// =============================================================================
// Flat
// =============================================================================

/// Identity of a flat: `(projectId, flatId)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct FlatKey {
    pub project_id: String,
    pub flat_id: String,
}

impl FlatKey {
    pub fn new(project_id: impl Into<String>, flat_id: impl Into<String>) -> Self {
        FlatKey {
            project_id: project_id.into(),
            flat_id: flat_id.into(),
        }
    }
}

impl fmt::Display for FlatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.project_id, self.flat_id)
    }
}

/// An apartment in a project's inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Flat {
    pub project_id: String,
    pub flat_id: String,

    /// Tower or block label ("A", "B2").
    pub block: String,

    pub floor: i32,

    /// Door number as printed on the flat.
    #[serde(rename = "flatno")]
    pub flat_number: String,

    /// Carpet area in square feet.
    #[serde(rename = "sqft")]
    pub square_feet: u32,

    /// Bedroom count (the "BHK" figure).
    #[serde(rename = "bhk")]
    pub bedrooms: u8,

    pub status: FlatStatus,

    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Flat {
    /// Returns the flat's identity.
    pub fn key(&self) -> FlatKey {
        FlatKey::new(self.project_id.clone(), self.flat_id.clone())
    }
}

/// A flat row submitted when a project is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewFlat {
    pub block: String,
    pub floor: i32,
    #[serde(rename = "flatno")]
    pub flat_number: String,
    #[serde(rename = "sqft")]
    pub square_feet: u32,
    #[serde(rename = "bhk")]
    pub bedrooms: u8,
    pub status: FlatStatus,
}

/// Payload for creating a project together with its flats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewProject {
    pub name: String,
    pub flats: Vec<NewFlat>,
}

// =============================================================================
// Project
// =============================================================================

/// A project with its inventory counters, as listed by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub project_id: String,
    pub name: String,
    pub total_apartments: u32,
    pub total_blocks: u32,
    pub sold_apartments: u32,
    pub free_apartments: u32,
    pub booked_apartments: u32,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub created_at: Option<DateTime<Utc>>,
}

/// `{id, name}` pair used by project pickers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProjectName {
    pub id: String,
    pub name: String,
}

// =============================================================================
// Customers (KYC)
// =============================================================================

/// KYC verification state of a customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum KycStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl fmt::Display for KycStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KycStatus::Pending => write!(f, "pending"),
            KycStatus::Approved => write!(f, "approved"),
            KycStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// Which customers a directory listing covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum KycFilter {
    #[default]
    All,
    Approved,
    Pending,
}

impl KycFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            KycFilter::All => "all",
            KycFilter::Approved => "approved",
            KycFilter::Pending => "pending",
        }
    }
}

impl fmt::Display for KycFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KycFilter {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" | "" => Ok(KycFilter::All),
            "approved" => Ok(KycFilter::Approved),
            "pending" => Ok(KycFilter::Pending),
            other => Err(ValidationError::InvalidFormat {
                field: "filter".to_string(),
                reason: format!("'{}' is not one of: all, approved, pending", other),
            }),
        }
    }
}

/// A customer record from the KYC directory.
///
/// Search endpoints return a trimmed projection (id, name, phone, status), so
/// everything past those fields is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Customer {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub status: KycStatus,

    /// Storage keys of the uploaded identity documents.
    #[serde(default)]
    pub aadhaar_key: Option<String>,
    #[serde(default)]
    pub pan_key: Option<String>,
    #[serde(default)]
    pub voter_key: Option<String>,
    #[serde(default)]
    pub other_key: Option<String>,

    #[serde(default)]
    pub aadhaar: Option<String>,
    #[serde(default)]
    pub pan: Option<String>,
    #[serde(default)]
    pub voter_id: Option<String>,
    #[serde(default)]
    pub other_id: Option<String>,

    #[serde(default, rename = "createdAt")]
    #[ts(as = "Option<String>")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Customer {
    /// Only approved customers may be attached to a booking.
    pub fn is_approved(&self) -> bool {
        self.status == KycStatus::Approved
    }

    /// Returns the reference embedded in booking requests.
    pub fn to_ref(&self) -> CustomerRef {
        CustomerRef {
            id: self.id.clone(),
            name: Some(self.name.clone()),
            phone: (!self.phone.is_empty()).then(|| self.phone.clone()),
        }
    }
}

/// Lightweight customer reference carried by bookings and payments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomerRef {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// KYC record submitted after the identity documents were uploaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct KycSubmission {
    pub customer_id: String,
    pub name: String,
    /// Lowercased name with whitespace removed; the backend dedupes on it.
    #[serde(rename = "normalized_name")]
    pub normalized_name: String,
    pub phone: String,
    pub address: String,
    pub aadhaar: String,
    pub pan: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other: Option<String>,
    pub aadhaar_key: String,
    pub pan_key: String,
    #[serde(default)]
    pub voter_key: String,
    #[serde(default)]
    pub other_key: String,
}

// =============================================================================
// Payment Mode
// =============================================================================

/// How a payment was collected. Closed set; wire strings are fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum PaymentMode {
    #[serde(rename = "Bank Transfer")]
    BankTransfer,
    Cheque,
    #[serde(rename = "UPI")]
    #[default]
    Upi,
    Cash,
    #[serde(rename = "Demand Draft")]
    DemandDraft,
    Others,
}

impl PaymentMode {
    /// Every mode, in the order shown to operators.
    pub const ALL: [PaymentMode; 6] = [
        PaymentMode::BankTransfer,
        PaymentMode::Cheque,
        PaymentMode::Upi,
        PaymentMode::Cash,
        PaymentMode::DemandDraft,
        PaymentMode::Others,
    ];

    /// Wire label of the mode.
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMode::BankTransfer => "Bank Transfer",
            PaymentMode::Cheque => "Cheque",
            PaymentMode::Upi => "UPI",
            PaymentMode::Cash => "Cash",
            PaymentMode::DemandDraft => "Demand Draft",
            PaymentMode::Others => "Others",
        }
    }
}

impl fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PaymentMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .collect::<String>()
            .to_lowercase();

        match key.as_str() {
            "banktransfer" | "bank" | "neft" | "rtgs" | "imps" => Ok(PaymentMode::BankTransfer),
            "cheque" | "check" => Ok(PaymentMode::Cheque),
            "upi" => Ok(PaymentMode::Upi),
            "cash" => Ok(PaymentMode::Cash),
            "demanddraft" | "dd" => Ok(PaymentMode::DemandDraft),
            "others" | "other" => Ok(PaymentMode::Others),
            _ => Err(ValidationError::InvalidFormat {
                field: "payment mode".to_string(),
                reason: format!(
                    "'{}' is not one of: {}",
                    s,
                    PaymentMode::ALL.map(|m| m.label()).join(", ")
                ),
            }),
        }
    }
}

// =============================================================================
// Payment Summary
// =============================================================================

/// Mode plus mode-specific details sent with every payment.
///
/// `chequeNumber` and `bankName` are always present on the wire, as `null`
/// when unknown. They stay optional even in Cheque mode.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSummary {
    pub mode: PaymentMode,
    #[serde(default)]
    pub cheque_number: Option<String>,
    #[serde(default)]
    pub bank_name: Option<String>,
}

impl PaymentSummary {
    /// A summary with no mode-specific details.
    pub fn new(mode: PaymentMode) -> Self {
        PaymentSummary {
            mode,
            cheque_number: None,
            bank_name: None,
        }
    }

    /// A cheque summary. Blank strings are treated as missing.
    pub fn cheque(number: Option<&str>, bank: Option<&str>) -> Self {
        PaymentSummary {
            mode: PaymentMode::Cheque,
            cheque_number: number.map(str::to_string),
            bank_name: bank.map(str::to_string),
        }
        .normalized()
    }

    /// Trims the optional details and turns blank ones into `None`.
    pub fn normalized(self) -> Self {
        let clean = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        PaymentSummary {
            mode: self.mode,
            cheque_number: clean(self.cheque_number),
            bank_name: clean(self.bank_name),
        }
    }

    /// One-line description for listings; never fails on missing details.
    ///
    /// ```rust
    /// use estate_core::{PaymentMode, PaymentSummary};
    ///
    /// assert_eq!(PaymentSummary::new(PaymentMode::Upi).describe(), "UPI");
    /// assert_eq!(PaymentSummary::cheque(None, None).describe(), "Cheque #- (bank -)");
    /// assert_eq!(
    ///     PaymentSummary::cheque(Some("004512"), Some("SBI")).describe(),
    ///     "Cheque #004512 (SBI)"
    /// );
    /// ```
    pub fn describe(&self) -> String {
        match self.mode {
            PaymentMode::Cheque => format!(
                "Cheque #{} ({})",
                self.cheque_number.as_deref().unwrap_or("-"),
                self.bank_name
                    .as_deref()
                    .map(str::to_string)
                    .unwrap_or_else(|| "bank -".to_string())
            ),
            mode => match self.bank_name.as_deref() {
                Some(bank) => format!("{} ({})", mode, bank),
                None => mode.to_string(),
            },
        }
    }
}

// =============================================================================
// Booking
// =============================================================================

/// The booking record behind a non-free flat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BookedFlat {
    pub project_id: String,
    pub flat_id: String,

    #[serde(rename = "customer_id")]
    pub customer_id: String,

    #[serde(rename = "customer_name")]
    pub customer_name: String,

    /// Agreed sale price.
    #[ts(type = "number")]
    pub total_payment: Money,

    /// Cumulative amount collected so far.
    #[ts(type = "number")]
    pub paid: Money,

    /// Loan approval override; forces `sold` regardless of `paid`.
    #[serde(default)]
    pub loan_approved: bool,
}

impl BookedFlat {
    /// Returns the flat's identity.
    pub fn key(&self) -> FlatKey {
        FlatKey::new(self.project_id.clone(), self.flat_id.clone())
    }

    /// Amount still owed, floored at zero.
    pub fn remaining(&self) -> Money {
        self.paid.remaining_of(self.total_payment)
    }
}

// =============================================================================
// Payment
// =============================================================================

/// An immutable payment record. Payments are append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct FlatPayment {
    #[serde(default)]
    pub project_name: String,
    pub project_id: String,
    pub payment_id: String,
    pub flat_id: String,
    pub customer: CustomerRef,
    #[ts(type = "number")]
    pub amount: Money,
    pub summary: PaymentSummary,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl FlatPayment {
    /// Returns the paid flat's identity.
    pub fn flat_key(&self) -> FlatKey {
        FlatKey::new(self.project_id.clone(), self.flat_id.clone())
    }
}

// =============================================================================
// Pagination
// =============================================================================

/// One page of a backend listing. The backend decides the page size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub total_pages: u32,
    pub current_page: u32,
}

impl<T> Page<T> {
    /// An empty first page.
    pub fn empty() -> Self {
        Page {
            items: Vec::new(),
            total_count: 0,
            total_pages: 0,
            current_page: 1,
        }
    }

    /// Returns true if a later page exists.
    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_status_wire_names() {
        assert_eq!(serde_json::to_string(&FlatStatus::Booked).unwrap(), "\"booked\"");
        let sold: FlatStatus = serde_json::from_str("\"sold\"").unwrap();
        assert_eq!(sold, FlatStatus::Sold);
        assert_eq!(FlatStatus::default(), FlatStatus::Free);
    }

    #[test]
    fn test_payment_mode_wire_names() {
        assert_eq!(
            serde_json::to_string(&PaymentMode::BankTransfer).unwrap(),
            "\"Bank Transfer\""
        );
        assert_eq!(
            serde_json::to_string(&PaymentMode::DemandDraft).unwrap(),
            "\"Demand Draft\""
        );
        let upi: PaymentMode = serde_json::from_str("\"UPI\"").unwrap();
        assert_eq!(upi, PaymentMode::Upi);
    }

    #[test]
    fn test_payment_mode_parsing() {
        assert_eq!("bank transfer".parse::<PaymentMode>().unwrap(), PaymentMode::BankTransfer);
        assert_eq!("DD".parse::<PaymentMode>().unwrap(), PaymentMode::DemandDraft);
        assert_eq!("cheque".parse::<PaymentMode>().unwrap(), PaymentMode::Cheque);
        assert!("bitcoin".parse::<PaymentMode>().is_err());
    }

    #[test]
    fn test_summary_serializes_nulls() {
        let json = serde_json::to_value(PaymentSummary::cheque(Some(" "), None)).unwrap();
        assert_eq!(json["mode"], "Cheque");
        assert!(json["chequeNumber"].is_null());
        assert!(json["bankName"].is_null());
    }

    #[test]
    fn test_booked_flat_from_backend_json() {
        let json = r#"{
            "projectId": "p1",
            "flatId": "f7",
            "customer_id": "c9",
            "customer_name": "Asha Rao",
            "totalPayment": 200000,
            "paid": 50000
        }"#;
        let booked: BookedFlat = serde_json::from_str(json).unwrap();
        assert_eq!(booked.customer_name, "Asha Rao");
        assert_eq!(booked.total_payment, Money::from_rupees(200_000));
        assert_eq!(booked.remaining(), Money::from_rupees(150_000));
        assert!(!booked.loan_approved);
        assert_eq!(booked.key(), FlatKey::new("p1", "f7"));
    }

    #[test]
    fn test_flat_from_backend_json() {
        let json = r#"{
            "projectId": "p1",
            "flatId": "f7",
            "block": "A",
            "floor": 3,
            "flatno": "A-302",
            "sqft": 1180,
            "bhk": 2,
            "status": "free",
            "createdAt": "2025-11-02T10:00:00Z"
        }"#;
        let flat: Flat = serde_json::from_str(json).unwrap();
        assert_eq!(flat.flat_number, "A-302");
        assert_eq!(flat.bedrooms, 2);
        assert!(flat.created_at.is_some());
    }

    #[test]
    fn test_customer_projection_defaults() {
        let customer: Customer =
            serde_json::from_str(r#"{"_id": "c1", "name": "Ravi", "phone": "9800000000"}"#)
                .unwrap();
        assert_eq!(customer.status, KycStatus::Pending);
        assert!(!customer.is_approved());
        assert_eq!(customer.to_ref().phone.as_deref(), Some("9800000000"));
    }
}
