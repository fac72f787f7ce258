//! # Access Control
//!
//! Staff roles and the capabilities they grant. The backend enforces access
//! too; this table decides what the shell offers and what the workflow
//! controller attempts.
//!
//! ```text
//! ┌──────────────────┬───────┬───────┬──────────┬─────┐
//! │ Capability       │ admin │ sales │ accounts │ kyc │
//! ├──────────────────┼───────┼───────┼──────────┼─────┤
//! │ projects / flats │   ✓   │   ✓   │    ✓     │  ✓  │
//! │ customers        │   ✓   │   ✓   │    ✓     │  ✓  │
//! │ payments         │   ✓   │       │    ✓     │     │
//! │ KYC submission   │   ✓   │       │          │  ✓  │
//! │ book / pay       │   ✓   │   ✓   │    ✓     │     │
//! │ loan / revert    │   ✓   │       │          │     │
//! │ analytics, users │   ✓   │       │          │     │
//! │ projects, KYC    │   ✓   │       │          │     │
//! │  approval/delete │       │       │          │     │
//! └──────────────────┴───────┴───────┴──────────┴─────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;

/// A staff member's role, as issued by the auth service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Sales,
    Accounts,
    Kyc,
}

/// Something a role may be allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    ViewAnalytics,
    ViewProjects,
    ViewApartments,
    ViewCustomers,
    ViewPayments,
    SubmitKyc,
    ManageUsers,
    ManageProjects,
    ApproveKyc,
    DeleteKyc,
    BookFlat,
    AddPayment,
    ApproveLoan,
    RevertBooking,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Sales, Role::Accounts, Role::Kyc];

    /// Returns true if the role grants `capability`.
    pub fn can(&self, capability: Capability) -> bool {
        use Capability::*;

        match self {
            Role::Admin => true,
            Role::Sales => matches!(
                capability,
                ViewProjects | ViewApartments | ViewCustomers | BookFlat | AddPayment
            ),
            Role::Accounts => matches!(
                capability,
                ViewProjects
                    | ViewApartments
                    | ViewCustomers
                    | ViewPayments
                    | BookFlat
                    | AddPayment
            ),
            Role::Kyc => matches!(
                capability,
                ViewProjects | ViewApartments | ViewCustomers | SubmitKyc
            ),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Sales => "sales",
            Role::Accounts => "accounts",
            Role::Kyc => "kyc",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a role name. The auth service's generic `user` role maps to sales.
impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "sales" | "user" => Ok(Role::Sales),
            "accounts" => Ok(Role::Accounts),
            "kyc" => Ok(Role::Kyc),
            other => Err(ValidationError::InvalidFormat {
                field: "role".to_string(),
                reason: format!("unknown role '{}'", other),
            }),
        }
    }
}
