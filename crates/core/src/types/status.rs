//! Status enums for the backend's records.
//!
//! Variants serialize with the exact strings the backend stores
//! (`"Active"`, `"Mobile Money"`, `"household_payment"`, ...).

use serde::{Deserialize, Serialize};

/// Status of a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AccountStatus {
    #[default]
    Active,
    Inactive,
}

/// Status of a household water connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum HouseholdStatus {
    #[default]
    Active,
    Inactive,
    Suspended,
}

/// Lifecycle of a meter reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum UsageStatus {
    #[default]
    Pending,
    Verified,
    /// A bill has been generated from this reading.
    Billed,
}

/// Lifecycle of a bill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BillStatus {
    #[default]
    Pending,
    Paid,
    Overdue,
    Cancelled,
}

impl BillStatus {
    /// Whether the bill still expects a payment.
    #[must_use]
    pub const fn is_outstanding(self) -> bool {
        matches!(self, Self::Pending | Self::Overdue)
    }
}

/// How a payment was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    Cash,
    #[serde(rename = "Mobile Money")]
    MobileMoney,
    #[serde(rename = "Bank Transfer")]
    BankTransfer,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cash => write!(f, "Cash"),
            Self::MobileMoney => write!(f, "Mobile Money"),
            Self::BankTransfer => write!(f, "Bank Transfer"),
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], " ").as_str() {
            "cash" => Ok(Self::Cash),
            "mobile money" | "momo" => Ok(Self::MobileMoney),
            "bank transfer" | "bank" => Ok(Self::BankTransfer),
            _ => Err(format!("invalid payment method: {s}")),
        }
    }
}

/// Outcome of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentStatus {
    #[default]
    Completed,
    Pending,
    Failed,
}

/// Why an SMS was sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SmsKind {
    #[serde(rename = "Bill Generated")]
    BillGenerated,
    #[serde(rename = "Payment Confirmation")]
    PaymentConfirmation,
    #[default]
    General,
}

/// Delivery outcome of an SMS, as logged by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SmsStatus {
    #[default]
    Sent,
    Failed,
}

/// Kind of in-app notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    HouseholdPayment,
    NewRegistration,
    TariffChange,
    AdminPayment,
    NewBill,
}
