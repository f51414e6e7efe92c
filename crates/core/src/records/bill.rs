//! Bills and the bill-generation request.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{
    BillId, BillStatus, BillingPeriod, BillingPeriodError, Capabilities, HouseholdId, TariffId,
    UsageId, User, UserId,
};

/// A bill issued to a household for one billing period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bill {
    pub bill_id: BillId,
    /// Generated by the backend, e.g. `BILL-202503-0007`.
    pub bill_number: String,
    pub household: HouseholdId,
    #[serde(default)]
    pub household_code: Option<String>,
    #[serde(default)]
    pub household_name: Option<String>,
    #[serde(default)]
    pub usage: Option<UsageId>,
    #[serde(default)]
    pub tariff: Option<TariffId>,
    pub liters_consumed: Decimal,
    pub rate_applied: Decimal,
    pub subtotal: Decimal,
    #[serde(default)]
    pub penalty_amount: Decimal,
    #[serde(default)]
    pub discount_amount: Decimal,
    pub total_amount: Decimal,
    pub bill_date: NaiveDate,
    pub due_date: NaiveDate,
    pub billing_period: BillingPeriod,
    #[serde(default)]
    pub status: BillStatus,
    #[serde(default)]
    pub generated_by: Option<UserId>,
    #[serde(default)]
    pub generation_date: Option<DateTime<Utc>>,
}

/// Why a bill-generation request was refused before it was sent.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum BillGenerationError {
    /// The billing period is malformed.
    #[error(transparent)]
    Period(#[from] BillingPeriodError),
    /// The signed-in household account has no linked household.
    #[error("No household profile found")]
    NoHouseholdProfile,
    /// A household account asked for another household's bills.
    #[error("You can only generate bills for your own household")]
    ForeignHousehold,
    /// No signed-in user.
    #[error("Permission denied")]
    NotAuthenticated,
}

/// Body of `POST /bills/generate_bills/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillGenerationRequest {
    pub billing_period: BillingPeriod,
    /// Restrict generation to one household; all active households when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub household_id: Option<HouseholdId>,
}

impl BillGenerationRequest {
    /// Build a request on behalf of `user`, applying the same ownership rule
    /// as the backend: household accounts may only bill their own household,
    /// and their request is pinned to it.
    ///
    /// # Errors
    ///
    /// Returns a [`BillGenerationError`] if the period is malformed or the
    /// user may not generate the requested bills.
    pub fn for_user(
        user: Option<&User>,
        billing_period: &str,
        household_id: Option<HouseholdId>,
    ) -> Result<Self, BillGenerationError> {
        let billing_period = BillingPeriod::parse(billing_period)?;
        let caps = Capabilities::for_user(user);

        let household_id = match user {
            None => return Err(BillGenerationError::NotAuthenticated),
            Some(user) if caps.is_household => {
                let own = user
                    .household_id
                    .ok_or(BillGenerationError::NoHouseholdProfile)?;
                if household_id.is_some_and(|requested| requested != own) {
                    return Err(BillGenerationError::ForeignHousehold);
                }
                Some(own)
            }
            Some(_) => household_id,
        };

        Ok(Self {
            billing_period,
            household_id,
        })
    }
}

/// Response of `POST /bills/generate_bills/`.
///
/// The backend answers 201 when at least one bill was created, 400 otherwise,
/// with the same body shape in both cases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillGenerationOutcome {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub bills: Vec<Bill>,
    /// Per-household problems (bill already exists, no reading, ...).
    #[serde(default)]
    pub errors: Vec<String>,
}
