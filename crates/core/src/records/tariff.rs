//! Tariff rates.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{TariffId, UserId};

/// A price per liter, valid over a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TariffRate {
    pub tariff_id: TariffId,
    pub rate_name: String,
    /// RWF per liter.
    pub rate_per_liter: Decimal,
    pub effective_from: NaiveDate,
    #[serde(default)]
    pub effective_to: Option<NaiveDate>,
    pub is_active: bool,
    #[serde(default)]
    pub set_by: Option<UserId>,
    #[serde(default)]
    pub created_date: Option<DateTime<Utc>>,
}

impl TariffRate {
    /// Whether the rate applies on the given day.
    #[must_use]
    pub fn applies_on(&self, day: NaiveDate) -> bool {
        self.is_active
            && self.effective_from <= day
            && self.effective_to.is_none_or(|to| day <= to)
    }
}

/// Request body for creating or replacing a tariff rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTariffRate {
    pub rate_name: String,
    pub rate_per_liter: Decimal,
    pub effective_from: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_to: Option<NaiveDate>,
    pub is_active: bool,
}
