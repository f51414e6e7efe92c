//! Monthly meter readings.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{FieldErrors, push_error};
use crate::types::{BillingPeriod, HouseholdId, UsageId, UsageStatus, UserId};

/// One household's meter reading for one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaterUsage {
    pub usage_id: UsageId,
    pub household: HouseholdId,
    #[serde(default)]
    pub household_code: Option<String>,
    #[serde(default)]
    pub household_name: Option<String>,
    pub previous_reading: Decimal,
    pub current_reading: Decimal,
    /// Computed by the backend as `current - previous`.
    pub liters_used: Decimal,
    pub reading_date: NaiveDate,
    pub reading_month: BillingPeriod,
    #[serde(default)]
    pub recorded_by: Option<UserId>,
    #[serde(default)]
    pub status: UsageStatus,
    #[serde(default)]
    pub created_date: Option<DateTime<Utc>>,
}

/// Request body for recording a meter reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewWaterUsage {
    pub household: HouseholdId,
    pub previous_reading: Decimal,
    pub current_reading: Decimal,
    pub reading_date: NaiveDate,
    pub reading_month: BillingPeriod,
}

impl NewWaterUsage {
    /// Liters consumed according to this reading.
    #[must_use]
    pub fn liters_used(&self) -> Decimal {
        self.current_reading - self.previous_reading
    }

    /// Check the reading before sending it.
    ///
    /// # Errors
    ///
    /// Returns the failing fields with their messages.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        if self.current_reading.is_sign_negative() {
            push_error(&mut errors, "current_reading", "Reading cannot be negative");
        }
        if self.current_reading < self.previous_reading {
            push_error(
                &mut errors,
                "current_reading",
                "Current reading must be greater than or equal to previous reading",
            );
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}
