//! Household records.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{FieldErrors, is_national_id, is_phone_number, push_error};
use crate::types::{Email, HouseholdId, HouseholdStatus, User, UserId};

/// A household connected to the water network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Household {
    pub household_id: HouseholdId,
    /// Generated by the backend, e.g. `HH-2025-0001`.
    pub household_code: String,
    pub household_name: String,
    pub head_of_household: String,
    pub national_id: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub cell: Option<String>,
    #[serde(default)]
    pub village: Option<String>,
    pub phone_number: String,
    #[serde(default)]
    pub email: Option<Email>,
    pub number_of_members: u32,
    #[serde(default)]
    pub meter_number: Option<String>,
    pub connection_date: NaiveDate,
    #[serde(default)]
    pub status: HouseholdStatus,
    #[serde(default)]
    pub registered_by: Option<UserId>,
    #[serde(default)]
    pub registered_by_name: Option<String>,
    /// Linked login account, if the household has one.
    #[serde(default)]
    pub user: Option<UserId>,
    #[serde(default)]
    pub user_details: Option<Box<User>>,
    #[serde(default)]
    pub registration_date: Option<DateTime<Utc>>,
}

/// Request body for creating or replacing a household.
///
/// `username`/`password` optionally create (or update) the household's
/// login account alongside the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewHousehold {
    pub household_name: String,
    pub head_of_household: String,
    pub national_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cell: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub village: Option<String>,
    pub phone_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<Email>,
    pub number_of_members: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meter_number: Option<String>,
    pub connection_date: NaiveDate,
    pub status: HouseholdStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl NewHousehold {
    /// Check the fields the backend validates before sending them.
    ///
    /// # Errors
    ///
    /// Returns the failing fields with their messages.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        if self.household_name.trim().is_empty() {
            push_error(&mut errors, "household_name", "This field is required");
        }
        if !is_national_id(&self.national_id) {
            push_error(&mut errors, "national_id", "National ID must be exactly 16 digits");
        }
        if !is_phone_number(&self.phone_number) {
            push_error(&mut errors, "phone_number", "Phone number must be 10-15 digits");
        }
        if self.number_of_members < 1 {
            push_error(
                &mut errors,
                "number_of_members",
                "Number of members must be at least 1",
            );
        }
        if let Some(password) = &self.password
            && password.len() < 8
        {
            push_error(&mut errors, "password", "Password must be at least 8 characters");
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}
