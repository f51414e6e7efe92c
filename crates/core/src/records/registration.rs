//! Self-service account registration.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{FieldErrors, is_national_id, is_phone_number, push_error};
use crate::types::{Email, Role};

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Body of `POST /auth/register/`.
///
/// The household fields are only read by the backend when `role` is
/// [`Role::Household`]; it creates the linked household record from them,
/// falling back to the account's own name and phone number.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RegistrationProfile {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub role: Role,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub national_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub household_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head_of_household: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub village: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_members: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meter_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_date: Option<NaiveDate>,
}

impl std::fmt::Debug for RegistrationProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationProfile")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("full_name", &self.full_name)
            .field("email", &self.email)
            .field("phone_number", &self.phone_number)
            .field("role", &self.role)
            .field("national_id", &self.national_id.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}

impl RegistrationProfile {
    /// Check the profile against the backend's field rules.
    ///
    /// # Errors
    ///
    /// Returns the failing fields with their messages, in the same shape as
    /// the backend's validation error body.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        let username_len = self.username.chars().count();
        if username_len < 4 {
            push_error(&mut errors, "username", "Username must be at least 4 characters");
        } else if username_len > 50 {
            push_error(&mut errors, "username", "Username must be at most 50 characters");
        }
        if !self
            .username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            push_error(
                &mut errors,
                "username",
                "Username can only contain letters, numbers, and underscores",
            );
        }

        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            push_error(&mut errors, "password", "Password must be at least 8 characters");
        }
        if self.password != self.confirm_password {
            push_error(&mut errors, "confirm_password", "Passwords do not match");
        }

        if let Err(e) = Email::parse(&self.email) {
            push_error(&mut errors, "email", e.to_string());
        }
        if !is_phone_number(&self.phone_number) {
            push_error(&mut errors, "phone_number", "Phone number must be 10-15 digits");
        }

        if self.role == Role::Household {
            if !self.national_id.as_deref().is_some_and(is_national_id) {
                push_error(&mut errors, "national_id", "National ID must be 16 digits");
            }
            if self.address.as_deref().is_none_or(|a| a.trim().is_empty()) {
                push_error(&mut errors, "address", "Address is required");
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}
