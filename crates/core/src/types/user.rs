//! The signed-in user's profile record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AccountStatus, Capabilities, Email, HouseholdId, HouseholdStatus, Role, UserId};

/// User profile as returned by the login, registration and current-user endpoints.
///
/// Household accounts additionally carry their household's id, code and status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Backend user id.
    pub user_id: UserId,
    /// Login name.
    pub username: String,
    /// Display name.
    #[serde(default)]
    pub full_name: String,
    /// Contact email.
    pub email: Email,
    /// Contact phone number.
    #[serde(default)]
    pub phone_number: Option<String>,
    /// Account role.
    pub role: Role,
    /// Account status.
    #[serde(default)]
    pub status: AccountStatus,
    /// When the account was created.
    #[serde(default)]
    pub created_date: Option<DateTime<Utc>>,
    /// Last successful login.
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
    /// Linked household (Household role only).
    #[serde(default)]
    pub household_id: Option<HouseholdId>,
    /// Linked household code, e.g. `HH-2025-0001` (Household role only).
    #[serde(default)]
    pub household_code: Option<String>,
    /// Linked household status (Household role only).
    #[serde(default)]
    pub household_status: Option<HouseholdStatus>,
}

impl User {
    /// Capability flags for this user.
    #[must_use]
    pub const fn capabilities(&self) -> Capabilities {
        Capabilities::for_role(self.role)
    }

    /// Name to show in headers and greetings.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.full_name.is_empty() {
            &self.username
        } else {
            &self.full_name
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_household_user() {
        let json = r#"{
            "user_id": 12,
            "username": "jdoe",
            "full_name": "Jean Doe",
            "email": "jdoe@village.rw",
            "phone_number": "0788123456",
            "role": "Household",
            "status": "Active",
            "created_date": "2025-01-05T08:30:00Z",
            "last_login": null,
            "household_code": "HH-2025-0003",
            "household_status": "Active",
            "household_id": 3
        }"#;

        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.user_id, UserId::new(12));
        assert_eq!(user.role, Role::Household);
        assert_eq!(user.household_id, Some(HouseholdId::new(3)));
        assert!(user.capabilities().is_household);
        assert_eq!(user.display_name(), "Jean Doe");
    }

    #[test]
    fn test_deserialize_minimal_staff_user() {
        let json = r#"{"user_id": 1, "username": "admin", "email": "admin@village.rw", "role": "Admin"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert!(user.household_id.is_none());
        assert!(user.capabilities().is_manager_or_admin);
        assert_eq!(user.display_name(), "admin");
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        let json = r#"{"user_id": 1, "username": "x", "email": "x@y.io", "role": "Root"}"#;
        assert!(serde_json::from_str::<User>(json).is_err());
    }
}
