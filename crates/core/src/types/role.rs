//! Account roles and the capability flags derived from them.
//!
//! Every access decision in the workspace goes through [`Capabilities`].
//! Nothing else compares roles, so the mapping lives in exactly one place.

use serde::{Deserialize, Serialize};

use super::User;

/// Account role as sent by the backend (`"Admin"`, `"Manager"`, `"Household"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Role {
    /// Full access, including user management.
    Admin,
    /// Utility staff: households, readings, bills, payments, tariffs.
    Manager,
    /// A registered household; sees only its own data.
    #[default]
    Household,
}

impl Role {
    /// All roles, in the order the backend lists them.
    pub const ALL: [Self; 3] = [Self::Admin, Self::Manager, Self::Household];

    /// The wire name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Manager => "Manager",
            Self::Household => "Household",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("invalid role: {s} (expected Admin, Manager or Household)"))
    }
}

/// Capability flags derived from the current user's role.
///
/// Computed on demand from the user record; never stored, so a role change
/// is visible on the very next read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct Capabilities {
    /// A user is signed in.
    pub is_authenticated: bool,
    /// Role is `Admin`.
    pub is_admin: bool,
    /// Role is `Manager`.
    pub is_manager: bool,
    /// Role is `Household`.
    pub is_household: bool,
    /// Role is `Admin` or `Manager`.
    pub is_manager_or_admin: bool,
}

impl Capabilities {
    /// Derive the flags for an optional signed-in user.
    #[must_use]
    pub fn for_user(user: Option<&User>) -> Self {
        user.map_or_else(Self::default, |user| Self::for_role(user.role))
    }

    /// Derive the flags for a signed-in user with the given role.
    #[must_use]
    pub const fn for_role(role: Role) -> Self {
        let is_admin = matches!(role, Role::Admin);
        let is_manager = matches!(role, Role::Manager);
        Self {
            is_authenticated: true,
            is_admin,
            is_manager,
            is_household: matches!(role, Role::Household),
            is_manager_or_admin: is_admin || is_manager,
        }
    }
}
