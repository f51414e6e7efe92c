//! Core types for the Village Water System.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod page;
pub mod period;
pub mod role;
pub mod status;
pub mod user;

pub use email::{Email, EmailError};
pub use id::*;
pub use page::ListResponse;
pub use period::{BillingPeriod, BillingPeriodError};
pub use role::{Capabilities, Role};
pub use status::*;
pub use user::User;
