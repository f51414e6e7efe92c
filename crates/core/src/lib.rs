//! Village Water System Core - Shared types library.
//!
//! This crate provides common types used across all Village Water System components:
//! - `client` - Session store, authenticated API client, auth session and route guard
//! - `cli` - Command-line front end over the client
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no storage.
//! Everything here is a value the backend sends or accepts, plus the pure
//! role-to-capability mapping that every access decision goes through.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, emails, roles, capabilities, statuses and billing periods
//! - [`records`] - Domain records exchanged with the backend (households, bills, ...)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod records;
pub mod types;

pub use records::*;
pub use types::*;
