//! Domain records exchanged with the backend.
//!
//! Read types mirror the backend's JSON field-for-field; `New*` types are
//! request bodies for create/update calls. Monetary amounts and meter
//! readings use [`rust_decimal::Decimal`] (the backend sends them as
//! decimal strings).

pub mod bill;
pub mod dashboard;
pub mod household;
pub mod notification;
pub mod payment;
pub mod registration;
pub mod tariff;
pub mod usage;

pub use bill::*;
pub use dashboard::*;
pub use household::*;
pub use notification::*;
pub use payment::*;
pub use registration::*;
pub use tariff::*;
pub use usage::*;

use std::collections::BTreeMap;

/// Field-level validation messages, keyed by field name.
///
/// Same shape as the backend's validation error bodies
/// (`{"username": ["..."], "national_id": ["..."]}`), so callers can map
/// local and remote failures onto form fields the same way.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

pub(crate) fn push_error(errors: &mut FieldErrors, field: &str, message: impl Into<String>) {
    errors
        .entry(field.to_owned())
        .or_default()
        .push(message.into());
}

pub(crate) fn is_phone_number(value: &str) -> bool {
    (10..=15).contains(&value.len()) && value.chars().all(|c| c.is_ascii_digit())
}

pub(crate) fn is_national_id(value: &str) -> bool {
    value.len() == 16 && value.chars().all(|c| c.is_ascii_digit())
}
