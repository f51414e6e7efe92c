//! Payments against bills.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{FieldErrors, is_phone_number, push_error};
use crate::types::{BillId, PaymentId, PaymentMethod, PaymentStatus, UserId};

/// A recorded payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub payment_id: PaymentId,
    /// Generated by the backend, e.g. `RCP-202503-0012`.
    pub receipt_number: String,
    pub bill: BillId,
    #[serde(default)]
    pub bill_number: Option<String>,
    pub amount_paid: Decimal,
    pub payment_date: NaiveDate,
    pub payment_time: NaiveTime,
    pub payment_method: PaymentMethod,
    /// Generated by the backend when not supplied, e.g. `TXN-20250314-0002`.
    #[serde(default)]
    pub transaction_reference: Option<String>,
    pub payer_name: String,
    #[serde(default)]
    pub payer_phone: Option<String>,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub received_by: Option<UserId>,
    #[serde(default)]
    pub submitted_by: Option<UserId>,
    #[serde(default)]
    pub created_date: Option<DateTime<Utc>>,
}

/// Request body for recording a payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPayment {
    pub bill: BillId,
    pub amount_paid: Decimal,
    pub payment_date: NaiveDate,
    pub payment_time: NaiveTime,
    pub payment_method: PaymentMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_reference: Option<String>,
    pub payer_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payer_phone: Option<String>,
}

impl NewPayment {
    /// Check the payment before sending it.
    ///
    /// # Errors
    ///
    /// Returns the failing fields with their messages.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        if self.amount_paid <= Decimal::ZERO {
            push_error(&mut errors, "amount_paid", "Amount must be greater than zero");
        }
        if self.payer_name.trim().is_empty() {
            push_error(&mut errors, "payer_name", "This field is required");
        }
        if let Some(phone) = &self.payer_phone
            && !is_phone_number(phone)
        {
            push_error(&mut errors, "payer_phone", "Phone number must be 10-15 digits");
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_payment() {
        let json = r#"{
            "payment_id": 9,
            "receipt_number": "RCP-202503-0012",
            "bill": 7,
            "amount_paid": "1250.00",
            "payment_date": "2025-03-14",
            "payment_time": "09:41:00",
            "payment_method": "Mobile Money",
            "transaction_reference": "TXN-20250314-0002",
            "payer_name": "Jean Doe",
            "payer_phone": null,
            "payment_status": "Completed"
        }"#;
        let payment: Payment = serde_json::from_str(json).unwrap();
        assert_eq!(payment.payment_method, PaymentMethod::MobileMoney);
        assert_eq!(payment.amount_paid, Decimal::new(125_000, 2));
    }

    #[test]
    fn test_validate_payment() {
        let payment = NewPayment {
            bill: BillId::new(7),
            amount_paid: Decimal::ZERO,
            payment_date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            payment_time: NaiveTime::from_hms_opt(9, 41, 0).unwrap(),
            payment_method: PaymentMethod::Cash,
            transaction_reference: None,
            payer_name: " ".to_owned(),
            payer_phone: Some("123".to_owned()),
        };
        let errors = payment.validate().unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
