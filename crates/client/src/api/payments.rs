//! Payment receipts.

use village_water_core::{Payment, PaymentId};

use super::Collection;
use crate::error::ApiError;
use crate::transport::Transport;

impl<T: Transport> Collection<'_, T, Payment> {
    /// Download the PDF receipt for a payment.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    pub async fn download_receipt(&self, id: PaymentId) -> Result<Vec<u8>, ApiError> {
        let path = format!("{}download_receipt/", self.member(id));
        self.client.get_bytes(&path).await
    }
}
