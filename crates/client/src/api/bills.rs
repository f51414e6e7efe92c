//! Bill generation.

use reqwest::StatusCode;
use tracing::instrument;
use village_water_core::{Bill, BillGenerationOutcome, BillGenerationRequest};

use super::Collection;
use crate::error::ApiError;
use crate::transport::{ApiRequest, Transport};

impl<T: Transport> Collection<'_, T, Bill> {
    /// Generate bills for a billing period from the recorded meter readings.
    ///
    /// Build `request` with [`BillGenerationRequest::for_user`] so household
    /// accounts are pinned to their own household.
    ///
    /// The backend answers `400` when no bill could be created, with the
    /// same body as a success; that case is returned as an outcome with no
    /// bills and the per-household reasons in `errors`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` if the request itself is refused (no
    /// active tariff, forbidden household), or another `ApiError` if the
    /// request fails.
    #[instrument(skip(self, request), fields(period = %request.billing_period))]
    pub async fn generate(
        &self,
        request: &BillGenerationRequest,
    ) -> Result<BillGenerationOutcome, ApiError> {
        let path = self.action("generate_bills");
        let outcome = match self.client.send(ApiRequest::post(path).json(request)?).await {
            Ok(response) => response.json::<BillGenerationOutcome>()?,
            Err(ApiError::Validation { status, body })
                if status == StatusCode::BAD_REQUEST && is_outcome(&body) =>
            {
                serde_json::from_value(body)?
            }
            Err(e) => return Err(e),
        };

        tracing::info!(
            created = outcome.bills.len(),
            skipped = outcome.errors.len(),
            "Bill generation finished"
        );
        Ok(outcome)
    }
}

fn is_outcome(body: &serde_json::Value) -> bool {
    body.get("bills").is_some_and(serde_json::Value::is_array)
        && body.get("errors").is_some_and(serde_json::Value::is_array)
}
