//! Dashboard statistics.

use village_water_core::{DashboardCharts, DashboardStats};

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::transport::Transport;

/// Dashboard endpoints.
///
/// Household accounts get figures scoped to their own household.
pub struct Dashboard<'a, T> {
    client: &'a ApiClient<T>,
}

impl<'a, T> Dashboard<'a, T> {
    pub(super) const fn new(client: &'a ApiClient<T>) -> Self {
        Self { client }
    }
}

impl<T: Transport> Dashboard<'_, T> {
    /// Headline statistics.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    pub async fn stats(&self) -> Result<DashboardStats, ApiError> {
        self.client.get_json("/dashboard/stats/").await
    }

    /// Revenue trend, bill status breakdown and top consumers.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    pub async fn charts(&self) -> Result<DashboardCharts, ApiError> {
        self.client.get_json("/dashboard/charts/").await
    }
}
