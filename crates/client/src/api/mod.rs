//! Typed clients for the backend's resources.
//!
//! Every resource is a [`Collection`] over its record type; the record type
//! decides which operations exist:
//!
//! - every collection can be listed and fetched by id;
//! - [`Writable`] records can be created, replaced and deleted;
//! - [`Exportable`] records can be downloaded as CSV or PDF.
//!
//! Resource-specific actions (bill generation, receipts, notification
//! read-marking) live in the submodules as inherent methods on the concrete
//! collection type.
//!
//! ```no_run
//! # async fn demo(client: village_water_client::ApiClient) -> Result<(), village_water_client::ApiError> {
//! let pending = client.bills().list_where([("status", "Pending")]).await?;
//! let csv = client.households().export(village_water_client::api::ExportFormat::Csv).await?;
//! # Ok(()) }
//! ```

mod bills;
mod dashboard;
mod notifications;
mod payments;

pub use dashboard::Dashboard;

use std::fmt::Display;
use std::marker::PhantomData;

use serde::{Serialize, de::DeserializeOwned};
use village_water_core::{
    Bill, Household, Notification, Payment, SmsLogEntry, TariffRate, User, WaterUsage,
};

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::transport::Transport;

/// Records the backend lets clients create, replace and delete.
pub trait Writable: DeserializeOwned {}

/// Records the backend can export as a report.
pub trait Exportable: DeserializeOwned {}

impl Writable for User {}
impl Writable for Household {}
impl Writable for TariffRate {}
impl Writable for WaterUsage {}
impl Writable for Bill {}
impl Writable for Payment {}

impl Exportable for Household {}
impl Exportable for TariffRate {}
impl Exportable for WaterUsage {}
impl Exportable for Bill {}
impl Exportable for Payment {}

/// Report format for [`Collection::export`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Pdf,
}

impl ExportFormat {
    const fn action(self) -> &'static str {
        match self {
            Self::Csv => "export_csv",
            Self::Pdf => "export_pdf",
        }
    }

    /// Conventional file extension.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Pdf => "pdf",
        }
    }
}

/// A REST collection of `R` records under `path` (e.g. `/households/`).
pub struct Collection<'a, T, R> {
    client: &'a ApiClient<T>,
    path: &'static str,
    record: PhantomData<fn() -> R>,
}

impl<'a, T, R> Collection<'a, T, R> {
    const fn new(client: &'a ApiClient<T>, path: &'static str) -> Self {
        Self {
            client,
            path,
            record: PhantomData,
        }
    }

    /// The collection's path.
    #[must_use]
    pub const fn path(&self) -> &'static str {
        self.path
    }

    fn member(&self, id: impl Display) -> String {
        format!("{}{id}/", self.path)
    }

    fn action(&self, action: &str) -> String {
        format!("{}{action}/", self.path)
    }
}

impl<T: Transport, R: DeserializeOwned> Collection<'_, T, R> {
    /// All records visible to the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the body does not decode.
    pub async fn list(&self) -> Result<Vec<R>, ApiError> {
        self.list_where(Vec::<(String, String)>::new()).await
    }

    /// Records matching the backend's filter/search query parameters.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the body does not decode.
    pub async fn list_where<K, V>(
        &self,
        query: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Vec<R>, ApiError>
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.client.list(self.path, query).await
    }

    /// One record by id.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` with status 404 if there is no such
    /// record, or another `ApiError` if the request fails.
    pub async fn get(&self, id: impl Display) -> Result<R, ApiError> {
        self.client.get_json(&self.member(id)).await
    }
}

impl<T: Transport, R: Writable> Collection<'_, T, R> {
    /// Create a record from `body` and return it as stored.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` with the backend's field errors if the
    /// body is refused.
    pub async fn create<B: Serialize + ?Sized>(&self, body: &B) -> Result<R, ApiError> {
        self.client.post_json(self.path, body).await
    }

    /// Replace record `id` with `body`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` with the backend's field errors if the
    /// body is refused.
    pub async fn update<B: Serialize + ?Sized>(
        &self,
        id: impl Display,
        body: &B,
    ) -> Result<R, ApiError> {
        self.client.put_json(&self.member(id), body).await
    }

    /// Delete record `id`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    pub async fn delete(&self, id: impl Display) -> Result<(), ApiError> {
        self.client.delete(&self.member(id)).await
    }
}

impl<T: Transport, R: Exportable> Collection<'_, T, R> {
    /// Download a report of the collection.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails (staff-only on the backend).
    pub async fn export(&self, format: ExportFormat) -> Result<Vec<u8>, ApiError> {
        self.client.get_bytes(&self.action(format.action())).await
    }
}

impl<T: Transport> ApiClient<T> {
    /// User accounts (admin only).
    #[must_use]
    pub const fn users(&self) -> Collection<'_, T, User> {
        Collection::new(self, "/users/")
    }

    /// Households.
    #[must_use]
    pub const fn households(&self) -> Collection<'_, T, Household> {
        Collection::new(self, "/households/")
    }

    /// Tariff rates.
    #[must_use]
    pub const fn tariffs(&self) -> Collection<'_, T, TariffRate> {
        Collection::new(self, "/tariffs/")
    }

    /// Meter readings.
    #[must_use]
    pub const fn usage(&self) -> Collection<'_, T, WaterUsage> {
        Collection::new(self, "/usage/")
    }

    /// Bills.
    #[must_use]
    pub const fn bills(&self) -> Collection<'_, T, Bill> {
        Collection::new(self, "/bills/")
    }

    /// Payments.
    #[must_use]
    pub const fn payments(&self) -> Collection<'_, T, Payment> {
        Collection::new(self, "/payments/")
    }

    /// SMS delivery log (read-only).
    #[must_use]
    pub const fn sms(&self) -> Collection<'_, T, SmsLogEntry> {
        Collection::new(self, "/sms/")
    }

    /// The signed-in user's in-app notifications.
    #[must_use]
    pub const fn notifications(&self) -> Collection<'_, T, Notification> {
        Collection::new(self, "/notifications/")
    }

    /// Dashboard statistics and charts.
    #[must_use]
    pub const fn dashboard(&self) -> Dashboard<'_, T> {
        Dashboard::new(self)
    }
}
