//! Notification read-marking.

use village_water_core::{Notification, NotificationId, UnreadCount};

use super::Collection;
use crate::error::ApiError;
use crate::transport::Transport;

impl<T: Transport> Collection<'_, T, Notification> {
    /// Number of unread notifications.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    pub async fn unread_count(&self) -> Result<u64, ApiError> {
        let body: UnreadCount = self.client.get_json(&self.action("unread_count")).await?;
        Ok(body.count)
    }

    /// Mark one notification as read.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    pub async fn mark_read(&self, id: NotificationId) -> Result<(), ApiError> {
        let path = format!("{}mark_read/", self.member(id));
        self.client.post_empty(&path).await
    }

    /// Mark every notification as read.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    pub async fn mark_all_read(&self) -> Result<(), ApiError> {
        self.client.post_empty(&self.action("mark_all_read")).await
    }
}
