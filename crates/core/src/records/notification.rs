//! SMS log entries and in-app notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{NotificationId, NotificationKind, SmsId, SmsKind, SmsStatus, UserId};

/// One SMS the backend attempted to send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsLogEntry {
    pub sms_id: SmsId,
    pub phone_number: String,
    pub message: String,
    #[serde(default)]
    pub notification_type: SmsKind,
    #[serde(default)]
    pub status: SmsStatus,
    #[serde(default)]
    pub error_message: Option<String>,
    pub sent_at: DateTime<Utc>,
}

/// An in-app notification for the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub notification_id: NotificationId,
    pub user: UserId,
    pub notification_type: NotificationKind,
    pub title: String,
    pub message: String,
    /// In-app path the notification points at, e.g. `/billing`.
    #[serde(default)]
    pub link: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Body of `GET /notifications/unread_count/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnreadCount {
    pub count: u64,
}
