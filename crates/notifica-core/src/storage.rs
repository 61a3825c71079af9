use async_trait::async_trait;
use uuid::Uuid;

use crate::entities::{Meeting, MeetingStatus, Notification, Transaction};

/// Durable storage for notifications. `put` replaces the whole record;
/// callers read, mutate, then write back.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn put(&self, notification: Notification) -> anyhow::Result<()>;
    async fn get(&self, id: &str) -> anyhow::Result<Option<Notification>>;
    async fn delete(&self, id: &str) -> anyhow::Result<()>;
    /// Recipient-side lookup by normalized document number. Returns every
    /// match regardless of status; visibility filtering is the caller's job.
    async fn find_by_recipient_document(
        &self,
        document: &str,
    ) -> anyhow::Result<Vec<Notification>>;
    /// Correlation lookup for messaging webhooks. At most one match is
    /// expected; none is a valid outcome, not an error.
    async fn find_by_provider_message_id(
        &self,
        message_id: &str,
    ) -> anyhow::Result<Option<Notification>>;
}

#[async_trait]
pub trait MeetingStore: Send + Sync {
    async fn put(&self, meeting: Meeting) -> anyhow::Result<()>;
    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Meeting>>;
    /// Correlation lookup by host + guest identity pair.
    async fn find_by_participants(
        &self,
        host_uid: &str,
        guest_document: &str,
    ) -> anyhow::Result<Vec<Meeting>>;
    async fn list_by_status(&self, status: MeetingStatus) -> anyhow::Result<Vec<Meeting>>;
}

#[async_trait]
pub trait TransactionStore: Send + Sync {
    async fn put(&self, transaction: Transaction) -> anyhow::Result<()>;
    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Transaction>>;
    async fn find_by_notification(
        &self,
        notification_id: &str,
    ) -> anyhow::Result<Option<Transaction>>;
}
