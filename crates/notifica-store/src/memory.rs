use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use notifica_core::entities::{Meeting, MeetingStatus, Notification, Transaction};
use notifica_core::storage::{MeetingStore, NotificationStore, TransactionStore};

/// Thread-safe in-memory store for all three entity kinds. Backs the test
/// suite and local development; production uses [`crate::PgEntityStore`].
#[derive(Default, Clone)]
pub struct InMemoryEntityStore {
    notifications: Arc<RwLock<HashMap<String, Notification>>>,
    meetings: Arc<RwLock<HashMap<Uuid, Meeting>>>,
    transactions: Arc<RwLock<HashMap<Uuid, Transaction>>>,
}

impl InMemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NotificationStore for InMemoryEntityStore {
    async fn put(&self, notification: Notification) -> anyhow::Result<()> {
        let mut notifications = self.notifications.write().await;
        notifications.insert(notification.id.clone(), notification);
        Ok(())
    }

    async fn get(&self, id: &str) -> anyhow::Result<Option<Notification>> {
        let notifications = self.notifications.read().await;
        Ok(notifications.get(id).cloned())
    }

    async fn delete(&self, id: &str) -> anyhow::Result<()> {
        let mut notifications = self.notifications.write().await;
        notifications.remove(id);
        Ok(())
    }

    async fn find_by_recipient_document(
        &self,
        document: &str,
    ) -> anyhow::Result<Vec<Notification>> {
        let notifications = self.notifications.read().await;
        let mut matches: Vec<Notification> = notifications
            .values()
            .filter(|n| n.recipient_document == document)
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matches)
    }

    async fn find_by_provider_message_id(
        &self,
        message_id: &str,
    ) -> anyhow::Result<Option<Notification>> {
        let notifications = self.notifications.read().await;
        Ok(notifications
            .values()
            .find(|n| n.provider_message_id.as_deref() == Some(message_id))
            .cloned())
    }
}

#[async_trait]
impl MeetingStore for InMemoryEntityStore {
    async fn put(&self, meeting: Meeting) -> anyhow::Result<()> {
        let mut meetings = self.meetings.write().await;
        meetings.insert(meeting.id, meeting);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Meeting>> {
        let meetings = self.meetings.read().await;
        Ok(meetings.get(&id).cloned())
    }

    async fn find_by_participants(
        &self,
        host_uid: &str,
        guest_document: &str,
    ) -> anyhow::Result<Vec<Meeting>> {
        let meetings = self.meetings.read().await;
        let mut matches: Vec<Meeting> = meetings
            .values()
            .filter(|m| m.host_uid == host_uid && m.guest_document == guest_document)
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matches)
    }

    async fn list_by_status(&self, status: MeetingStatus) -> anyhow::Result<Vec<Meeting>> {
        let meetings = self.meetings.read().await;
        Ok(meetings
            .values()
            .filter(|m| m.status == status)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl TransactionStore for InMemoryEntityStore {
    async fn put(&self, transaction: Transaction) -> anyhow::Result<()> {
        let mut transactions = self.transactions.write().await;
        transactions.insert(transaction.id, transaction);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Transaction>> {
        let transactions = self.transactions.read().await;
        Ok(transactions.get(&id).cloned())
    }

    async fn find_by_notification(
        &self,
        notification_id: &str,
    ) -> anyhow::Result<Option<Transaction>> {
        let transactions = self.transactions.read().await;
        // Latest by date, matching the Postgres lookup; a re-checkout after
        // a refund leaves two rows sharing one notification id.
        Ok(transactions
            .values()
            .filter(|t| t.notification_id == notification_id)
            .max_by_key(|t| t.date)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use notifica_core::entities::{NotificationStatus, TransactionStatus, new_notification_id};
    use rust_decimal::Decimal;

    fn sample_notification(document: &str) -> Notification {
        Notification {
            id: new_notification_id(),
            sender_uid: "user-1".into(),
            sender_name: "Ana Souza".into(),
            sender_email: "ana@example.com".into(),
            recipient_name: "Bruno Lima".into(),
            recipient_email: "bruno@example.com".into(),
            recipient_document: document.into(),
            recipient_phone: Some("5511999990000".into()),
            subject: "Cobrança".into(),
            species: "Notificação Extrajudicial".into(),
            area: "Cível".into(),
            body: "corpo".into(),
            document_url: None,
            signature_url: None,
            attachments: Vec::new(),
            created_at: Utc::now(),
            status: NotificationStatus::Created,
            payment_method: None,
            amount: None,
            payment_id: None,
            paid_at: None,
            email_status: None,
            messaging_status: None,
            provider_message_id: None,
        }
    }

    #[tokio::test]
    async fn put_get_delete_notification() {
        let store = InMemoryEntityStore::new();
        let notification = sample_notification("12345678901");
        let id = notification.id.clone();

        NotificationStore::put(&store, notification).await.unwrap();
        assert!(NotificationStore::get(&store, &id).await.unwrap().is_some());

        store.delete(&id).await.unwrap();
        assert!(NotificationStore::get(&store, &id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn lookup_by_provider_message_id() {
        let store = InMemoryEntityStore::new();
        let mut notification = sample_notification("12345678901");
        notification.provider_message_id = Some("zapi-msg-77".into());
        let id = notification.id.clone();
        NotificationStore::put(&store, notification).await.unwrap();

        let found = store
            .find_by_provider_message_id("zapi-msg-77")
            .await
            .unwrap();
        assert_eq!(found.map(|n| n.id), Some(id));
        assert!(
            store
                .find_by_provider_message_id("zapi-msg-00")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn lookup_by_recipient_document() {
        let store = InMemoryEntityStore::new();
        NotificationStore::put(&store, sample_notification("11122233344"))
            .await
            .unwrap();
        NotificationStore::put(&store, sample_notification("11122233344"))
            .await
            .unwrap();
        NotificationStore::put(&store, sample_notification("99988877766"))
            .await
            .unwrap();

        let matches = store
            .find_by_recipient_document("11122233344")
            .await
            .unwrap();
        assert_eq!(matches.len(), 2);
    }

    #[tokio::test]
    async fn transaction_lookup_by_notification() {
        let store = InMemoryEntityStore::new();
        let transaction = Transaction {
            id: Uuid::new_v4(),
            notification_id: "NOT-abc".into(),
            description: "Notificação Extrajudicial - Ref: NOT-abc".into(),
            amount: Decimal::new(4990, 2),
            payment_method: "PIX".into(),
            date: Utc::now(),
            status: TransactionStatus::Pending,
            external_id: None,
        };
        TransactionStore::put(&store, transaction).await.unwrap();

        let found = store.find_by_notification("NOT-abc").await.unwrap();
        assert!(found.is_some());
        assert!(store.find_by_notification("NOT-zzz").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn latest_transaction_wins_the_notification_lookup() {
        let store = InMemoryEntityStore::new();
        let now = Utc::now();

        let older = Transaction {
            id: Uuid::new_v4(),
            notification_id: "NOT-re".into(),
            description: "Notificação Extrajudicial - Ref: NOT-re".into(),
            amount: Decimal::new(4990, 2),
            payment_method: "PIX".into(),
            date: now - chrono::Duration::hours(2),
            status: TransactionStatus::Refunded,
            external_id: Some("charge-old".into()),
        };
        let newer = Transaction {
            id: Uuid::new_v4(),
            date: now,
            status: TransactionStatus::Pending,
            external_id: Some("charge-new".into()),
            ..older.clone()
        };
        let newer_id = newer.id;
        TransactionStore::put(&store, older).await.unwrap();
        TransactionStore::put(&store, newer).await.unwrap();

        let found = store.find_by_notification("NOT-re").await.unwrap().unwrap();
        assert_eq!(found.id, newer_id);
    }

    #[tokio::test]
    async fn meetings_by_status_and_participants() {
        let store = InMemoryEntityStore::new();
        let meeting = Meeting {
            id: Uuid::new_v4(),
            host_uid: "user-1".into(),
            host_email: "ana@example.com".into(),
            title: "Conciliação".into(),
            scheduled_date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            scheduled_time: "14:30".into(),
            guest_email: "bruno@example.com".into(),
            guest_document: "12345678901".into(),
            conference_url: "https://meet.example.com/x".into(),
            created_at: Utc::now(),
            status: MeetingStatus::Canceled,
        };
        MeetingStore::put(&store, meeting).await.unwrap();

        assert_eq!(store.list_by_status(MeetingStatus::Canceled).await.unwrap().len(), 1);
        assert!(store.list_by_status(MeetingStatus::Scheduled).await.unwrap().is_empty());
        assert_eq!(
            store
                .find_by_participants("user-1", "12345678901")
                .await
                .unwrap()
                .len(),
            1
        );
    }
}
