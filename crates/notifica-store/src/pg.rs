use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use notifica_core::entities::{
    Attachment, ChannelStatus, Meeting, MeetingStatus, Notification, NotificationStatus,
    Transaction, TransactionStatus,
};
use notifica_core::storage::{MeetingStore, NotificationStore, TransactionStore};

/// Postgres-backed entity store. Statuses are stored as their canonical
/// text tags; attachments ride along as a JSONB column.
#[derive(Clone)]
pub struct PgEntityStore {
    pool: PgPool,
}

impl PgEntityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn notification_from_row(row: &PgRow) -> anyhow::Result<Notification> {
        let status_raw: String = row.try_get("status")?;
        let email_status_raw: Option<String> = row.try_get("email_status")?;
        let messaging_status_raw: Option<String> = row.try_get("messaging_status")?;
        let attachments_raw: serde_json::Value = row.try_get("attachments")?;

        Ok(Notification {
            id: row.try_get("id")?,
            sender_uid: row.try_get("sender_uid")?,
            sender_name: row.try_get("sender_name")?,
            sender_email: row.try_get("sender_email")?,
            recipient_name: row.try_get("recipient_name")?,
            recipient_email: row.try_get("recipient_email")?,
            recipient_document: row.try_get("recipient_document")?,
            recipient_phone: row.try_get("recipient_phone")?,
            subject: row.try_get("subject")?,
            species: row.try_get("species")?,
            area: row.try_get("area")?,
            body: row.try_get("body")?,
            document_url: row.try_get("document_url")?,
            signature_url: row.try_get("signature_url")?,
            attachments: serde_json::from_value::<Vec<Attachment>>(attachments_raw)?,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
            status: NotificationStatus::parse(&status_raw)?,
            payment_method: row.try_get("payment_method")?,
            amount: row.try_get::<Option<Decimal>, _>("amount")?,
            payment_id: row.try_get("payment_id")?,
            paid_at: row.try_get::<Option<DateTime<Utc>>, _>("paid_at")?,
            email_status: email_status_raw
                .as_deref()
                .map(ChannelStatus::parse)
                .transpose()?,
            messaging_status: messaging_status_raw
                .as_deref()
                .map(ChannelStatus::parse)
                .transpose()?,
            provider_message_id: row.try_get("provider_message_id")?,
        })
    }

    fn meeting_from_row(row: &PgRow) -> anyhow::Result<Meeting> {
        let status_raw: String = row.try_get("status")?;
        Ok(Meeting {
            id: row.try_get("id")?,
            host_uid: row.try_get("host_uid")?,
            host_email: row.try_get("host_email")?,
            title: row.try_get("title")?,
            scheduled_date: row.try_get::<NaiveDate, _>("scheduled_date")?,
            scheduled_time: row.try_get("scheduled_time")?,
            guest_email: row.try_get("guest_email")?,
            guest_document: row.try_get("guest_document")?,
            conference_url: row.try_get("conference_url")?,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
            status: MeetingStatus::parse(&status_raw)?,
        })
    }

    fn transaction_from_row(row: &PgRow) -> anyhow::Result<Transaction> {
        let status_raw: String = row.try_get("status")?;
        Ok(Transaction {
            id: row.try_get("id")?,
            notification_id: row.try_get("notification_id")?,
            description: row.try_get("description")?,
            amount: row.try_get("amount")?,
            payment_method: row.try_get("payment_method")?,
            date: row.try_get::<DateTime<Utc>, _>("date")?,
            status: TransactionStatus::parse(&status_raw)?,
            external_id: row.try_get("external_id")?,
        })
    }
}

const NOTIFICATION_COLUMNS: &str = "id, sender_uid, sender_name, sender_email, recipient_name, \
     recipient_email, recipient_document, recipient_phone, subject, species, area, body, \
     document_url, signature_url, attachments, created_at, status, payment_method, amount, \
     payment_id, paid_at, email_status, messaging_status, provider_message_id";

#[async_trait]
impl NotificationStore for PgEntityStore {
    async fn put(&self, notification: Notification) -> anyhow::Result<()> {
        let attachments = serde_json::to_value(&notification.attachments)?;
        sqlx::query(
            r#"
            INSERT INTO notifications (
                id, sender_uid, sender_name, sender_email, recipient_name, recipient_email,
                recipient_document, recipient_phone, subject, species, area, body,
                document_url, signature_url, attachments, created_at, status, payment_method,
                amount, payment_id, paid_at, email_status, messaging_status, provider_message_id
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12,
                $13, $14, $15, $16, $17, $18, $19, $20, $21, $22, $23, $24
            )
            ON CONFLICT (id)
            DO UPDATE SET
                recipient_phone = EXCLUDED.recipient_phone,
                subject = EXCLUDED.subject,
                body = EXCLUDED.body,
                document_url = EXCLUDED.document_url,
                signature_url = EXCLUDED.signature_url,
                attachments = EXCLUDED.attachments,
                status = EXCLUDED.status,
                payment_method = EXCLUDED.payment_method,
                amount = EXCLUDED.amount,
                payment_id = EXCLUDED.payment_id,
                paid_at = EXCLUDED.paid_at,
                email_status = EXCLUDED.email_status,
                messaging_status = EXCLUDED.messaging_status,
                provider_message_id = EXCLUDED.provider_message_id
            "#,
        )
        .bind(&notification.id)
        .bind(&notification.sender_uid)
        .bind(&notification.sender_name)
        .bind(&notification.sender_email)
        .bind(&notification.recipient_name)
        .bind(&notification.recipient_email)
        .bind(&notification.recipient_document)
        .bind(&notification.recipient_phone)
        .bind(&notification.subject)
        .bind(&notification.species)
        .bind(&notification.area)
        .bind(&notification.body)
        .bind(&notification.document_url)
        .bind(&notification.signature_url)
        .bind(attachments)
        .bind(notification.created_at)
        .bind(notification.status.as_str())
        .bind(&notification.payment_method)
        .bind(notification.amount)
        .bind(&notification.payment_id)
        .bind(notification.paid_at)
        .bind(notification.email_status.map(ChannelStatus::as_str))
        .bind(notification.messaging_status.map(ChannelStatus::as_str))
        .bind(&notification.provider_message_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, id: &str) -> anyhow::Result<Option<Notification>> {
        let row = sqlx::query(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::notification_from_row).transpose()
    }

    async fn delete(&self, id: &str) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM notifications WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_by_recipient_document(
        &self,
        document: &str,
    ) -> anyhow::Result<Vec<Notification>> {
        let rows = sqlx::query(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications \
             WHERE recipient_document = $1 ORDER BY created_at DESC"
        ))
        .bind(document)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::notification_from_row).collect()
    }

    async fn find_by_provider_message_id(
        &self,
        message_id: &str,
    ) -> anyhow::Result<Option<Notification>> {
        let row = sqlx::query(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications \
             WHERE provider_message_id = $1 LIMIT 1"
        ))
        .bind(message_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::notification_from_row).transpose()
    }
}

const MEETING_COLUMNS: &str = "id, host_uid, host_email, title, scheduled_date, scheduled_time, \
     guest_email, guest_document, conference_url, created_at, status";

#[async_trait]
impl MeetingStore for PgEntityStore {
    async fn put(&self, meeting: Meeting) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO meetings (
                id, host_uid, host_email, title, scheduled_date, scheduled_time,
                guest_email, guest_document, conference_url, created_at, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (id)
            DO UPDATE SET
                title = EXCLUDED.title,
                scheduled_date = EXCLUDED.scheduled_date,
                scheduled_time = EXCLUDED.scheduled_time,
                conference_url = EXCLUDED.conference_url,
                status = EXCLUDED.status
            "#,
        )
        .bind(meeting.id)
        .bind(&meeting.host_uid)
        .bind(&meeting.host_email)
        .bind(&meeting.title)
        .bind(meeting.scheduled_date)
        .bind(&meeting.scheduled_time)
        .bind(&meeting.guest_email)
        .bind(&meeting.guest_document)
        .bind(&meeting.conference_url)
        .bind(meeting.created_at)
        .bind(meeting.status.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Meeting>> {
        let row = sqlx::query(&format!(
            "SELECT {MEETING_COLUMNS} FROM meetings WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::meeting_from_row).transpose()
    }

    async fn find_by_participants(
        &self,
        host_uid: &str,
        guest_document: &str,
    ) -> anyhow::Result<Vec<Meeting>> {
        let rows = sqlx::query(&format!(
            "SELECT {MEETING_COLUMNS} FROM meetings \
             WHERE host_uid = $1 AND guest_document = $2 ORDER BY created_at DESC"
        ))
        .bind(host_uid)
        .bind(guest_document)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::meeting_from_row).collect()
    }

    async fn list_by_status(&self, status: MeetingStatus) -> anyhow::Result<Vec<Meeting>> {
        let rows = sqlx::query(&format!(
            "SELECT {MEETING_COLUMNS} FROM meetings WHERE status = $1"
        ))
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::meeting_from_row).collect()
    }
}

const TRANSACTION_COLUMNS: &str =
    "id, notification_id, description, amount, payment_method, date, status, external_id";

#[async_trait]
impl TransactionStore for PgEntityStore {
    async fn put(&self, transaction: Transaction) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO transactions (
                id, notification_id, description, amount, payment_method, date, status, external_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id)
            DO UPDATE SET
                status = EXCLUDED.status,
                external_id = EXCLUDED.external_id
            "#,
        )
        .bind(transaction.id)
        .bind(&transaction.notification_id)
        .bind(&transaction.description)
        .bind(transaction.amount)
        .bind(&transaction.payment_method)
        .bind(transaction.date)
        .bind(transaction.status.as_str())
        .bind(&transaction.external_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Transaction>> {
        let row = sqlx::query(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::transaction_from_row).transpose()
    }

    async fn find_by_notification(
        &self,
        notification_id: &str,
    ) -> anyhow::Result<Option<Transaction>> {
        let row = sqlx::query(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions \
             WHERE notification_id = $1 ORDER BY date DESC LIMIT 1"
        ))
        .bind(notification_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::transaction_from_row).transpose()
    }
}
