use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Canonical progress state of a notification. Ordered; normal transitions
/// only ever advance, except the refund compensation back to
/// `AwaitingPayment`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum NotificationStatus {
    Created,
    AwaitingPayment,
    Sent,
    Delivered,
    Read,
}

impl NotificationStatus {
    pub fn progress(self) -> u8 {
        match self {
            NotificationStatus::Created => 0,
            NotificationStatus::AwaitingPayment => 1,
            NotificationStatus::Sent => 2,
            NotificationStatus::Delivered => 3,
            NotificationStatus::Read => 4,
        }
    }

    /// Monotonic advance: returns whichever of the two states is further
    /// along. Replayed or reordered events can never move a notification
    /// backwards through this.
    pub fn at_least(self, other: NotificationStatus) -> NotificationStatus {
        if other.progress() > self.progress() {
            other
        } else {
            self
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NotificationStatus::Created => "CREATED",
            NotificationStatus::AwaitingPayment => "AWAITING_PAYMENT",
            NotificationStatus::Sent => "SENT",
            NotificationStatus::Delivered => "DELIVERED",
            NotificationStatus::Read => "READ",
        }
    }

    pub fn parse(value: &str) -> anyhow::Result<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "CREATED" => Ok(NotificationStatus::Created),
            "AWAITING_PAYMENT" => Ok(NotificationStatus::AwaitingPayment),
            "SENT" => Ok(NotificationStatus::Sent),
            "DELIVERED" => Ok(NotificationStatus::Delivered),
            "READ" => Ok(NotificationStatus::Read),
            other => anyhow::bail!("unsupported notification status: {other}"),
        }
    }
}

/// Raw per-channel delivery state, kept separately from the canonical
/// status so a failed channel never hides progress made by another.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ChannelStatus {
    Failed,
    Delivered,
    Read,
}

impl ChannelStatus {
    fn rank(self) -> u8 {
        match self {
            ChannelStatus::Failed => 0,
            ChannelStatus::Delivered => 1,
            ChannelStatus::Read => 2,
        }
    }

    /// Merge an incoming channel event into the stored channel state.
    /// `Read` never downgrades to `Delivered`, and a late failure never
    /// erases progress already reported for the channel.
    pub fn merge(current: Option<ChannelStatus>, incoming: ChannelStatus) -> ChannelStatus {
        match current {
            Some(existing) if existing.rank() >= incoming.rank() => existing,
            _ => incoming,
        }
    }

    /// Canonical notification status implied by this channel state, if any.
    /// A channel failure implies nothing about overall progress.
    pub fn implied_notification_status(self) -> Option<NotificationStatus> {
        match self {
            ChannelStatus::Failed => None,
            ChannelStatus::Delivered => Some(NotificationStatus::Delivered),
            ChannelStatus::Read => Some(NotificationStatus::Read),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ChannelStatus::Failed => "FAILED",
            ChannelStatus::Delivered => "DELIVERED",
            ChannelStatus::Read => "READ",
        }
    }

    pub fn parse(value: &str) -> anyhow::Result<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "FAILED" => Ok(ChannelStatus::Failed),
            "DELIVERED" => Ok(ChannelStatus::Delivered),
            "READ" => Ok(ChannelStatus::Read),
            other => anyhow::bail!("unsupported channel status: {other}"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MeetingStatus {
    Canceled,
    Scheduled,
    Completed,
}

impl MeetingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MeetingStatus::Canceled => "CANCELED",
            MeetingStatus::Scheduled => "SCHEDULED",
            MeetingStatus::Completed => "COMPLETED",
        }
    }

    pub fn parse(value: &str) -> anyhow::Result<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "CANCELED" => Ok(MeetingStatus::Canceled),
            "SCHEDULED" => Ok(MeetingStatus::Scheduled),
            "COMPLETED" => Ok(MeetingStatus::Completed),
            other => anyhow::bail!("unsupported meeting status: {other}"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TransactionStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl TransactionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionStatus::Pending => "PENDING",
            TransactionStatus::Paid => "PAID",
            TransactionStatus::Failed => "FAILED",
            TransactionStatus::Refunded => "REFUNDED",
        }
    }

    pub fn parse(value: &str) -> anyhow::Result<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(TransactionStatus::Pending),
            "PAID" => Ok(TransactionStatus::Paid),
            "FAILED" => Ok(TransactionStatus::Failed),
            "REFUNDED" => Ok(TransactionStatus::Refunded),
            other => anyhow::bail!("unsupported transaction status: {other}"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub url: String,
    pub storage_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub sender_uid: String,
    pub sender_name: String,
    pub sender_email: String,
    pub recipient_name: String,
    pub recipient_email: String,
    /// Normalized CPF digits, used as the recipient-side lookup key.
    pub recipient_document: String,
    pub recipient_phone: Option<String>,
    pub subject: String,
    pub species: String,
    pub area: String,
    pub body: String,
    pub document_url: Option<String>,
    pub signature_url: Option<String>,
    pub attachments: Vec<Attachment>,
    pub created_at: DateTime<Utc>,
    pub status: NotificationStatus,
    pub payment_method: Option<String>,
    pub amount: Option<Decimal>,
    pub payment_id: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub email_status: Option<ChannelStatus>,
    pub messaging_status: Option<ChannelStatus>,
    /// Provider message id persisted at WhatsApp send time; messaging
    /// webhooks are correlated back to the notification through it.
    pub provider_message_id: Option<String>,
}

impl Notification {
    /// Draft and unpaid documents are private to the sender; they must not
    /// show up in recipient-document lookups.
    pub fn visible_to_recipient(&self) -> bool {
        self.status.progress() >= NotificationStatus::Sent.progress()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meeting {
    pub id: Uuid,
    pub host_uid: String,
    pub host_email: String,
    pub title: String,
    pub scheduled_date: NaiveDate,
    /// "HH:MM" as entered by the user; parsed leniently at sweep time.
    pub scheduled_time: String,
    pub guest_email: String,
    pub guest_document: String,
    pub conference_url: String,
    pub created_at: DateTime<Utc>,
    pub status: MeetingStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    /// Explicit correlation back to the notification that triggered the
    /// charge; refunds cascade through this, never through a status scan.
    pub notification_id: String,
    pub description: String,
    pub amount: Decimal,
    pub payment_method: String,
    pub date: DateTime<Utc>,
    pub status: TransactionStatus,
    /// Charge id assigned by the payment gateway.
    pub external_id: Option<String>,
}

pub fn new_notification_id() -> String {
    format!("NOT-{}", Uuid::new_v4().simple())
}

/// Strips a CPF down to its digits. Returns None unless exactly eleven
/// digits remain.
pub fn normalize_document(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() == 11 { Some(digits) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn notification_with_status(status: NotificationStatus) -> Notification {
        Notification {
            id: new_notification_id(),
            sender_uid: "user-1".into(),
            sender_name: "Ana Souza".into(),
            sender_email: "ana@example.com".into(),
            recipient_name: "Bruno Lima".into(),
            recipient_email: "bruno@example.com".into(),
            recipient_document: "12345678901".into(),
            recipient_phone: None,
            subject: "Cobrança".into(),
            species: "Notificação Extrajudicial".into(),
            area: "Cível".into(),
            body: "corpo".into(),
            document_url: None,
            signature_url: None,
            attachments: Vec::new(),
            created_at: Utc::now(),
            status,
            payment_method: None,
            amount: None,
            payment_id: None,
            paid_at: None,
            email_status: None,
            messaging_status: None,
            provider_message_id: None,
        }
    }

    #[test]
    fn drafts_and_unpaid_are_invisible_to_the_recipient() {
        for (status, visible) in [
            (NotificationStatus::Created, false),
            (NotificationStatus::AwaitingPayment, false),
            (NotificationStatus::Sent, true),
            (NotificationStatus::Delivered, true),
            (NotificationStatus::Read, true),
        ] {
            assert_eq!(
                notification_with_status(status).visible_to_recipient(),
                visible,
                "visibility for {}",
                status.as_str()
            );
        }
    }

    #[test]
    fn status_order_is_monotonic() {
        assert_eq!(
            NotificationStatus::Sent.at_least(NotificationStatus::Delivered),
            NotificationStatus::Delivered
        );
        assert_eq!(
            NotificationStatus::Read.at_least(NotificationStatus::Delivered),
            NotificationStatus::Read
        );
        assert_eq!(
            NotificationStatus::Created.at_least(NotificationStatus::Created),
            NotificationStatus::Created
        );
    }

    #[test]
    fn channel_merge_never_downgrades() {
        assert_eq!(
            ChannelStatus::merge(Some(ChannelStatus::Read), ChannelStatus::Delivered),
            ChannelStatus::Read
        );
        assert_eq!(
            ChannelStatus::merge(Some(ChannelStatus::Delivered), ChannelStatus::Failed),
            ChannelStatus::Delivered
        );
        assert_eq!(
            ChannelStatus::merge(None, ChannelStatus::Failed),
            ChannelStatus::Failed
        );
        assert_eq!(
            ChannelStatus::merge(Some(ChannelStatus::Delivered), ChannelStatus::Read),
            ChannelStatus::Read
        );
    }

    #[test]
    fn status_round_trips_through_text() {
        for status in [
            NotificationStatus::Created,
            NotificationStatus::AwaitingPayment,
            NotificationStatus::Sent,
            NotificationStatus::Delivered,
            NotificationStatus::Read,
        ] {
            assert_eq!(NotificationStatus::parse(status.as_str()).unwrap(), status);
        }
        assert!(NotificationStatus::parse("Lida").is_err());
    }

    #[test]
    fn document_normalization() {
        assert_eq!(
            normalize_document("123.456.789-01").as_deref(),
            Some("12345678901")
        );
        assert_eq!(normalize_document("123"), None);
        assert_eq!(normalize_document("123456789012"), None);
    }
}
