//! Compensating transaction for a paid notification: the transaction is
//! reverted and the linked notification and meeting roll back with it.
//! Correlation runs through the transaction's stored notification id, never
//! through a status scan.

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use notifica_core::entities::{MeetingStatus, NotificationStatus, TransactionStatus};

use crate::Stores;

/// Refunds are only permitted this long after the transaction date.
pub const REFUND_WINDOW_HOURS: i64 = 24;

#[derive(Debug, Error)]
pub enum RefundError {
    #[error("transaction not found")]
    NotFound,
    #[error("transaction has not been paid")]
    NotPaid,
    #[error("transaction was already refunded")]
    AlreadyRefunded,
    #[error("refund window of {REFUND_WINDOW_HOURS} hours has expired")]
    WindowExpired,
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

#[derive(Debug, Clone)]
pub struct RefundReport {
    pub transaction_id: Uuid,
    pub notification_id: String,
    pub meeting_id: Option<Uuid>,
}

pub struct RefundCoordinator {
    stores: Stores,
}

impl RefundCoordinator {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    /// The three writes are independent; a failure mid-sequence leaves the
    /// earlier ones in place and surfaces the error. There is no saga here.
    pub async fn refund(
        &self,
        transaction_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<RefundReport, RefundError> {
        let Some(mut transaction) = self.stores.transactions.get(transaction_id).await? else {
            return Err(RefundError::NotFound);
        };

        match transaction.status {
            TransactionStatus::Refunded => return Err(RefundError::AlreadyRefunded),
            TransactionStatus::Paid => {}
            TransactionStatus::Pending | TransactionStatus::Failed => {
                return Err(RefundError::NotPaid);
            }
        }
        if now - transaction.date > Duration::hours(REFUND_WINDOW_HOURS) {
            return Err(RefundError::WindowExpired);
        }

        transaction.status = TransactionStatus::Refunded;
        let notification_id = transaction.notification_id.clone();
        self.stores.transactions.put(transaction).await?;

        let Some(mut notification) = self.stores.notifications.get(&notification_id).await? else {
            warn!("refunded transaction {transaction_id} references missing notification {notification_id}");
            return Ok(RefundReport {
                transaction_id,
                notification_id,
                meeting_id: None,
            });
        };

        // Roll the notification back to unpaid. Channel state and the
        // message-id correlation belong to the reverted send, so they go
        // too; a late webhook for the old send must not re-advance it.
        notification.status = NotificationStatus::AwaitingPayment;
        notification.payment_id = None;
        notification.paid_at = None;
        notification.email_status = None;
        notification.messaging_status = None;
        notification.provider_message_id = None;
        let host_uid = notification.sender_uid.clone();
        let guest_document = notification.recipient_document.clone();
        self.stores.notifications.put(notification).await?;

        let meetings = self
            .stores
            .meetings
            .find_by_participants(&host_uid, &guest_document)
            .await?;
        let mut meeting_id = None;
        if let Some(mut meeting) = meetings
            .into_iter()
            .find(|m| m.status == MeetingStatus::Scheduled)
        {
            meeting.status = MeetingStatus::Canceled;
            meeting_id = Some(meeting.id);
            self.stores.meetings.put(meeting).await?;
        }

        info!("transaction {transaction_id} refunded, notification {notification_id} reverted");
        Ok(RefundReport {
            transaction_id,
            notification_id,
            meeting_id,
        })
    }
}
