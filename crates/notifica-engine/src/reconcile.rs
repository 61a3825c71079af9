//! Applies asynchronous provider events to the entity store, exactly once
//! per effective transition. Webhook push and manual poll both funnel into
//! [`Reconciler::apply_payment_event`]; duplicates and reordering are
//! absorbed by monotonic advance-to-at-least transitions.

use std::sync::{Arc, OnceLock};

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde_json::Value;
use tracing::{info, warn};

use notifica_core::entities::{ChannelStatus, MeetingStatus, NotificationStatus, TransactionStatus};
use notifica_core::normalize::{
    derive_canonical, email_event_status, is_payment_confirmation, messaging_event_status,
};
use notifica_providers::PaymentGateway;

use crate::Stores;

/// Literal marker embedded in the charge description at checkout time. Some
/// gateways drop arbitrary metadata; the reference token survives inside the
/// human-readable description as a fallback.
pub const REFERENCE_MARKER: &str = "Ref:";

fn reference_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"Ref:\s*(\S+)").expect("reference pattern is valid"))
}

/// Pulls the notification id back out of a free-text charge description.
pub fn extract_reference(description: &str) -> Option<String> {
    reference_pattern()
        .captures(description)
        .and_then(|captures| captures.get(1))
        .map(|token| token.as_str().to_string())
}

/// A payment lifecycle event, from either the webhook or the poll fallback.
#[derive(Debug, Clone)]
pub struct PaymentEvent {
    pub event: String,
    pub payment_id: String,
    pub external_reference: Option<String>,
    pub description: Option<String>,
    pub billing_type: Option<String>,
    pub payment_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    /// First confirmation: state advanced, outbound dispatch should fire.
    Confirmed { notification_id: String },
    /// Replay of an already-settled payment; accepted, nothing to do.
    AlreadySent { notification_id: String },
    /// Not a confirmation event; accepted and ignored.
    Ignored,
    /// No notification could be resolved; accepted no-op.
    Unresolved,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelOutcome {
    Updated {
        notification_id: String,
        status: NotificationStatus,
    },
    /// Event replay or out-of-order delivery; state already reflects it.
    NoChange { notification_id: String },
    /// No entity matched the correlation key; accepted no-op.
    NotFound,
    /// Unknown provider vocabulary; accepted and ignored.
    Ignored,
}

pub struct Reconciler {
    stores: Stores,
    payments: Arc<dyn PaymentGateway>,
}

impl Reconciler {
    pub fn new(stores: Stores, payments: Arc<dyn PaymentGateway>) -> Self {
        Self { stores, payments }
    }

    /// The single payment reconciliation entry point. Returns `Confirmed`
    /// only on the first effective confirmation, which is the caller's cue
    /// to fire outbound dispatch.
    pub async fn apply_payment_event(
        &self,
        event: &PaymentEvent,
    ) -> anyhow::Result<PaymentOutcome> {
        if !is_payment_confirmation(&event.event) {
            return Ok(PaymentOutcome::Ignored);
        }

        let resolved = event.external_reference.clone().or_else(|| {
            event
                .description
                .as_deref()
                .and_then(extract_reference)
        });
        let Some(notification_id) = resolved else {
            warn!(
                "payment {} carried no resolvable reference, dropping",
                event.payment_id
            );
            return Ok(PaymentOutcome::Unresolved);
        };

        let Some(mut notification) = self.stores.notifications.get(&notification_id).await? else {
            warn!(
                "payment {} references unknown notification {notification_id}, dropping",
                event.payment_id
            );
            return Ok(PaymentOutcome::Unresolved);
        };

        // Already-sent guard: a replayed confirmation must not re-dispatch.
        if notification.status.progress() >= NotificationStatus::Sent.progress() {
            return Ok(PaymentOutcome::AlreadySent { notification_id });
        }

        notification.status = notification.status.at_least(NotificationStatus::Sent);
        notification.payment_id = Some(event.payment_id.clone());
        notification.paid_at = Some(parse_payment_date(event.payment_date.as_deref()));
        if let Some(billing_type) = &event.billing_type {
            notification.payment_method = Some(billing_type.clone());
        }
        self.stores.notifications.put(notification.clone()).await?;
        info!("notification {notification_id} marked sent (payment {})", event.payment_id);

        // Settlement and meeting activation are attempted independently; a
        // failure in either must not block the other or the dispatch cue.
        if let Err(err) = self.settle_transaction(&notification_id, event).await {
            warn!("failed to settle transaction for {notification_id}: {err:#}");
        }
        if let Err(err) = self
            .activate_meeting(&notification.sender_uid, &notification.recipient_document)
            .await
        {
            warn!("failed to activate meeting for {notification_id}: {err:#}");
        }

        Ok(PaymentOutcome::Confirmed { notification_id })
    }

    /// Pull-side fallback: asks the gateway for the charge's current status
    /// and feeds it through the same reconciliation path as the webhook.
    /// Returns `None` when the notification has no charge to poll.
    pub async fn poll_payment(
        &self,
        notification_id: &str,
    ) -> anyhow::Result<Option<(String, PaymentOutcome)>> {
        let Some(transaction) = self
            .stores
            .transactions
            .find_by_notification(notification_id)
            .await?
        else {
            return Ok(None);
        };
        let Some(charge_id) = transaction.external_id.clone() else {
            return Ok(None);
        };

        let gateway_status = self
            .payments
            .get_charge_status(&charge_id)
            .await
            .map_err(anyhow::Error::from)?;

        let event = PaymentEvent {
            event: gateway_status.clone(),
            payment_id: charge_id,
            external_reference: Some(notification_id.to_string()),
            description: None,
            billing_type: None,
            payment_date: None,
        };
        let outcome = self.apply_payment_event(&event).await?;
        Ok(Some((gateway_status, outcome)))
    }

    pub async fn apply_email_event(
        &self,
        notification_id: &str,
        event: &str,
    ) -> anyhow::Result<ChannelOutcome> {
        let Some(incoming) = email_event_status(event) else {
            return Ok(ChannelOutcome::Ignored);
        };
        let Some(notification) = self.stores.notifications.get(notification_id).await? else {
            return Ok(ChannelOutcome::NotFound);
        };
        self.merge_channel_update(notification, Channel::Email, incoming)
            .await
    }

    pub async fn apply_messaging_event(
        &self,
        message_id: &str,
        status: &Value,
    ) -> anyhow::Result<ChannelOutcome> {
        let Some(incoming) = messaging_event_status(status) else {
            return Ok(ChannelOutcome::Ignored);
        };
        let Some(notification) = self
            .stores
            .notifications
            .find_by_provider_message_id(message_id)
            .await?
        else {
            return Ok(ChannelOutcome::NotFound);
        };
        self.merge_channel_update(notification, Channel::Messaging, incoming)
            .await
    }

    async fn merge_channel_update(
        &self,
        mut notification: notifica_core::entities::Notification,
        channel: Channel,
        incoming: ChannelStatus,
    ) -> anyhow::Result<ChannelOutcome> {
        let current = match channel {
            Channel::Email => notification.email_status,
            Channel::Messaging => notification.messaging_status,
        };
        let merged = ChannelStatus::merge(current, incoming);
        let canonical = derive_canonical(notification.status, merged);

        if current == Some(merged) && canonical == notification.status {
            return Ok(ChannelOutcome::NoChange {
                notification_id: notification.id,
            });
        }

        match channel {
            Channel::Email => notification.email_status = Some(merged),
            Channel::Messaging => notification.messaging_status = Some(merged),
        }
        notification.status = canonical;
        let notification_id = notification.id.clone();
        self.stores.notifications.put(notification).await?;

        Ok(ChannelOutcome::Updated {
            notification_id,
            status: canonical,
        })
    }

    async fn settle_transaction(
        &self,
        notification_id: &str,
        event: &PaymentEvent,
    ) -> anyhow::Result<()> {
        let Some(mut transaction) = self
            .stores
            .transactions
            .find_by_notification(notification_id)
            .await?
        else {
            anyhow::bail!("no transaction recorded for {notification_id}");
        };
        if transaction.status == TransactionStatus::Paid {
            return Ok(());
        }
        transaction.status = TransactionStatus::Paid;
        if transaction.external_id.is_none() {
            transaction.external_id = Some(event.payment_id.clone());
        }
        self.stores.transactions.put(transaction).await
    }

    async fn activate_meeting(
        &self,
        host_uid: &str,
        guest_document: &str,
    ) -> anyhow::Result<()> {
        let meetings = self
            .stores
            .meetings
            .find_by_participants(host_uid, guest_document)
            .await?;
        if let Some(mut meeting) = meetings
            .into_iter()
            .find(|m| m.status == MeetingStatus::Canceled)
        {
            meeting.status = MeetingStatus::Scheduled;
            let meeting_id = meeting.id;
            self.stores.meetings.put(meeting).await?;
            info!("meeting {meeting_id} scheduled");
        }
        Ok(())
    }
}

enum Channel {
    Email,
    Messaging,
}

fn parse_payment_date(raw: Option<&str>) -> DateTime<Utc> {
    raw.and_then(|value| NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .unwrap_or_else(Utc::now)
}
