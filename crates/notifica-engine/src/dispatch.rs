//! Outbound delivery on payment confirmation. Channels run concurrently and
//! independently; no channel failure is surfaced to the paying user, only
//! logged and recorded on that channel's status field.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{info, warn};

use notifica_core::entities::{ChannelStatus, Notification};
use notifica_core::storage::NotificationStore;
use notifica_providers::{EmailProvider, MessagingProvider};

const DEFAULT_CHANNEL_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelDispatch {
    /// Channel not configured or recipient has no address for it.
    Skipped,
    Sent,
    /// Document send failed; the plain-text fallback went through.
    SentFallback,
    Failed(String),
}

impl ChannelDispatch {
    pub fn delivered_to_provider(&self) -> bool {
        matches!(self, ChannelDispatch::Sent | ChannelDispatch::SentFallback)
    }
}

#[derive(Debug, Clone)]
pub struct DispatchReport {
    pub email: ChannelDispatch,
    pub messaging: ChannelDispatch,
}

pub struct Dispatcher {
    notifications: Arc<dyn NotificationStore>,
    email: Option<Arc<dyn EmailProvider>>,
    messaging: Option<Arc<dyn MessagingProvider>>,
    channel_timeout: Duration,
}

impl Dispatcher {
    pub fn new(
        notifications: Arc<dyn NotificationStore>,
        email: Option<Arc<dyn EmailProvider>>,
        messaging: Option<Arc<dyn MessagingProvider>>,
    ) -> Self {
        Self {
            notifications,
            email,
            messaging,
            channel_timeout: DEFAULT_CHANNEL_TIMEOUT,
        }
    }

    pub fn with_channel_timeout(mut self, channel_timeout: Duration) -> Self {
        self.channel_timeout = channel_timeout;
        self
    }

    /// Fire both channels for a freshly confirmed notification. Best-effort
    /// throughout: the caller never needs to inspect the report, it exists
    /// for logging and tests.
    pub async fn dispatch(&self, notification: &Notification) -> DispatchReport {
        let (email, messaging) = tokio::join!(
            self.dispatch_email(notification),
            self.dispatch_messaging(notification),
        );
        let (messaging, provider_message_id) = messaging;

        match &email {
            ChannelDispatch::Skipped => {}
            ChannelDispatch::Failed(reason) => {
                warn!("email dispatch failed for {}: {reason}", notification.id)
            }
            _ => info!("email dispatched for {}", notification.id),
        }
        match &messaging {
            ChannelDispatch::Skipped => {}
            ChannelDispatch::Failed(reason) => {
                warn!("messaging dispatch failed for {}: {reason}", notification.id)
            }
            _ => info!("messaging dispatched for {}", notification.id),
        }

        if let Err(err) = self
            .record_outcome(&notification.id, &email, &messaging, provider_message_id)
            .await
        {
            warn!("failed to record dispatch outcome for {}: {err:#}", notification.id);
        }

        DispatchReport { email, messaging }
    }

    async fn dispatch_email(&self, notification: &Notification) -> ChannelDispatch {
        let Some(email) = &self.email else {
            return ChannelDispatch::Skipped;
        };
        if notification.recipient_email.trim().is_empty() {
            return ChannelDispatch::Skipped;
        }

        let subject = format!("{} - {}", notification.species, notification.subject);
        let html = render_email_html(notification);
        match timeout(
            self.channel_timeout,
            email.send(&notification.recipient_email, &subject, &html),
        )
        .await
        {
            Ok(Ok(())) => ChannelDispatch::Sent,
            Ok(Err(err)) => ChannelDispatch::Failed(err.to_string()),
            Err(_) => ChannelDispatch::Failed("email provider timed out".to_string()),
        }
    }

    async fn dispatch_messaging(
        &self,
        notification: &Notification,
    ) -> (ChannelDispatch, Option<String>) {
        let Some(messaging) = &self.messaging else {
            return (ChannelDispatch::Skipped, None);
        };
        let Some(phone) = notification
            .recipient_phone
            .as_deref()
            .filter(|p| !p.trim().is_empty())
        else {
            return (ChannelDispatch::Skipped, None);
        };

        let caption = render_caption(notification);

        if let Some(document_url) = notification.document_url.as_deref() {
            match timeout(
                self.channel_timeout,
                messaging.send_document(phone, document_url, &caption),
            )
            .await
            {
                Ok(Ok(message_id)) => return (ChannelDispatch::Sent, Some(message_id)),
                Ok(Err(err)) => {
                    warn!(
                        "document send failed for {}, falling back to text: {err}",
                        notification.id
                    );
                }
                Err(_) => {
                    warn!(
                        "document send timed out for {}, falling back to text",
                        notification.id
                    );
                }
            }
        }

        // Fallback path: same content as plain text plus an explicit link.
        let fallback = render_fallback_text(notification);
        match timeout(self.channel_timeout, messaging.send_text(phone, &fallback)).await {
            Ok(Ok(message_id)) => (ChannelDispatch::SentFallback, Some(message_id)),
            Ok(Err(err)) => (ChannelDispatch::Failed(err.to_string()), None),
            Err(_) => (
                ChannelDispatch::Failed("messaging provider timed out".to_string()),
                None,
            ),
        }
    }

    /// Re-reads the notification before writing so concurrent webhook
    /// updates are not clobbered, then records the provider message id and
    /// any channel failure.
    async fn record_outcome(
        &self,
        notification_id: &str,
        email: &ChannelDispatch,
        messaging: &ChannelDispatch,
        provider_message_id: Option<String>,
    ) -> anyhow::Result<()> {
        let Some(mut notification) = self.notifications.get(notification_id).await? else {
            return Ok(());
        };

        if let Some(message_id) = provider_message_id {
            notification.provider_message_id = Some(message_id);
        }
        if let ChannelDispatch::Failed(_) = email {
            notification.email_status =
                Some(ChannelStatus::merge(notification.email_status, ChannelStatus::Failed));
        }
        if let ChannelDispatch::Failed(_) = messaging {
            notification.messaging_status = Some(ChannelStatus::merge(
                notification.messaging_status,
                ChannelStatus::Failed,
            ));
        }

        self.notifications.put(notification).await
    }
}

/// Partially masks a normalized CPF: only the middle digits stay readable.
pub fn mask_document(document: &str) -> String {
    let digits: Vec<char> = document.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() != 11 {
        return "***.***.***-**".to_string();
    }
    let middle: String = digits[3..6].iter().collect();
    let next: String = digits[6..9].iter().collect();
    format!("***.{middle}.{next}-**")
}

fn render_email_html(notification: &Notification) -> String {
    let masked = mask_document(&notification.recipient_document);
    let document_link = notification
        .document_url
        .as_deref()
        .map(|url| format!("<p><a href=\"{url}\">Acessar documento</a></p>"))
        .unwrap_or_default();
    format!(
        "<p>Olá, {recipient},</p>\
         <p>Você recebeu uma {species} enviada por {sender}, destinada ao CPF {masked}.</p>\
         <p><strong>Assunto:</strong> {subject}</p>\
         {document_link}\
         <p>{body}</p>",
        recipient = notification.recipient_name,
        species = notification.species,
        sender = notification.sender_name,
        subject = notification.subject,
        body = notification.body,
    )
}

fn render_caption(notification: &Notification) -> String {
    format!(
        "Olá, {recipient}. Você recebeu uma {species} enviada por {sender}, destinada ao CPF {masked}. Assunto: {subject}.",
        recipient = notification.recipient_name,
        species = notification.species,
        sender = notification.sender_name,
        masked = mask_document(&notification.recipient_document),
        subject = notification.subject,
    )
}

fn render_fallback_text(notification: &Notification) -> String {
    let mut message = render_caption(notification);
    if let Some(url) = notification.document_url.as_deref() {
        message.push_str(&format!(" Acesse o documento em: {url}"));
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_all_but_the_middle_digits() {
        assert_eq!(mask_document("12345678901"), "***.456.789-**");
        assert_eq!(mask_document("123.456.789-01"), "***.456.789-**");
        assert_eq!(mask_document("123"), "***.***.***-**");
    }
}
