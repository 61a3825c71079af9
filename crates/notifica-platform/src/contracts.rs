//! Wire shapes for the inbound provider webhooks. Field names follow the
//! providers' payloads exactly; compatibility matters more than taste here.

use serde::{Deserialize, Serialize};

/// Payment gateway callback. The shared-secret token travels in a header,
/// not in the body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentWebhook {
    pub event: String,
    pub payment: PaymentWebhookPayment,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentWebhookPayment {
    pub id: String,
    #[serde(default)]
    pub external_reference: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub billing_type: Option<String>,
    #[serde(default)]
    pub payment_date: Option<String>,
}

/// Email provider delivery events arrive batched as an array of these.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailWebhookEvent {
    pub event: String,
    pub notification_id: String,
}

/// Messaging provider status callback. `status` is either a numeric code
/// or an enum-like string depending on the provider's webhook version.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagingWebhook {
    pub message_id: String,
    pub status: serde_json::Value,
}

/// Redis channels the services publish lifecycle events on.
pub mod channels {
    pub const NOTIFICATIONS_SENT: &str = "notifications.sent";
    pub const NOTIFICATIONS_DELIVERED: &str = "notifications.delivered";
    pub const NOTIFICATIONS_READ: &str = "notifications.read";
    pub const PAYMENTS_REFUNDED: &str = "payments.refunded";
    pub const MEETINGS_COMPLETED: &str = "meetings.completed";
}
