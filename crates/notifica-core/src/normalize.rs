//! Maps provider-specific status vocabularies onto the canonical enums.
//! Provider wording stops at this boundary; nothing downstream ever sees a
//! raw event name.

use serde_json::Value;

use crate::entities::{ChannelStatus, NotificationStatus};

/// Email provider event names ("delivered", "open", "click", "bounce",
/// "dropped") mapped to channel state. Unknown events are ignored rather
/// than rejected so new provider vocabulary cannot break reconciliation.
pub fn email_event_status(event: &str) -> Option<ChannelStatus> {
    match event.trim().to_ascii_lowercase().as_str() {
        "delivered" => Some(ChannelStatus::Delivered),
        "open" | "click" => Some(ChannelStatus::Read),
        "bounce" | "dropped" => Some(ChannelStatus::Failed),
        _ => None,
    }
}

/// Messaging provider status codes arrive either as numbers or strings
/// (3/"DELIVERED", 4/"READ") depending on the webhook version.
pub fn messaging_event_status(raw: &Value) -> Option<ChannelStatus> {
    let code = match raw {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_ascii_uppercase(),
        _ => return None,
    };
    match code.as_str() {
        "3" | "DELIVERED" | "RECEIVED" => Some(ChannelStatus::Delivered),
        "4" | "READ" => Some(ChannelStatus::Read),
        _ => None,
    }
}

/// Payment gateway events that count as a confirmed settlement. Everything
/// else in the payment lifecycle is acknowledged and ignored.
pub fn is_payment_confirmation(event: &str) -> bool {
    matches!(
        event.trim().to_ascii_uppercase().as_str(),
        "CONFIRMED" | "RECEIVED" | "PAYMENT_CONFIRMED" | "PAYMENT_RECEIVED"
    )
}

/// Canonical status derived from a channel update: the maximum of the
/// current canonical status and whatever the channel implies.
pub fn derive_canonical(
    current: NotificationStatus,
    channel: ChannelStatus,
) -> NotificationStatus {
    match channel.implied_notification_status() {
        Some(implied) => current.at_least(implied),
        None => current,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn email_vocabulary() {
        assert_eq!(email_event_status("delivered"), Some(ChannelStatus::Delivered));
        assert_eq!(email_event_status("open"), Some(ChannelStatus::Read));
        assert_eq!(email_event_status("click"), Some(ChannelStatus::Read));
        assert_eq!(email_event_status("bounce"), Some(ChannelStatus::Failed));
        assert_eq!(email_event_status("dropped"), Some(ChannelStatus::Failed));
        assert_eq!(email_event_status("processed"), None);
    }

    #[test]
    fn messaging_vocabulary_accepts_numbers_and_strings() {
        assert_eq!(messaging_event_status(&json!(3)), Some(ChannelStatus::Delivered));
        assert_eq!(messaging_event_status(&json!("3")), Some(ChannelStatus::Delivered));
        assert_eq!(messaging_event_status(&json!("DELIVERED")), Some(ChannelStatus::Delivered));
        assert_eq!(messaging_event_status(&json!(4)), Some(ChannelStatus::Read));
        assert_eq!(messaging_event_status(&json!("read")), Some(ChannelStatus::Read));
        assert_eq!(messaging_event_status(&json!(7)), None);
        assert_eq!(messaging_event_status(&json!(null)), None);
    }

    #[test]
    fn payment_confirmation_vocabulary() {
        assert!(is_payment_confirmation("PAYMENT_CONFIRMED"));
        assert!(is_payment_confirmation("PAYMENT_RECEIVED"));
        assert!(is_payment_confirmation("confirmed"));
        assert!(is_payment_confirmation("RECEIVED"));
        assert!(!is_payment_confirmation("PAYMENT_OVERDUE"));
        assert!(!is_payment_confirmation("PAYMENT_CREATED"));
    }

    #[test]
    fn canonical_derivation_never_regresses() {
        assert_eq!(
            derive_canonical(NotificationStatus::Sent, ChannelStatus::Delivered),
            NotificationStatus::Delivered
        );
        assert_eq!(
            derive_canonical(NotificationStatus::Read, ChannelStatus::Delivered),
            NotificationStatus::Read
        );
        assert_eq!(
            derive_canonical(NotificationStatus::Sent, ChannelStatus::Read),
            NotificationStatus::Read
        );
        assert_eq!(
            derive_canonical(NotificationStatus::Delivered, ChannelStatus::Failed),
            NotificationStatus::Delivered
        );
    }
}
