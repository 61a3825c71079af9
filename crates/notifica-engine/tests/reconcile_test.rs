mod common;

use std::sync::Arc;

use serde_json::json;

use common::{MockPaymentGateway, notification, stores, transaction};
use notifica_core::entities::{NotificationStatus, TransactionStatus};
use notifica_core::storage::{NotificationStore, TransactionStore};
use notifica_engine::reconcile::{ChannelOutcome, PaymentEvent, PaymentOutcome, Reconciler};

fn confirmation(notification_id: &str) -> PaymentEvent {
    PaymentEvent {
        event: "PAYMENT_CONFIRMED".to_string(),
        payment_id: "pay-1".to_string(),
        external_reference: Some(notification_id.to_string()),
        description: None,
        billing_type: Some("PIX".to_string()),
        payment_date: Some("2026-08-20".to_string()),
    }
}

#[tokio::test]
async fn channel_events_are_monotonic_under_reordering_and_duplication() {
    let (stores, backend) = stores();
    let reconciler = Reconciler::new(stores, Arc::new(MockPaymentGateway::default()));

    let mut n = notification("NOT-1", NotificationStatus::Sent);
    n.provider_message_id = Some("wa-1".to_string());
    NotificationStore::put(backend.as_ref(), n).await.unwrap();

    // "open" lands before the delayed "delivered"; replay "open" afterwards.
    reconciler.apply_email_event("NOT-1", "open").await.unwrap();
    let late = reconciler
        .apply_email_event("NOT-1", "delivered")
        .await
        .unwrap();
    assert!(matches!(late, ChannelOutcome::NoChange { .. }));
    let replay = reconciler.apply_email_event("NOT-1", "open").await.unwrap();
    assert!(matches!(replay, ChannelOutcome::NoChange { .. }));

    // Messaging "READ" followed by a stale numeric "delivered".
    reconciler
        .apply_messaging_event("wa-1", &json!(4))
        .await
        .unwrap();
    let stale = reconciler
        .apply_messaging_event("wa-1", &json!("DELIVERED"))
        .await
        .unwrap();
    assert!(matches!(stale, ChannelOutcome::NoChange { .. }));

    let n = NotificationStore::get(backend.as_ref(), "NOT-1")
        .await
        .unwrap()
        .unwrap();
    // Most advanced event in the whole sequence wins.
    assert_eq!(n.status, NotificationStatus::Read);
}

#[tokio::test]
async fn late_bounce_does_not_regress_progress() {
    let (stores, backend) = stores();
    let reconciler = Reconciler::new(stores, Arc::new(MockPaymentGateway::default()));
    NotificationStore::put(backend.as_ref(), notification("NOT-2", NotificationStatus::Sent))
        .await
        .unwrap();

    reconciler
        .apply_email_event("NOT-2", "delivered")
        .await
        .unwrap();
    reconciler.apply_email_event("NOT-2", "bounce").await.unwrap();

    let n = NotificationStore::get(backend.as_ref(), "NOT-2")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(n.status, NotificationStatus::Delivered);
    assert_eq!(
        n.email_status,
        Some(notifica_core::entities::ChannelStatus::Delivered)
    );
}

#[tokio::test]
async fn payment_confirmation_marks_sent_and_settles_transaction() {
    let (stores, backend) = stores();
    let reconciler = Reconciler::new(stores, Arc::new(MockPaymentGateway::default()));

    NotificationStore::put(
        backend.as_ref(),
        notification("NOT-3", NotificationStatus::AwaitingPayment),
    )
    .await
    .unwrap();
    let tx = transaction("NOT-3", TransactionStatus::Pending, chrono::Utc::now());
    let tx_id = tx.id;
    TransactionStore::put(backend.as_ref(), tx).await.unwrap();

    let outcome = reconciler
        .apply_payment_event(&confirmation("NOT-3"))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        PaymentOutcome::Confirmed {
            notification_id: "NOT-3".to_string()
        }
    );

    let n = NotificationStore::get(backend.as_ref(), "NOT-3")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(n.status, NotificationStatus::Sent);
    assert_eq!(n.payment_id.as_deref(), Some("pay-1"));
    assert_eq!(n.payment_method.as_deref(), Some("PIX"));
    assert!(n.paid_at.is_some());

    let tx = TransactionStore::get(backend.as_ref(), tx_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(tx.status, TransactionStatus::Paid);
}

#[tokio::test]
async fn replayed_confirmation_is_accepted_but_inert() {
    let (stores, backend) = stores();
    let reconciler = Reconciler::new(stores, Arc::new(MockPaymentGateway::default()));
    NotificationStore::put(
        backend.as_ref(),
        notification("NOT-4", NotificationStatus::AwaitingPayment),
    )
    .await
    .unwrap();

    let first = reconciler
        .apply_payment_event(&confirmation("NOT-4"))
        .await
        .unwrap();
    assert!(matches!(first, PaymentOutcome::Confirmed { .. }));

    let second = reconciler
        .apply_payment_event(&confirmation("NOT-4"))
        .await
        .unwrap();
    assert_eq!(
        second,
        PaymentOutcome::AlreadySent {
            notification_id: "NOT-4".to_string()
        }
    );
}

#[tokio::test]
async fn non_confirmation_events_are_ignored() {
    let (stores, backend) = stores();
    let reconciler = Reconciler::new(stores, Arc::new(MockPaymentGateway::default()));
    NotificationStore::put(
        backend.as_ref(),
        notification("NOT-5", NotificationStatus::AwaitingPayment),
    )
    .await
    .unwrap();

    let mut event = confirmation("NOT-5");
    event.event = "PAYMENT_OVERDUE".to_string();
    assert_eq!(
        reconciler.apply_payment_event(&event).await.unwrap(),
        PaymentOutcome::Ignored
    );

    let n = NotificationStore::get(backend.as_ref(), "NOT-5")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(n.status, NotificationStatus::AwaitingPayment);
}

#[tokio::test]
async fn reference_is_extracted_from_description_when_metadata_is_dropped() {
    let (stores, backend) = stores();
    let reconciler = Reconciler::new(stores, Arc::new(MockPaymentGateway::default()));
    NotificationStore::put(
        backend.as_ref(),
        notification("NOT-ABC123", NotificationStatus::AwaitingPayment),
    )
    .await
    .unwrap();

    let event = PaymentEvent {
        event: "PAYMENT_RECEIVED".to_string(),
        payment_id: "pay-2".to_string(),
        external_reference: None,
        description: Some("Notificação Extrajudicial - Ref: NOT-ABC123".to_string()),
        billing_type: None,
        payment_date: None,
    };
    let outcome = reconciler.apply_payment_event(&event).await.unwrap();
    assert_eq!(
        outcome,
        PaymentOutcome::Confirmed {
            notification_id: "NOT-ABC123".to_string()
        }
    );
}

#[tokio::test]
async fn unresolvable_payment_events_are_acknowledged_noops() {
    let (stores, _backend) = stores();
    let reconciler = Reconciler::new(stores, Arc::new(MockPaymentGateway::default()));

    // No reference at all.
    let mut event = confirmation("NOT-x");
    event.external_reference = None;
    event.description = Some("no marker".to_string());
    assert_eq!(
        reconciler.apply_payment_event(&event).await.unwrap(),
        PaymentOutcome::Unresolved
    );

    // Reference points at nothing.
    assert_eq!(
        reconciler
            .apply_payment_event(&confirmation("NOT-missing"))
            .await
            .unwrap(),
        PaymentOutcome::Unresolved
    );
}

#[tokio::test]
async fn messaging_event_for_unknown_message_is_a_noop() {
    let (stores, _backend) = stores();
    let reconciler = Reconciler::new(stores, Arc::new(MockPaymentGateway::default()));

    let outcome = reconciler
        .apply_messaging_event("never-sent", &json!(3))
        .await
        .unwrap();
    assert_eq!(outcome, ChannelOutcome::NotFound);
}

#[tokio::test]
async fn poll_fallback_converges_on_the_same_reconciliation_path() {
    let (stores, backend) = stores();
    let gateway = Arc::new(MockPaymentGateway::default());
    let reconciler = Reconciler::new(stores, gateway.clone());

    NotificationStore::put(
        backend.as_ref(),
        notification("NOT-6", NotificationStatus::AwaitingPayment),
    )
    .await
    .unwrap();
    TransactionStore::put(
        backend.as_ref(),
        transaction("NOT-6", TransactionStatus::Pending, chrono::Utc::now()),
    )
    .await
    .unwrap();

    // Charge still pending: poll applies nothing.
    let (status, outcome) = reconciler.poll_payment("NOT-6").await.unwrap().unwrap();
    assert_eq!(status, "PENDING");
    assert_eq!(outcome, PaymentOutcome::Ignored);

    gateway.set_charge_status("CONFIRMED");
    let (_, outcome) = reconciler.poll_payment("NOT-6").await.unwrap().unwrap();
    assert!(matches!(outcome, PaymentOutcome::Confirmed { .. }));

    // Second poll is as idempotent as a webhook replay.
    let (_, outcome) = reconciler.poll_payment("NOT-6").await.unwrap().unwrap();
    assert!(matches!(outcome, PaymentOutcome::AlreadySent { .. }));

    // Nothing to poll for an unknown notification.
    assert!(reconciler.poll_payment("NOT-404").await.unwrap().is_none());
}
