use std::{net::SocketAddr, sync::Arc};

use anyhow::Result as AnyResult;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{error, info, warn};
use uuid::Uuid;

use notifica_core::entities::{
    Attachment, Meeting, MeetingStatus, Notification, NotificationStatus, Transaction,
    TransactionStatus, new_notification_id, normalize_document,
};
use notifica_core::events::{LifecycleEvent, LifecycleEventKind};
use notifica_engine::reconcile::{PaymentEvent, PaymentOutcome, Reconciler};
use notifica_engine::refund::{RefundCoordinator, RefundError};
use notifica_engine::{Stores, dispatch::Dispatcher};
use notifica_platform::{
    EmailWebhookEvent, MessagingWebhook, PaymentWebhook, RedisBus, ServiceConfig, channels,
    connect_database,
};
use notifica_providers::http::{
    AsaasGateway, HttpBlobStore, HttpTextGenerator, SendGridMailer, ZapiMessenger,
};
use notifica_providers::{BlobStore, ChargeRequest, PaymentGateway, TextGenerator};
use notifica_store::PgEntityStore;

/// Header the payment gateway echoes the shared secret back in.
const PAYMENT_TOKEN_HEADER: &str = "asaas-access-token";

#[derive(Clone)]
struct AppState {
    stores: Stores,
    reconciler: Arc<Reconciler>,
    dispatcher: Arc<Dispatcher>,
    refunds: Arc<RefundCoordinator>,
    payments: Arc<dyn PaymentGateway>,
    textgen: Option<Arc<dyn TextGenerator>>,
    blobs: Option<Arc<dyn BlobStore>>,
    redis: RedisBus,
    webhook_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AttachmentRequest {
    name: String,
    url: String,
    storage_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CreateNotificationRequest {
    sender_uid: String,
    sender_name: String,
    sender_email: String,
    recipient_name: String,
    recipient_email: String,
    recipient_document: String,
    recipient_phone: Option<String>,
    subject: String,
    species: String,
    area: String,
    /// Either the final text, or omitted in favour of `facts` for AI
    /// generation.
    body: Option<String>,
    facts: Option<String>,
    #[serde(default)]
    attachments: Vec<AttachmentRequest>,
    document_url: Option<String>,
    signature_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CreateNotificationResponse {
    notification_id: String,
    status: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct MeetingRequest {
    title: String,
    date: NaiveDate,
    time: String,
    conference_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CheckoutRequest {
    payment_method: String,
    amount: Decimal,
    meeting: Option<MeetingRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PixView {
    payload: String,
    encoded_image: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CheckoutResponse {
    notification_id: String,
    transaction_id: Uuid,
    charge_id: String,
    charge_status: String,
    status: String,
    meeting_id: Option<Uuid>,
    pix: Option<PixView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct NotificationView {
    id: String,
    sender_name: String,
    sender_email: String,
    recipient_name: String,
    recipient_email: String,
    recipient_document: String,
    subject: String,
    species: String,
    area: String,
    body: String,
    document_url: Option<String>,
    attachments: Vec<AttachmentRequest>,
    created_at: DateTime<Utc>,
    status: String,
    payment_method: Option<String>,
    amount: Option<Decimal>,
    paid_at: Option<DateTime<Utc>>,
    email_status: Option<String>,
    messaging_status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ListNotificationsResponse {
    items: Vec<NotificationView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RecipientLookupQuery {
    recipient_document: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RefundResponse {
    transaction_id: Uuid,
    notification_id: String,
    meeting_id: Option<Uuid>,
    status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PollPaymentResponse {
    notification_id: String,
    gateway_status: String,
    outcome: String,
}

#[tokio::main]
async fn main() -> AnyResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "notifica_gateway=info".to_string()),
        )
        .init();

    let config = ServiceConfig::from_env("0.0.0.0:8080")?;
    let pool = connect_database(&config.database_url, config.database_pool_size).await?;
    let redis = RedisBus::connect(&config.redis_url)?;

    let backend = Arc::new(PgEntityStore::new(pool));
    let stores = Stores::from_backend(backend);

    let payments: Arc<dyn PaymentGateway> = Arc::new(AsaasGateway::new(
        config.payment.base_url.clone(),
        config.payment.api_key.clone(),
    ));
    let email = config.email.as_ref().map(|email_config| {
        Arc::new(SendGridMailer::new(
            email_config.api_key.clone(),
            email_config.from_email.clone(),
            email_config.from_name.clone(),
        )) as Arc<dyn notifica_providers::EmailProvider>
    });
    let messaging = config.messaging.as_ref().map(|messaging_config| {
        Arc::new(ZapiMessenger::new(
            messaging_config.base_url.clone(),
            messaging_config.client_token.clone(),
        )) as Arc<dyn notifica_providers::MessagingProvider>
    });
    let textgen = config.textgen.as_ref().map(|textgen_config| {
        Arc::new(HttpTextGenerator::new(
            textgen_config.base_url.clone(),
            textgen_config.api_key.clone(),
        )) as Arc<dyn TextGenerator>
    });
    let blobs = config.blob.as_ref().map(|blob_config| {
        Arc::new(HttpBlobStore::new(
            blob_config.base_url.clone(),
            blob_config.api_key.clone(),
        )) as Arc<dyn BlobStore>
    });

    let dispatcher = Arc::new(Dispatcher::new(
        stores.notifications.clone(),
        email,
        messaging,
    ));
    let reconciler = Arc::new(Reconciler::new(stores.clone(), payments.clone()));
    let refunds = Arc::new(RefundCoordinator::new(stores.clone()));

    let state = AppState {
        stores,
        reconciler,
        dispatcher,
        refunds,
        payments,
        textgen,
        blobs,
        redis,
        webhook_token: config.webhook_token.clone(),
    };

    let router = Router::new()
        .route("/healthz", get(healthz))
        .route(
            "/notifications",
            get(list_notifications_by_recipient).post(create_notification),
        )
        .route(
            "/notifications/{notification_id}",
            get(get_notification).delete(delete_notification),
        )
        .route(
            "/notifications/{notification_id}/checkout",
            post(checkout_notification),
        )
        .route(
            "/notifications/{notification_id}/payment/poll",
            post(poll_payment),
        )
        .route("/transactions/{transaction_id}/refund", post(refund_transaction))
        .route("/webhooks/payment", post(payment_webhook))
        .route("/webhooks/email", post(email_webhook))
        .route("/webhooks/messaging", post(messaging_webhook))
        .with_state(state);

    let addr: SocketAddr = config.http_addr.parse()?;
    info!("gateway listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

async fn healthz() -> &'static str {
    "ok"
}

async fn create_notification(
    State(state): State<AppState>,
    Json(payload): Json<CreateNotificationRequest>,
) -> Result<Json<CreateNotificationResponse>, (StatusCode, String)> {
    let recipient_document = normalize_document(&payload.recipient_document).ok_or((
        StatusCode::BAD_REQUEST,
        "recipient_document must be a valid CPF".to_string(),
    ))?;

    for (field, value) in [
        ("sender_uid", &payload.sender_uid),
        ("sender_name", &payload.sender_name),
        ("recipient_name", &payload.recipient_name),
        ("recipient_email", &payload.recipient_email),
        ("subject", &payload.subject),
        ("species", &payload.species),
        ("area", &payload.area),
    ] {
        if value.trim().is_empty() {
            return Err((StatusCode::BAD_REQUEST, format!("{field} is required")));
        }
    }

    let body = match (&payload.body, &payload.facts) {
        (Some(body), _) if !body.trim().is_empty() => body.clone(),
        (_, Some(facts)) if !facts.trim().is_empty() => {
            let Some(textgen) = &state.textgen else {
                return Err((
                    StatusCode::BAD_REQUEST,
                    "text generation is not configured; provide body".to_string(),
                ));
            };
            let attachment_urls: Vec<String> =
                payload.attachments.iter().map(|a| a.url.clone()).collect();
            // Generation failure is a user-visible error, never a silent
            // default body.
            textgen
                .generate(facts, &attachment_urls)
                .await
                .map_err(|err| (StatusCode::BAD_GATEWAY, err.to_string()))?
        }
        _ => {
            return Err((
                StatusCode::BAD_REQUEST,
                "either body or facts is required".to_string(),
            ));
        }
    };

    let notification = Notification {
        id: new_notification_id(),
        sender_uid: payload.sender_uid.trim().to_string(),
        sender_name: payload.sender_name.trim().to_string(),
        sender_email: payload.sender_email.trim().to_string(),
        recipient_name: payload.recipient_name.trim().to_string(),
        recipient_email: payload.recipient_email.trim().to_string(),
        recipient_document,
        recipient_phone: payload.recipient_phone.clone(),
        subject: payload.subject.trim().to_string(),
        species: payload.species.trim().to_string(),
        area: payload.area.trim().to_string(),
        body,
        document_url: payload.document_url.clone(),
        signature_url: payload.signature_url.clone(),
        attachments: payload
            .attachments
            .iter()
            .map(|a| Attachment {
                name: a.name.clone(),
                url: a.url.clone(),
                storage_path: a.storage_path.clone(),
            })
            .collect(),
        created_at: Utc::now(),
        status: NotificationStatus::Created,
        payment_method: None,
        amount: None,
        payment_id: None,
        paid_at: None,
        email_status: None,
        messaging_status: None,
        provider_message_id: None,
    };

    let response = CreateNotificationResponse {
        notification_id: notification.id.clone(),
        status: notification.status.as_str().to_string(),
        created_at: notification.created_at,
    };
    state
        .stores
        .notifications
        .put(notification)
        .await
        .map_err(internal_error)?;

    Ok(Json(response))
}

async fn checkout_notification(
    State(state): State<AppState>,
    Path(notification_id): Path<String>,
    Json(payload): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>, (StatusCode, String)> {
    if payload.amount <= Decimal::ZERO {
        return Err((
            StatusCode::BAD_REQUEST,
            "amount must be positive".to_string(),
        ));
    }
    let billing_type = payload.payment_method.trim().to_ascii_uppercase();
    if billing_type.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "payment_method is required".to_string(),
        ));
    }

    let mut notification = state
        .stores
        .notifications
        .get(&notification_id)
        .await
        .map_err(internal_error)?
        .ok_or((StatusCode::NOT_FOUND, "notification not found".to_string()))?;

    if notification.status.progress() >= NotificationStatus::Sent.progress() {
        return Err((
            StatusCode::CONFLICT,
            "notification was already sent".to_string(),
        ));
    }

    // Charge the sender; the recipient never sees the payment leg.
    let customer_id = state
        .payments
        .create_customer(
            &notification.sender_name,
            &notification.sender_email,
            &notification.recipient_document,
        )
        .await
        .map_err(|err| (StatusCode::BAD_GATEWAY, err.to_string()))?;

    // The reference token rides inside the description as well: some
    // gateways drop externalReference, and reconciliation falls back to
    // parsing it out of this text.
    let description = format!("{} - Ref: {}", notification.species, notification.id);
    let charge = state
        .payments
        .create_charge(&ChargeRequest {
            customer_id,
            amount: payload.amount,
            billing_type: billing_type.clone(),
            description: description.clone(),
            external_reference: notification.id.clone(),
        })
        .await
        .map_err(|err| (StatusCode::BAD_GATEWAY, err.to_string()))?;

    let transaction = Transaction {
        id: Uuid::new_v4(),
        notification_id: notification.id.clone(),
        description,
        amount: payload.amount,
        payment_method: billing_type.clone(),
        date: Utc::now(),
        status: TransactionStatus::Pending,
        external_id: Some(charge.id.clone()),
    };
    let transaction_id = transaction.id;
    state
        .stores
        .transactions
        .put(transaction)
        .await
        .map_err(internal_error)?;

    // A meeting booked alongside an unpaid notification starts canceled;
    // payment confirmation flips it to scheduled.
    let mut meeting_id = None;
    if let Some(meeting_request) = &payload.meeting {
        let meeting = Meeting {
            id: Uuid::new_v4(),
            host_uid: notification.sender_uid.clone(),
            host_email: notification.sender_email.clone(),
            title: meeting_request.title.clone(),
            scheduled_date: meeting_request.date,
            scheduled_time: meeting_request.time.clone(),
            guest_email: notification.recipient_email.clone(),
            guest_document: notification.recipient_document.clone(),
            conference_url: meeting_request
                .conference_url
                .clone()
                .unwrap_or_else(|| format!("https://meet.jit.si/notifica-{}", Uuid::new_v4())),
            created_at: Utc::now(),
            status: MeetingStatus::Canceled,
        };
        meeting_id = Some(meeting.id);
        state
            .stores
            .meetings
            .put(meeting)
            .await
            .map_err(internal_error)?;
    }

    notification.status = notification
        .status
        .at_least(NotificationStatus::AwaitingPayment);
    notification.payment_method = Some(billing_type.clone());
    notification.amount = Some(payload.amount);
    let status = notification.status;
    state
        .stores
        .notifications
        .put(notification)
        .await
        .map_err(internal_error)?;

    let pix = if billing_type == "PIX" {
        match state.payments.get_pix_qr_code(&charge.id).await {
            Ok(qr) => Some(PixView {
                payload: qr.payload,
                encoded_image: qr.encoded_image,
            }),
            Err(err) => {
                warn!("failed to fetch pix qr code for {}: {err}", charge.id);
                None
            }
        }
    } else {
        None
    };

    Ok(Json(CheckoutResponse {
        notification_id,
        transaction_id,
        charge_id: charge.id,
        charge_status: charge.status,
        status: status.as_str().to_string(),
        meeting_id,
        pix,
    }))
}

async fn get_notification(
    State(state): State<AppState>,
    Path(notification_id): Path<String>,
) -> Result<Json<NotificationView>, (StatusCode, String)> {
    let notification = state
        .stores
        .notifications
        .get(&notification_id)
        .await
        .map_err(internal_error)?
        .ok_or((StatusCode::NOT_FOUND, "notification not found".to_string()))?;

    Ok(Json(notification_view(&notification)))
}

async fn list_notifications_by_recipient(
    State(state): State<AppState>,
    Query(query): Query<RecipientLookupQuery>,
) -> Result<Json<ListNotificationsResponse>, (StatusCode, String)> {
    let document = normalize_document(&query.recipient_document).ok_or((
        StatusCode::BAD_REQUEST,
        "recipient_document must be a valid CPF".to_string(),
    ))?;

    let notifications = state
        .stores
        .notifications
        .find_by_recipient_document(&document)
        .await
        .map_err(internal_error)?;

    // Drafts and unpaid notifications are private to the sender.
    let items = notifications
        .iter()
        .filter(|n| n.visible_to_recipient())
        .map(notification_view)
        .collect();

    Ok(Json(ListNotificationsResponse { items }))
}

async fn delete_notification(
    State(state): State<AppState>,
    Path(notification_id): Path<String>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let notification = state
        .stores
        .notifications
        .get(&notification_id)
        .await
        .map_err(internal_error)?
        .ok_or((StatusCode::NOT_FOUND, "notification not found".to_string()))?;

    // Attachment cleanup is best-effort; a blob already gone must not
    // keep the record alive.
    if let Some(blobs) = &state.blobs {
        for attachment in &notification.attachments {
            if let Err(err) = blobs.delete(&attachment.storage_path).await {
                warn!(
                    "failed to delete attachment {} of {notification_id}: {err}",
                    attachment.storage_path
                );
            }
        }
    }

    state
        .stores
        .notifications
        .delete(&notification_id)
        .await
        .map_err(internal_error)?;

    Ok(Json(json!({ "deleted": notification_id })))
}

async fn refund_transaction(
    State(state): State<AppState>,
    Path(transaction_id): Path<Uuid>,
) -> Result<Json<RefundResponse>, (StatusCode, String)> {
    let report = state
        .refunds
        .refund(transaction_id, Utc::now())
        .await
        .map_err(|err| match err {
            RefundError::NotFound => (StatusCode::NOT_FOUND, err.to_string()),
            RefundError::NotPaid | RefundError::AlreadyRefunded | RefundError::WindowExpired => {
                (StatusCode::CONFLICT, err.to_string())
            }
            RefundError::Store(inner) => internal_error(inner),
        })?;

    publish_event(
        &state.redis,
        channels::PAYMENTS_REFUNDED,
        LifecycleEvent::new(report.notification_id.clone(), LifecycleEventKind::PaymentRefunded)
            .with_payload(json!({ "transaction_id": report.transaction_id })),
    )
    .await;

    Ok(Json(RefundResponse {
        transaction_id: report.transaction_id,
        notification_id: report.notification_id,
        meeting_id: report.meeting_id,
        status: TransactionStatus::Refunded.as_str().to_string(),
    }))
}

async fn poll_payment(
    State(state): State<AppState>,
    Path(notification_id): Path<String>,
) -> Result<Json<PollPaymentResponse>, (StatusCode, String)> {
    let Some((gateway_status, outcome)) = state
        .reconciler
        .poll_payment(&notification_id)
        .await
        .map_err(internal_error)?
    else {
        return Err((
            StatusCode::NOT_FOUND,
            "no charge recorded for this notification".to_string(),
        ));
    };

    if let PaymentOutcome::Confirmed { notification_id } = &outcome {
        fire_dispatch(&state, notification_id.clone()).await;
    }

    Ok(Json(PollPaymentResponse {
        notification_id,
        gateway_status,
        outcome: payment_outcome_label(&outcome).to_string(),
    }))
}

async fn payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<PaymentWebhook>,
) -> Result<Json<Value>, (StatusCode, String)> {
    // Token mismatch is acknowledged and dropped: the response must not
    // reveal whether validation failed.
    let token = headers
        .get(PAYMENT_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if token != state.webhook_token {
        warn!("payment webhook discarded: bad access token");
        return Ok(Json(json!({ "received": true })));
    }

    let event = PaymentEvent {
        event: payload.event.clone(),
        payment_id: payload.payment.id.clone(),
        external_reference: payload.payment.external_reference.clone(),
        description: payload.payment.description.clone(),
        billing_type: payload.payment.billing_type.clone(),
        payment_date: payload.payment.payment_date.clone(),
    };

    // Only genuine store failure may fail the acknowledgment; everything
    // else is a logged no-op so the provider stops retrying.
    let outcome = state
        .reconciler
        .apply_payment_event(&event)
        .await
        .map_err(internal_error)?;

    if let PaymentOutcome::Confirmed { notification_id } = &outcome {
        fire_dispatch(&state, notification_id.clone()).await;
    }

    Ok(Json(json!({ "received": true })))
}

async fn email_webhook(
    State(state): State<AppState>,
    Json(events): Json<Vec<EmailWebhookEvent>>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let mut updated = 0usize;
    for event in &events {
        let outcome = state
            .reconciler
            .apply_email_event(&event.notification_id, &event.event)
            .await
            .map_err(internal_error)?;
        updated += publish_channel_update(&state, &outcome).await;
    }

    Ok(Json(json!({ "received": events.len(), "updated": updated })))
}

async fn messaging_webhook(
    State(state): State<AppState>,
    Json(payload): Json<MessagingWebhook>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let outcome = state
        .reconciler
        .apply_messaging_event(&payload.message_id, &payload.status)
        .await
        .map_err(internal_error)?;
    let updated = publish_channel_update(&state, &outcome).await;

    Ok(Json(json!({ "received": true, "updated": updated })))
}

/// Outbound dispatch is fire-and-forget relative to the webhook
/// acknowledgment: the provider gets its 200 while the channels run.
async fn fire_dispatch(state: &AppState, notification_id: String) {
    let notification = match state.stores.notifications.get(&notification_id).await {
        Ok(Some(notification)) => notification,
        Ok(None) => {
            error!("confirmed notification {notification_id} vanished before dispatch");
            return;
        }
        Err(err) => {
            error!("failed to load {notification_id} for dispatch: {err:#}");
            return;
        }
    };

    publish_event(
        &state.redis,
        channels::NOTIFICATIONS_SENT,
        LifecycleEvent::new(notification_id.clone(), LifecycleEventKind::NotificationSent),
    )
    .await;

    let dispatcher = state.dispatcher.clone();
    tokio::spawn(async move {
        dispatcher.dispatch(&notification).await;
    });
}

/// Publishes the delivered/read lifecycle event for an applied channel
/// update. Returns 1 when the update changed state, for response counters.
async fn publish_channel_update(
    state: &AppState,
    outcome: &notifica_engine::reconcile::ChannelOutcome,
) -> usize {
    use notifica_engine::reconcile::ChannelOutcome;

    let ChannelOutcome::Updated {
        notification_id,
        status,
    } = outcome
    else {
        return 0;
    };

    if let Some((channel, kind)) = lifecycle_channel(*status) {
        publish_event(
            &state.redis,
            channel,
            LifecycleEvent::new(notification_id.clone(), kind),
        )
        .await;
    }
    1
}

/// Channel and event kind announced when a webhook advances a notification.
fn lifecycle_channel(status: NotificationStatus) -> Option<(&'static str, LifecycleEventKind)> {
    match status {
        NotificationStatus::Delivered => Some((
            channels::NOTIFICATIONS_DELIVERED,
            LifecycleEventKind::NotificationDelivered,
        )),
        NotificationStatus::Read => Some((
            channels::NOTIFICATIONS_READ,
            LifecycleEventKind::NotificationRead,
        )),
        _ => None,
    }
}

async fn publish_event(redis: &RedisBus, channel: &str, event: LifecycleEvent) {
    if let Err(err) = redis.publish_json(channel, &event).await {
        warn!("failed to publish lifecycle event on {channel}: {err:#}");
    }
}

fn payment_outcome_label(outcome: &PaymentOutcome) -> &'static str {
    match outcome {
        PaymentOutcome::Confirmed { .. } => "confirmed",
        PaymentOutcome::AlreadySent { .. } => "already_sent",
        PaymentOutcome::Ignored => "ignored",
        PaymentOutcome::Unresolved => "unresolved",
    }
}

fn notification_view(notification: &Notification) -> NotificationView {
    NotificationView {
        id: notification.id.clone(),
        sender_name: notification.sender_name.clone(),
        sender_email: notification.sender_email.clone(),
        recipient_name: notification.recipient_name.clone(),
        recipient_email: notification.recipient_email.clone(),
        recipient_document: notification.recipient_document.clone(),
        subject: notification.subject.clone(),
        species: notification.species.clone(),
        area: notification.area.clone(),
        body: notification.body.clone(),
        document_url: notification.document_url.clone(),
        attachments: notification
            .attachments
            .iter()
            .map(|a| AttachmentRequest {
                name: a.name.clone(),
                url: a.url.clone(),
                storage_path: a.storage_path.clone(),
            })
            .collect(),
        created_at: notification.created_at,
        status: notification.status.as_str().to_string(),
        payment_method: notification.payment_method.clone(),
        amount: notification.amount,
        paid_at: notification.paid_at,
        email_status: notification.email_status.map(|s| s.as_str().to_string()),
        messaging_status: notification.messaging_status.map(|s| s.as_str().to_string()),
    }
}

fn internal_error<E: std::fmt::Display>(err: E) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}
