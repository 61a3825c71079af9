use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LifecycleEventKind {
    NotificationSent,
    NotificationDelivered,
    NotificationRead,
    PaymentRefunded,
    MeetingScheduled,
    MeetingCanceled,
    MeetingCompleted,
}

/// Published to the event bus whenever an entity crosses a lifecycle
/// boundary, so dashboards and downstream workers can react without
/// polling the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleEvent {
    pub id: Uuid,
    pub entity_id: String,
    pub kind: LifecycleEventKind,
    pub occurred_at: DateTime<Utc>,
    pub payload: serde_json::Value,
}

impl LifecycleEvent {
    pub fn new(entity_id: impl Into<String>, kind: LifecycleEventKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            entity_id: entity_id.into(),
            kind,
            occurred_at: Utc::now(),
            payload: serde_json::Value::Null,
        }
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}
