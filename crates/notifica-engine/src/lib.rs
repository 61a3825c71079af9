//! Lifecycle state machines for notifications, meetings and transactions:
//! webhook reconciliation, outbound dispatch, refund compensation and the
//! meeting time sweep. Everything here works through the store and provider
//! traits; the HTTP edges live in the gateway.

pub mod dispatch;
pub mod reconcile;
pub mod refund;
pub mod sweep;

use std::sync::Arc;

use notifica_core::storage::{MeetingStore, NotificationStore, TransactionStore};

/// Handles to the three entity stores. One backend usually implements all
/// three traits; this keeps the seams separate anyway.
#[derive(Clone)]
pub struct Stores {
    pub notifications: Arc<dyn NotificationStore>,
    pub meetings: Arc<dyn MeetingStore>,
    pub transactions: Arc<dyn TransactionStore>,
}

impl Stores {
    /// Wire all three seams to a single backend.
    pub fn from_backend<S>(backend: Arc<S>) -> Self
    where
        S: NotificationStore + MeetingStore + TransactionStore + 'static,
    {
        Self {
            notifications: backend.clone(),
            meetings: backend.clone(),
            transactions: backend,
        }
    }
}
