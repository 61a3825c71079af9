pub mod entities;
pub mod events;
pub mod normalize;
pub mod storage;

pub use entities::{
    Attachment, ChannelStatus, Meeting, MeetingStatus, Notification, NotificationStatus,
    Transaction, TransactionStatus, new_notification_id, normalize_document,
};
pub use events::{LifecycleEvent, LifecycleEventKind};
pub use storage::{MeetingStore, NotificationStore, TransactionStore};
