pub mod config;
pub mod contracts;
pub mod db;
pub mod redis_bus;

pub use config::{
    BlobConfig, EmailConfig, MessagingConfig, PaymentConfig, ServiceConfig, TextGenConfig,
};
pub use contracts::{
    EmailWebhookEvent, MessagingWebhook, PaymentWebhook, PaymentWebhookPayment,
    channels,
};
pub use db::connect_database;
pub use redis_bus::RedisBus;
