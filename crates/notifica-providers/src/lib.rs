//! Capability seams for the external collaborators: payment gateway, email
//! and messaging channels, text generation, and blob storage. The engine
//! and gateway only ever see these traits; the HTTP implementations live in
//! [`http`].

pub mod http;

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("provider rejected the request ({status}): {body}")]
    Rejected { status: u16, body: String },
    #[error("provider returned an unusable response: {0}")]
    BadResponse(String),
}

#[derive(Debug, Clone)]
pub struct ChargeRequest {
    pub customer_id: String,
    pub amount: Decimal,
    pub billing_type: String,
    pub description: String,
    pub external_reference: String,
}

#[derive(Debug, Clone)]
pub struct Charge {
    pub id: String,
    pub status: String,
}

#[derive(Debug, Clone)]
pub struct PixQrCode {
    pub payload: String,
    pub encoded_image: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_customer(
        &self,
        name: &str,
        email: &str,
        document: &str,
    ) -> Result<String, ProviderError>;
    async fn create_charge(&self, request: &ChargeRequest) -> Result<Charge, ProviderError>;
    async fn get_pix_qr_code(&self, charge_id: &str) -> Result<PixQrCode, ProviderError>;
    /// Pull-side status check, used by the manual poll fallback when
    /// webhook delivery is unreliable.
    async fn get_charge_status(&self, charge_id: &str) -> Result<String, ProviderError>;
}

#[async_trait]
pub trait EmailProvider: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), ProviderError>;
}

#[async_trait]
pub trait MessagingProvider: Send + Sync {
    /// Sends the rendered document as an attachment with caption text.
    /// Returns the provider message id used for webhook correlation.
    async fn send_document(
        &self,
        phone: &str,
        document_url: &str,
        caption: &str,
    ) -> Result<String, ProviderError>;
    /// Plain-text fallback when the document send fails.
    async fn send_text(&self, phone: &str, message: &str) -> Result<String, ProviderError>;
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        attachment_urls: &[String],
    ) -> Result<String, ProviderError>;
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> Result<String, ProviderError>;
    async fn delete(&self, path: &str) -> Result<(), ProviderError>;
}
