//! reqwest-backed implementations of the provider traits. Every client is
//! built with a bounded request timeout so a hung provider cannot stall the
//! caller indefinitely.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::{
    BlobStore, Charge, ChargeRequest, EmailProvider, MessagingProvider, PaymentGateway,
    PixQrCode, ProviderError, TextGenerator,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

fn http_client() -> Client {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .unwrap_or_default()
}

async fn rejection(response: reqwest::Response) -> ProviderError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    ProviderError::Rejected { status, body }
}

/// Asaas payment gateway client.
pub struct AsaasGateway {
    client: Client,
    base_url: String,
    api_key: String,
}

impl AsaasGateway {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: http_client(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AsaasCustomerResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct AsaasChargeResponse {
    id: String,
    status: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AsaasPixResponse {
    payload: String,
    encoded_image: String,
}

#[async_trait]
impl PaymentGateway for AsaasGateway {
    async fn create_customer(
        &self,
        name: &str,
        email: &str,
        document: &str,
    ) -> Result<String, ProviderError> {
        let response = self
            .client
            .post(format!("{}/customers", self.base_url))
            .header("access_token", &self.api_key)
            .json(&json!({ "name": name, "email": email, "cpfCnpj": document }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }
        let customer: AsaasCustomerResponse = response.json().await?;
        Ok(customer.id)
    }

    async fn create_charge(&self, request: &ChargeRequest) -> Result<Charge, ProviderError> {
        let response = self
            .client
            .post(format!("{}/payments", self.base_url))
            .header("access_token", &self.api_key)
            .json(&json!({
                "customer": request.customer_id,
                "billingType": request.billing_type,
                "value": request.amount,
                "description": request.description,
                "externalReference": request.external_reference,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }
        let charge: AsaasChargeResponse = response.json().await?;
        debug!("created charge {} ({})", charge.id, charge.status);
        Ok(Charge {
            id: charge.id,
            status: charge.status,
        })
    }

    async fn get_pix_qr_code(&self, charge_id: &str) -> Result<PixQrCode, ProviderError> {
        let response = self
            .client
            .get(format!("{}/payments/{}/pixQrCode", self.base_url, charge_id))
            .header("access_token", &self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }
        let pix: AsaasPixResponse = response.json().await?;
        Ok(PixQrCode {
            payload: pix.payload,
            encoded_image: pix.encoded_image,
        })
    }

    async fn get_charge_status(&self, charge_id: &str) -> Result<String, ProviderError> {
        let response = self
            .client
            .get(format!("{}/payments/{}", self.base_url, charge_id))
            .header("access_token", &self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }
        let charge: AsaasChargeResponse = response.json().await?;
        Ok(charge.status)
    }
}

/// SendGrid email client.
pub struct SendGridMailer {
    client: Client,
    api_key: String,
    from_email: String,
    from_name: String,
}

impl SendGridMailer {
    pub fn new(
        api_key: impl Into<String>,
        from_email: impl Into<String>,
        from_name: impl Into<String>,
    ) -> Self {
        Self {
            client: http_client(),
            api_key: api_key.into(),
            from_email: from_email.into(),
            from_name: from_name.into(),
        }
    }
}

#[async_trait]
impl EmailProvider for SendGridMailer {
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), ProviderError> {
        let response = self
            .client
            .post("https://api.sendgrid.com/v3/mail/send")
            .bearer_auth(&self.api_key)
            .json(&json!({
                "personalizations": [{ "to": [{ "email": to }] }],
                "from": { "email": self.from_email, "name": self.from_name },
                "subject": subject,
                "content": [{ "type": "text/html", "value": html }],
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }
        Ok(())
    }
}

/// Z-API WhatsApp client. `base_url` already carries the instance id and
/// token path segments.
pub struct ZapiMessenger {
    client: Client,
    base_url: String,
    client_token: String,
}

impl ZapiMessenger {
    pub fn new(base_url: impl Into<String>, client_token: impl Into<String>) -> Self {
        Self {
            client: http_client(),
            base_url: base_url.into(),
            client_token: client_token.into(),
        }
    }

    fn message_id(value: &serde_json::Value) -> Result<String, ProviderError> {
        value
            .get("messageId")
            .or_else(|| value.get("zaapId"))
            .or_else(|| value.get("id"))
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| {
                ProviderError::BadResponse("send response carried no message id".to_string())
            })
    }
}

#[async_trait]
impl MessagingProvider for ZapiMessenger {
    async fn send_document(
        &self,
        phone: &str,
        document_url: &str,
        caption: &str,
    ) -> Result<String, ProviderError> {
        let response = self
            .client
            .post(format!("{}/send-document/pdf", self.base_url))
            .header("Client-Token", &self.client_token)
            .json(&json!({
                "phone": phone,
                "document": document_url,
                "caption": caption,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }
        let body: serde_json::Value = response.json().await?;
        Self::message_id(&body)
    }

    async fn send_text(&self, phone: &str, message: &str) -> Result<String, ProviderError> {
        let response = self
            .client
            .post(format!("{}/send-text", self.base_url))
            .header("Client-Token", &self.client_token)
            .json(&json!({ "phone": phone, "message": message }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }
        let body: serde_json::Value = response.json().await?;
        Self::message_id(&body)
    }
}

/// Text-generation service client ("generate text from facts").
pub struct HttpTextGenerator {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpTextGenerator {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            // Generation is slower than the delivery providers.
            client: Client::builder()
                .timeout(Duration::from_secs(60))
                .build()
                .unwrap_or_default(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    text: String,
}

#[async_trait]
impl TextGenerator for HttpTextGenerator {
    async fn generate(
        &self,
        prompt: &str,
        attachment_urls: &[String],
    ) -> Result<String, ProviderError> {
        let response = self
            .client
            .post(format!("{}/generate", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&json!({ "prompt": prompt, "attachments": attachment_urls }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }
        let generated: GenerateResponse = response.json().await?;
        Ok(generated.text)
    }
}

/// Blob storage over a simple HTTP object API.
pub struct HttpBlobStore {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpBlobStore {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: http_client(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    fn object_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> Result<String, ProviderError> {
        let url = self.object_url(path);
        let response = self
            .client
            .put(&url)
            .bearer_auth(&self.api_key)
            .body(bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }
        Ok(url)
    }

    async fn delete(&self, path: &str) -> Result<(), ProviderError> {
        let response = self
            .client
            .delete(self.object_url(path))
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        // Deleting something already gone is fine.
        if !response.status().is_success() && response.status().as_u16() != 404 {
            return Err(rejection(response).await);
        }
        Ok(())
    }
}
