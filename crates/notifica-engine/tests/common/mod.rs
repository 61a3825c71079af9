#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::sync::Mutex;
use uuid::Uuid;

use notifica_core::entities::{
    Meeting, MeetingStatus, Notification, NotificationStatus, Transaction, TransactionStatus,
};
use notifica_engine::Stores;
use notifica_providers::{
    Charge, ChargeRequest, EmailProvider, MessagingProvider, PaymentGateway, PixQrCode,
    ProviderError,
};
use notifica_store::InMemoryEntityStore;

pub fn stores() -> (Stores, Arc<InMemoryEntityStore>) {
    let backend = Arc::new(InMemoryEntityStore::new());
    (Stores::from_backend(backend.clone()), backend)
}

fn mock_rejection() -> ProviderError {
    ProviderError::Rejected {
        status: 503,
        body: "mock failure".to_string(),
    }
}

#[derive(Default)]
pub struct MockEmail {
    pub sent: Mutex<Vec<(String, String)>>,
    pub fail: AtomicBool,
}

impl MockEmail {
    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl EmailProvider for MockEmail {
    async fn send(&self, to: &str, subject: &str, _html: &str) -> Result<(), ProviderError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(mock_rejection());
        }
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), subject.to_string()));
        Ok(())
    }
}

#[derive(Default)]
pub struct MockMessaging {
    pub documents: Mutex<Vec<String>>,
    pub texts: Mutex<Vec<String>>,
    pub fail_document: AtomicBool,
    pub fail_all: AtomicBool,
    next_id: AtomicUsize,
}

impl MockMessaging {
    fn issue_id(&self) -> String {
        format!("mock-msg-{}", self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    pub fn document_count(&self) -> usize {
        self.documents.lock().unwrap().len()
    }

    pub fn text_count(&self) -> usize {
        self.texts.lock().unwrap().len()
    }
}

#[async_trait]
impl MessagingProvider for MockMessaging {
    async fn send_document(
        &self,
        phone: &str,
        _document_url: &str,
        _caption: &str,
    ) -> Result<String, ProviderError> {
        if self.fail_all.load(Ordering::SeqCst) || self.fail_document.load(Ordering::SeqCst) {
            return Err(mock_rejection());
        }
        self.documents.lock().unwrap().push(phone.to_string());
        Ok(self.issue_id())
    }

    async fn send_text(&self, phone: &str, _message: &str) -> Result<String, ProviderError> {
        if self.fail_all.load(Ordering::SeqCst) {
            return Err(mock_rejection());
        }
        self.texts.lock().unwrap().push(phone.to_string());
        Ok(self.issue_id())
    }
}

pub struct MockPaymentGateway {
    pub charge_status: Mutex<String>,
}

impl Default for MockPaymentGateway {
    fn default() -> Self {
        Self {
            charge_status: Mutex::new("PENDING".to_string()),
        }
    }
}

impl MockPaymentGateway {
    pub fn set_charge_status(&self, status: &str) {
        *self.charge_status.lock().unwrap() = status.to_string();
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_customer(
        &self,
        _name: &str,
        _email: &str,
        _document: &str,
    ) -> Result<String, ProviderError> {
        Ok("mock-customer".to_string())
    }

    async fn create_charge(&self, request: &ChargeRequest) -> Result<Charge, ProviderError> {
        Ok(Charge {
            id: format!("mock-charge-{}", request.external_reference),
            status: "PENDING".to_string(),
        })
    }

    async fn get_pix_qr_code(&self, _charge_id: &str) -> Result<PixQrCode, ProviderError> {
        Ok(PixQrCode {
            payload: "mock-pix-payload".to_string(),
            encoded_image: String::new(),
        })
    }

    async fn get_charge_status(&self, _charge_id: &str) -> Result<String, ProviderError> {
        Ok(self.charge_status.lock().unwrap().clone())
    }
}

pub const HOST_UID: &str = "user-ana";
pub const GUEST_DOCUMENT: &str = "12345678901";

pub fn notification(id: &str, status: NotificationStatus) -> Notification {
    Notification {
        id: id.to_string(),
        sender_uid: HOST_UID.to_string(),
        sender_name: "Ana Souza".to_string(),
        sender_email: "ana@example.com".to_string(),
        recipient_name: "Bruno Lima".to_string(),
        recipient_email: "bruno@example.com".to_string(),
        recipient_document: GUEST_DOCUMENT.to_string(),
        recipient_phone: Some("5511999990000".to_string()),
        subject: "Cobrança de aluguel".to_string(),
        species: "Notificação Extrajudicial".to_string(),
        area: "Cível".to_string(),
        body: "Fica o destinatário notificado.".to_string(),
        document_url: Some("https://blobs.example.com/docs/doc.pdf".to_string()),
        signature_url: None,
        attachments: Vec::new(),
        created_at: Utc::now(),
        status,
        payment_method: None,
        amount: Some(Decimal::new(4990, 2)),
        payment_id: None,
        paid_at: None,
        email_status: None,
        messaging_status: None,
        provider_message_id: None,
    }
}

pub fn meeting(status: MeetingStatus, date: NaiveDate, time: &str) -> Meeting {
    Meeting {
        id: Uuid::new_v4(),
        host_uid: HOST_UID.to_string(),
        host_email: "ana@example.com".to_string(),
        title: "Sessão de conciliação".to_string(),
        scheduled_date: date,
        scheduled_time: time.to_string(),
        guest_email: "bruno@example.com".to_string(),
        guest_document: GUEST_DOCUMENT.to_string(),
        conference_url: "https://meet.example.com/sala".to_string(),
        created_at: Utc::now(),
        status,
    }
}

pub fn transaction(
    notification_id: &str,
    status: TransactionStatus,
    date: DateTime<Utc>,
) -> Transaction {
    Transaction {
        id: Uuid::new_v4(),
        notification_id: notification_id.to_string(),
        description: format!("Notificação Extrajudicial - Ref: {notification_id}"),
        amount: Decimal::new(4990, 2),
        payment_method: "PIX".to_string(),
        date,
        status,
        external_id: Some("charge-1".to_string()),
    }
}
