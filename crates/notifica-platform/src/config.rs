use anyhow::{Context, Result};

#[derive(Clone, Debug)]
pub struct PaymentConfig {
    pub base_url: String,
    pub api_key: String,
}

#[derive(Clone, Debug)]
pub struct EmailConfig {
    pub api_key: String,
    pub from_email: String,
    pub from_name: String,
}

#[derive(Clone, Debug)]
pub struct MessagingConfig {
    pub base_url: String,
    pub client_token: String,
}

#[derive(Clone, Debug)]
pub struct TextGenConfig {
    pub base_url: String,
    pub api_key: String,
}

#[derive(Clone, Debug)]
pub struct BlobConfig {
    pub base_url: String,
    pub api_key: String,
}

/// Env-driven service configuration. The payment gateway and webhook token
/// are mandatory for the HTTP service; delivery channels and the text
/// generator are optional — a channel without credentials is simply not
/// dispatched to.
const DEFAULT_POOL_SIZE: u32 = 10;

#[derive(Clone, Debug)]
pub struct ServiceConfig {
    pub database_url: String,
    pub database_pool_size: u32,
    pub redis_url: String,
    pub http_addr: String,
    pub webhook_token: String,
    pub payment: PaymentConfig,
    pub email: Option<EmailConfig>,
    pub messaging: Option<MessagingConfig>,
    pub textgen: Option<TextGenConfig>,
    pub blob: Option<BlobConfig>,
}

impl ServiceConfig {
    pub fn from_env(default_http_addr: &str) -> Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is required")?;
        let database_pool_size = parse_pool_size(std::env::var("DATABASE_POOL_SIZE").ok())?;
        let redis_url = std::env::var("REDIS_URL").context("REDIS_URL is required")?;
        let http_addr =
            std::env::var("HTTP_ADDR").unwrap_or_else(|_| default_http_addr.to_string());
        let webhook_token =
            std::env::var("PAYMENT_WEBHOOK_TOKEN").context("PAYMENT_WEBHOOK_TOKEN is required")?;

        let payment = PaymentConfig {
            base_url: std::env::var("ASAAS_BASE_URL")
                .unwrap_or_else(|_| "https://api.asaas.com/v3".to_string()),
            api_key: std::env::var("ASAAS_API_KEY").context("ASAAS_API_KEY is required")?,
        };

        let email = std::env::var("SENDGRID_API_KEY").ok().map(|api_key| {
            EmailConfig {
                api_key,
                from_email: std::env::var("EMAIL_FROM_ADDRESS")
                    .unwrap_or_else(|_| "notificacoes@notifica.app".to_string()),
                from_name: std::env::var("EMAIL_FROM_NAME")
                    .unwrap_or_else(|_| "Notifica".to_string()),
            }
        });

        let messaging = match (
            std::env::var("ZAPI_BASE_URL").ok(),
            std::env::var("ZAPI_CLIENT_TOKEN").ok(),
        ) {
            (Some(base_url), Some(client_token)) => Some(MessagingConfig {
                base_url,
                client_token,
            }),
            _ => None,
        };

        let textgen = match (
            std::env::var("TEXTGEN_BASE_URL").ok(),
            std::env::var("TEXTGEN_API_KEY").ok(),
        ) {
            (Some(base_url), Some(api_key)) => Some(TextGenConfig { base_url, api_key }),
            _ => None,
        };

        let blob = match (
            std::env::var("BLOB_BASE_URL").ok(),
            std::env::var("BLOB_API_KEY").ok(),
        ) {
            (Some(base_url), Some(api_key)) => Some(BlobConfig { base_url, api_key }),
            _ => None,
        };

        Ok(Self {
            database_url,
            database_pool_size,
            redis_url,
            http_addr,
            webhook_token,
            payment,
            email,
            messaging,
            textgen,
            blob,
        })
    }

    /// Workers only need the store and the event bus.
    pub fn worker_from_env() -> Result<(String, String)> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is required")?;
        let redis_url = std::env::var("REDIS_URL").context("REDIS_URL is required")?;
        Ok((database_url, redis_url))
    }
}

fn parse_pool_size(raw: Option<String>) -> Result<u32> {
    let Some(value) = raw else {
        return Ok(DEFAULT_POOL_SIZE);
    };
    let size: u32 = value
        .trim()
        .parse()
        .context("DATABASE_POOL_SIZE must be an integer")?;
    anyhow::ensure!(size > 0, "DATABASE_POOL_SIZE must be positive");
    Ok(size)
}
