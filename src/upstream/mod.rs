//! Upstream — HTTP adapter for the external commerce backend.
//!
//! ARCHITECTURE
//! ============
//! Everything this service forwards (vouchers, offers) or proxies
//! (accounts, products) crosses this boundary. Handlers depend on the
//! `CommerceApi` trait object so tests can swap in a mock; `UpstreamClient`
//! is the reqwest implementation, configured from environment variables.
//!
//! ERROR HANDLING
//! ==============
//! Non-2xx responses get a best-effort extraction of the server's
//! `message` field with a generic fallback, so the admin UI always has
//! something human to show.

pub mod config;
pub mod types;

use async_trait::async_trait;
use reqwest::multipart;
use serde_json::Value;

use crate::offers::ImageUpload;
use config::UpstreamConfig;
use types::{AccountRef, ProductSummary, VoucherPayload, VoucherReceipt};

// =============================================================================
// ERRORS
// =============================================================================

/// Fallback when the backend error body carries no usable message.
const GENERIC_REJECTION: &str = "the commerce service rejected the request";

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("upstream configuration: {0}")]
    Config(String),
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{message}")]
    Api { status: u16, message: String },
    #[error("unexpected upstream response: {0}")]
    Decode(String),
}

// =============================================================================
// TRAIT
// =============================================================================

/// The commerce backend surface this service relies on.
#[async_trait]
pub trait CommerceApi: Send + Sync {
    /// Chart-of-accounts query, filtered by entity type.
    async fn list_accounts(&self, entity_type: &str) -> Result<Vec<AccountRef>, UpstreamError>;

    /// Create an accounting voucher; returns the assigned voucher number.
    async fn create_voucher(&self, payload: &VoucherPayload) -> Result<VoucherReceipt, UpstreamError>;

    /// Product listing for the offer product selector.
    async fn list_products(&self) -> Result<Vec<ProductSummary>, UpstreamError>;

    /// Create an offer from multipart form fields plus an optional banner.
    async fn create_offer(
        &self,
        fields: Vec<(String, String)>,
        image: Option<ImageUpload>,
    ) -> Result<Value, UpstreamError>;

    /// Update an existing offer.
    async fn update_offer(
        &self,
        offer_id: &str,
        fields: Vec<(String, String)>,
        image: Option<ImageUpload>,
    ) -> Result<Value, UpstreamError>;
}

// =============================================================================
// CLIENT
// =============================================================================

/// reqwest-backed `CommerceApi` implementation.
pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl UpstreamClient {
    /// Build a client from environment variables.
    ///
    /// # Errors
    ///
    /// Config errors from [`UpstreamConfig::from_env`], or an HTTP client
    /// build failure.
    pub fn from_env() -> Result<Self, UpstreamError> {
        Self::from_config(UpstreamConfig::from_env()?)
    }

    /// Build a client from a parsed typed config.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the HTTP client fails to build.
    pub fn from_config(config: UpstreamConfig) -> Result<Self, UpstreamError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(std::time::Duration::from_secs(config.connect_timeout_secs))
            .build()?;
        Ok(Self { http, base_url: config.base_url, api_key: config.api_key })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self.http.request(method, format!("{}{path}", self.base_url));
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        builder
    }

    /// Read a response body; non-2xx becomes `Api` with an extracted message.
    async fn read_json(response: reqwest::Response) -> Result<Value, UpstreamError> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(UpstreamError::Api {
                status: status.as_u16(),
                message: extract_message(&body),
            });
        }
        serde_json::from_str(&body).map_err(|e| UpstreamError::Decode(e.to_string()))
    }
}

/// Best-effort extraction of a server-provided error message.
fn extract_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .or_else(|| v.get("error"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| GENERIC_REJECTION.to_string())
}

/// Lists arrive either bare (`[...]`) or wrapped (`{"data": [...]}`).
fn unwrap_list(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

fn offer_form(fields: Vec<(String, String)>, image: Option<ImageUpload>) -> Result<multipart::Form, UpstreamError> {
    let mut form = multipart::Form::new();
    for (key, value) in fields {
        form = form.text(key, value);
    }
    if let Some(image) = image {
        let part = multipart::Part::bytes(image.bytes)
            .file_name(image.filename)
            .mime_str(&image.content_type)
            .map_err(|e| UpstreamError::Decode(format!("banner content type: {e}")))?;
        form = form.part("bannerImage", part);
    }
    Ok(form)
}

#[async_trait]
impl CommerceApi for UpstreamClient {
    async fn list_accounts(&self, entity_type: &str) -> Result<Vec<AccountRef>, UpstreamError> {
        let response = self
            .request(reqwest::Method::GET, "/accounts")
            .query(&[("entityType", entity_type)])
            .send()
            .await?;
        let body = Self::read_json(response).await?;
        let accounts = unwrap_list(body)
            .into_iter()
            .filter_map(|v| serde_json::from_value::<AccountRef>(v).ok())
            .collect();
        Ok(accounts)
    }

    async fn create_voucher(&self, payload: &VoucherPayload) -> Result<VoucherReceipt, UpstreamError> {
        let response = self
            .request(reqwest::Method::POST, "/vouchers")
            .json(payload)
            .send()
            .await?;
        let body = Self::read_json(response).await?;

        // The backend reports soft failures inside a 200 envelope.
        if body.get("success").and_then(Value::as_bool) == Some(false) {
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or(GENERIC_REJECTION)
                .to_string();
            return Err(UpstreamError::Api { status: 200, message });
        }
        let data = body.get("data").cloned().unwrap_or(body);
        serde_json::from_value(data).map_err(|e| UpstreamError::Decode(e.to_string()))
    }

    async fn list_products(&self) -> Result<Vec<ProductSummary>, UpstreamError> {
        let response = self.request(reqwest::Method::GET, "/products").send().await?;
        let body = Self::read_json(response).await?;
        // Unparseable feed records are skipped, not fatal.
        Ok(unwrap_list(body)
            .iter()
            .filter_map(ProductSummary::from_value)
            .collect())
    }

    async fn create_offer(
        &self,
        fields: Vec<(String, String)>,
        image: Option<ImageUpload>,
    ) -> Result<Value, UpstreamError> {
        let form = offer_form(fields, image)?;
        let response = self
            .request(reqwest::Method::POST, "/offers")
            .multipart(form)
            .send()
            .await?;
        Self::read_json(response).await
    }

    async fn update_offer(
        &self,
        offer_id: &str,
        fields: Vec<(String, String)>,
        image: Option<ImageUpload>,
    ) -> Result<Value, UpstreamError> {
        let form = offer_form(fields, image)?;
        let response = self
            .request(reqwest::Method::PATCH, &format!("/offers/{offer_id}"))
            .multipart(form)
            .send()
            .await?;
        Self::read_json(response).await
    }
}
