//! Wire types for the commerce backend.
//!
//! DESIGN
//! ======
//! Request payloads are strict — we control them. Responses are parsed
//! defensively: the product listing in particular is a heterogeneous feed
//! where half the fields are optional or nested differently per product
//! source, so every field is probed with fallbacks instead of a rigid
//! derive.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::voucher::VoucherType;

// =============================================================================
// CHART OF ACCOUNTS
// =============================================================================

/// One ledger account from the chart-of-accounts query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountRef {
    pub id: String,
    pub code: String,
    pub name: String,
}

// =============================================================================
// VOUCHER CREATION
// =============================================================================

/// Voucher creation request body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoucherPayload {
    pub voucher_type: VoucherType,
    pub entity_type: String,
    /// RFC 3339 timestamp, normalized to UTC midnight.
    pub voucher_date: String,
    pub narration: String,
    pub entries: Vec<VoucherEntryPayload>,
}

/// One voucher entry. Both columns are always present as fixed-point
/// decimal strings; the unused side is `"0.00"`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoucherEntryPayload {
    pub account_id: String,
    pub debit_amount: String,
    pub credit_amount: String,
}

/// Successful voucher creation result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoucherReceipt {
    pub voucher_number: String,
}

// =============================================================================
// PRODUCTS
// =============================================================================

/// Normalized product record for the offer product selector.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub id: String,
    pub name: String,
    pub price: Option<f64>,
    pub image_url: Option<String>,
    pub stock: u64,
}

impl ProductSummary {
    /// Best-effort extraction from one feed record. Returns `None` only
    /// when no usable identifier exists; everything else falls back.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        let id = string_at(value, "id")
            .or_else(|| string_at(value, "productId"))
            .or_else(|| string_at(value, "sku"))?;

        let name = string_at(value, "name")
            .or_else(|| string_at(value, "title"))
            .unwrap_or_else(|| "Untitled product".to_string());

        let price = number_at(value, "price")
            .or_else(|| value.get("pricing").and_then(|p| number_at(p, "salePrice")))
            .or_else(|| value.get("pricing").and_then(|p| number_at(p, "listPrice")))
            .or_else(|| {
                value
                    .get("variants")
                    .and_then(Value::as_array)
                    .and_then(|v| v.first())
                    .and_then(|v| number_at(v, "price"))
            });

        let image_url = string_at(value, "imageUrl")
            .or_else(|| string_at(value, "image"))
            .or_else(|| {
                let first = value.get("images").and_then(Value::as_array).and_then(|i| i.first())?;
                first
                    .as_str()
                    .map(str::to_string)
                    .or_else(|| string_at(first, "url"))
            });

        let stock = value
            .get("stock")
            .and_then(Value::as_u64)
            .or_else(|| {
                value
                    .get("inventory")
                    .and_then(|i| i.get("available"))
                    .and_then(Value::as_u64)
            })
            .unwrap_or(0);

        Some(Self { id, name, price, image_url, stock })
    }
}

/// String field that may arrive as a string or a number.
fn string_at(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Numeric field that may arrive as a number or a numeric string.
fn number_at(value: &Value, key: &str) -> Option<f64> {
    match value.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
