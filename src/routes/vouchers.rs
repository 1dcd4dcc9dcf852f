//! Voucher entry routes.
//!
//! ERROR HANDLING
//! ==============
//! A rejected draft is the merchant's problem (422 with the first failing
//! rule); a rejected forward is the backend's (502 with its message). The
//! client keeps the draft intact in both cases so nothing is retyped.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::services::voucher::{self, VoucherSubmitError};
use crate::state::AppState;
use crate::upstream::UpstreamError;
use crate::upstream::types::AccountRef;
use crate::voucher::VoucherDraft;

type ApiError = (StatusCode, Json<Value>);

/// `POST /api/vouchers` — validate and create a voucher.
pub async fn create_voucher(
    State(state): State<AppState>,
    Json(draft): Json<VoucherDraft>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let receipt = voucher::submit(&state, &draft).await.map_err(submit_error)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "voucherNumber": receipt.voucher_number })),
    ))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountsQuery {
    pub entity_type: Option<String>,
}

/// `GET /api/accounts?entityType=` — chart of accounts for the line picker.
pub async fn list_accounts(
    State(state): State<AppState>,
    Query(query): Query<AccountsQuery>,
) -> Result<Json<Vec<AccountRef>>, ApiError> {
    let entity_type = query.entity_type.as_deref().unwrap_or("COMPANY");
    let accounts = voucher::list_accounts(&state, entity_type)
        .await
        .map_err(submit_error)?;
    Ok(Json(accounts))
}

pub(crate) fn submit_error(err: VoucherSubmitError) -> ApiError {
    let (status, message) = match &err {
        VoucherSubmitError::Validation(e) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
        VoucherSubmitError::Upstream(UpstreamError::Api { message, .. }) => {
            (StatusCode::BAD_GATEWAY, message.clone())
        }
        VoucherSubmitError::Upstream(e) => (StatusCode::BAD_GATEWAY, e.to_string()),
        VoucherSubmitError::NotConfigured => (StatusCode::SERVICE_UNAVAILABLE, err.to_string()),
    };
    (status, Json(json!({ "message": message })))
}

#[cfg(test)]
#[path = "vouchers_test.rs"]
mod tests;
