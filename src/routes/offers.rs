//! Promotional offer routes.
//!
//! DESIGN
//! ======
//! Offers arrive as multipart: a `payload` part carrying the form JSON
//! and an optional `bannerImage` file part. The service layer reconciles
//! and validates before anything leaves this process; the backend owns
//! atomicity between the record and its image.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde_json::{Value, json};

use crate::offers::{ImageUpload, OfferDraft};
use crate::services::offer::{self, OfferSubmitError};
use crate::state::AppState;
use crate::upstream::UpstreamError;
use crate::upstream::types::ProductSummary;

type ApiError = (StatusCode, Json<Value>);

/// `POST /api/offers` — create an offer, banner image optional.
pub async fn create_offer(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let (draft, image) = read_offer_parts(multipart).await?;
    let created = offer::create(&state, draft, image).await.map_err(submit_error)?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `PATCH /api/offers/:id` — update an offer.
pub async fn update_offer(
    State(state): State<AppState>,
    Path(offer_id): Path<String>,
    multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let (draft, image) = read_offer_parts(multipart).await?;
    let updated = offer::update(&state, &offer_id, draft, image)
        .await
        .map_err(submit_error)?;
    Ok(Json(updated))
}

/// `GET /api/products` — product listing for the offer target picker.
pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProductSummary>>, ApiError> {
    let products = offer::list_products(&state).await.map_err(submit_error)?;
    Ok(Json(products))
}

/// Pull the `payload` JSON part and the optional `bannerImage` part out of
/// a multipart body.
async fn read_offer_parts(mut multipart: Multipart) -> Result<(OfferDraft, Option<ImageUpload>), ApiError> {
    let mut draft: Option<OfferDraft> = None;
    let mut image: Option<ImageUpload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_owned();
        match name.as_str() {
            "payload" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| bad_request(format!("unreadable payload part: {e}")))?;
                let parsed = serde_json::from_slice(&bytes)
                    .map_err(|e| bad_request(format!("invalid offer payload: {e}")))?;
                draft = Some(parsed);
            }
            "bannerImage" => {
                let filename = field.file_name().unwrap_or("banner").to_owned();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_owned();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| bad_request(format!("unreadable image part: {e}")))?;
                image = Some(ImageUpload { filename, content_type, bytes: bytes.to_vec() });
            }
            // Unknown parts are skipped, not rejected.
            _ => {}
        }
    }

    let draft = draft.ok_or_else(|| bad_request("payload part required".to_owned()))?;
    Ok((draft, image))
}

fn bad_request(message: String) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(json!({ "message": message })))
}

pub(crate) fn submit_error(err: OfferSubmitError) -> ApiError {
    let (status, message) = match &err {
        OfferSubmitError::Validation(e) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
        OfferSubmitError::Upstream(UpstreamError::Api { message, .. }) => {
            (StatusCode::BAD_GATEWAY, message.clone())
        }
        OfferSubmitError::Upstream(e) => (StatusCode::BAD_GATEWAY, e.to_string()),
        OfferSubmitError::NotConfigured => (StatusCode::SERVICE_UNAVAILABLE, err.to_string()),
    };
    (status, Json(json!({ "message": message })))
}

#[cfg(test)]
#[path = "offers_rest_test.rs"]
mod tests;
