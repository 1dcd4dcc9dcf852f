//! Offer service — reconcile, validate, forward.
//!
//! DESIGN
//! ======
//! The draft is reconciled against the type configuration table before
//! validation, so a stale sub-config from a previous offer type can never
//! reach the backend. The banner image and the offer record travel in one
//! multipart request; atomicity between them is the backend's problem.

use serde_json::Value;
use tracing::info;

use crate::offers::{self, ImageUpload, OfferDraft, OfferValidationError};
use crate::state::AppState;
use crate::upstream::UpstreamError;
use crate::upstream::types::ProductSummary;

#[derive(Debug, thiserror::Error)]
pub enum OfferSubmitError {
    #[error(transparent)]
    Validation(#[from] OfferValidationError),
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    #[error("commerce backend is not configured")]
    NotConfigured,
}

fn prepare(
    mut draft: OfferDraft,
    image: Option<&ImageUpload>,
) -> Result<Vec<(String, String)>, OfferValidationError> {
    offers::reconcile(&mut draft);
    offers::validate(&draft)?;
    if let Some(image) = image {
        offers::validate_image(image)?;
    }
    Ok(offers::encode_form(&draft))
}

/// Create an offer.
///
/// # Errors
///
/// `Validation` before any network call, `Upstream` after, or
/// `NotConfigured` when the backend is absent.
pub async fn create(
    state: &AppState,
    draft: OfferDraft,
    image: Option<ImageUpload>,
) -> Result<Value, OfferSubmitError> {
    let upstream = state.upstream.as_ref().ok_or(OfferSubmitError::NotConfigured)?;
    let offer_type = draft.offer_type;
    let fields = prepare(draft, image.as_ref())?;
    let created = upstream.create_offer(fields, image).await?;
    info!(?offer_type, "offer created");
    Ok(created)
}

/// Update an existing offer.
///
/// # Errors
///
/// Same classes as [`create`].
pub async fn update(
    state: &AppState,
    offer_id: &str,
    draft: OfferDraft,
    image: Option<ImageUpload>,
) -> Result<Value, OfferSubmitError> {
    let upstream = state.upstream.as_ref().ok_or(OfferSubmitError::NotConfigured)?;
    let fields = prepare(draft, image.as_ref())?;
    let updated = upstream.update_offer(offer_id, fields, image).await?;
    info!(%offer_id, "offer updated");
    Ok(updated)
}

/// Product listing proxy for the offer product selector.
///
/// # Errors
///
/// `Upstream` or `NotConfigured`.
pub async fn list_products(state: &AppState) -> Result<Vec<ProductSummary>, OfferSubmitError> {
    let upstream = state.upstream.as_ref().ok_or(OfferSubmitError::NotConfigured)?;
    Ok(upstream.list_products().await?)
}
