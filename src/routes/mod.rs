//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! This module binds the admin API surface: REST endpoints for the layout
//! editor, voucher entry, and offer dialogs, plus the websocket endpoint
//! the editor's live preview runs over. The admin frontend is served
//! elsewhere; this process is API-only.

pub mod editor;
pub mod offers;
pub mod vouchers;
pub mod ws;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::offers::MAX_IMAGE_BYTES;
use crate::state::AppState;

/// Body cap for the multipart offer routes. Axum's default limit equals
/// the banner image cap, so an image at or near the cap would be cut off
/// at the transport before image validation could reject it with a
/// structured 422. Headroom covers the payload part plus part framing.
const OFFER_BODY_LIMIT: usize = MAX_IMAGE_BYTES + 64 * 1024;

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/catalog", get(editor::catalog))
        .route("/api/editor", post(editor::create_session))
        .route("/api/editor/{id}", get(editor::snapshot))
        .route("/api/editor/{id}/preview", get(editor::preview))
        .route("/api/editor/{id}/publish", post(editor::publish))
        .route("/api/accounts", get(vouchers::list_accounts))
        .route("/api/vouchers", post(vouchers::create_voucher))
        .route("/api/products", get(offers::list_products))
        .route(
            "/api/offers",
            post(offers::create_offer).layer(DefaultBodyLimit::max(OFFER_BODY_LIMIT)),
        )
        .route(
            "/api/offers/{id}",
            patch(offers::update_offer).layer(DefaultBodyLimit::max(OFFER_BODY_LIMIT)),
        )
        .route("/api/ws", get(ws::handle_ws))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
