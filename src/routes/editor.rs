//! Layout editor REST routes.
//!
//! The websocket carries the live editing traffic; these endpoints cover
//! the cold paths — opening the editor, deep-linking a preview, and the
//! module picker data.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::preview::{self, PreviewDocument, ViewMode};
use crate::services::editor::{self, EditorError, SessionSnapshot};
use crate::state::AppState;
use crate::{catalog, layout};

#[derive(Serialize)]
pub struct CatalogGroup {
    pub category: catalog::ModuleCategory,
    pub modules: Vec<&'static catalog::ModuleDescriptor>,
}

/// `GET /api/catalog` — module picker data, grouped by category.
pub async fn catalog() -> Json<Vec<CatalogGroup>> {
    let groups = [
        catalog::ModuleCategory::Navigation,
        catalog::ModuleCategory::Banners,
        catalog::ModuleCategory::Commerce,
        catalog::ModuleCategory::Marketing,
    ]
    .into_iter()
    .map(|category| CatalogGroup { category, modules: catalog::by_category(category) })
    .collect();
    Json(groups)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionResponse {
    pub session_id: Uuid,
}

/// `POST /api/editor` — open a fresh editor session.
pub async fn create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<CreateSessionResponse>) {
    let session_id = editor::create_session(&state).await;
    (StatusCode::CREATED, Json(CreateSessionResponse { session_id }))
}

/// `GET /api/editor/:id` — current layout snapshot.
pub async fn snapshot(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, StatusCode> {
    let snap = editor::snapshot(&state, session_id)
        .await
        .map_err(editor_error_to_status)?;
    Ok(Json(snap))
}

#[derive(Deserialize)]
pub struct PreviewQuery {
    pub mode: Option<String>,
}

/// `GET /api/editor/:id/preview?mode=mobile|desktop` — rendered preview.
pub async fn preview(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Query(query): Query<PreviewQuery>,
) -> Result<Json<PreviewDocument>, StatusCode> {
    let mode = ViewMode::parse(query.mode.as_deref());

    let sessions = state.sessions.read().await;
    let session = sessions.get(&session_id).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(preview::render(&session.layout, mode)))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishResponse {
    pub published: bool,
    pub modules: usize,
}

/// `POST /api/editor/:id/publish` — acknowledge a publish request.
///
/// Publishing to the storefront delivery pipeline is a separate system;
/// this endpoint validates the session and reports what would ship.
pub async fn publish(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<PublishResponse>, StatusCode> {
    let snap = editor::snapshot(&state, session_id)
        .await
        .map_err(editor_error_to_status)?;
    tracing::info!(%session_id, modules = snap.modules.len(), "publish acknowledged");
    Ok(Json(PublishResponse { published: false, modules: snap.modules.len() }))
}

pub(crate) fn editor_error_to_status(err: EditorError) -> StatusCode {
    match err {
        EditorError::SessionNotFound(_) => StatusCode::NOT_FOUND,
        EditorError::Layout(layout::LayoutError::InstanceNotFound(_)) => StatusCode::NOT_FOUND,
        EditorError::Layout(_) => StatusCode::CONFLICT,
    }
}

#[cfg(test)]
#[path = "editor_rest_test.rs"]
mod tests;
