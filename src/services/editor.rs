//! Editor service — session lifecycle and layout commands.
//!
//! DESIGN
//! ======
//! Every layout mutation funnels through here: the websocket dispatch and
//! the REST handlers both call these functions, which take the sessions
//! lock, apply the operation to the session's `LayoutSequence`, and return
//! the applied change for broadcast. Sessions are purely in-memory and
//! live for the process lifetime — a layout is gone when the process is;
//! publishing it somewhere durable is a different system's job.

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::info;
use uuid::Uuid;

use crate::frame::Frame;
use crate::layout::{ActiveModule, LayoutError, Selection, Shift};
use crate::settings::ModuleSettings;
use crate::state::{AppState, EditorSession};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("editor session not found: {0}")]
    SessionNotFound(Uuid),
    #[error(transparent)]
    Layout(#[from] LayoutError),
}

impl crate::frame::ErrorCode for EditorError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::SessionNotFound(_) => "E_SESSION_NOT_FOUND",
            Self::Layout(e) => e.error_code(),
        }
    }
}

/// Full session state, sent on join and via the REST snapshot.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub modules: Vec<ActiveModule>,
    pub selection: Selection,
}

/// An insert or duplicate that landed: where, and what.
#[derive(Debug, Clone, Serialize)]
pub struct Placement {
    pub position: usize,
    pub module: ActiveModule,
}

// =============================================================================
// SESSION LIFECYCLE
// =============================================================================

/// Create a new editor session, seeded with the category bar.
pub async fn create_session(state: &AppState) -> Uuid {
    let session_id = Uuid::new_v4();
    let mut sessions = state.sessions.write().await;
    sessions.insert(session_id, EditorSession::new());
    info!(%session_id, "editor session created");
    session_id
}

/// Attach a client to a session and return the current snapshot.
///
/// # Errors
///
/// `SessionNotFound`.
pub async fn join_session(
    state: &AppState,
    session_id: Uuid,
    client_id: Uuid,
    tx: mpsc::Sender<Frame>,
) -> Result<SessionSnapshot, EditorError> {
    let mut sessions = state.sessions.write().await;
    let session = sessions
        .get_mut(&session_id)
        .ok_or(EditorError::SessionNotFound(session_id))?;
    session.clients.insert(client_id, tx);
    info!(%session_id, %client_id, clients = session.clients.len(), "client joined session");
    Ok(snapshot_of(session_id, session))
}

/// Detach a client. The session itself stays — the layout must survive
/// everyone closing their browser tab.
pub async fn part_session(state: &AppState, session_id: Uuid, client_id: Uuid) {
    let mut sessions = state.sessions.write().await;
    let Some(session) = sessions.get_mut(&session_id) else {
        return;
    };
    session.clients.remove(&client_id);
    info!(%session_id, %client_id, remaining = session.clients.len(), "client left session");
}

/// Current snapshot of a session.
///
/// # Errors
///
/// `SessionNotFound`.
pub async fn snapshot(state: &AppState, session_id: Uuid) -> Result<SessionSnapshot, EditorError> {
    let sessions = state.sessions.read().await;
    let session = sessions
        .get(&session_id)
        .ok_or(EditorError::SessionNotFound(session_id))?;
    Ok(snapshot_of(session_id, session))
}

fn snapshot_of(session_id: Uuid, session: &EditorSession) -> SessionSnapshot {
    SessionSnapshot {
        session_id,
        modules: session.layout.modules().to_vec(),
        selection: session.layout.selection().clone(),
    }
}

/// Send a frame to every client of a session, except `exclude`.
pub async fn broadcast(state: &AppState, session_id: Uuid, frame: &Frame, exclude: Option<Uuid>) {
    let sessions = state.sessions.read().await;
    let Some(session) = sessions.get(&session_id) else {
        return;
    };
    for (client_id, tx) in &session.clients {
        if exclude == Some(*client_id) {
            continue;
        }
        // Best-effort: if a client's channel is full, skip it.
        let _ = tx.try_send(frame.clone());
    }
}

// =============================================================================
// LAYOUT COMMANDS
// =============================================================================

async fn with_session<T>(
    state: &AppState,
    session_id: Uuid,
    op: impl FnOnce(&mut EditorSession) -> Result<T, LayoutError>,
) -> Result<T, EditorError> {
    let mut sessions = state.sessions.write().await;
    let session = sessions
        .get_mut(&session_id)
        .ok_or(EditorError::SessionNotFound(session_id))?;
    Ok(op(session)?)
}

/// Place a catalog module at a position.
///
/// # Errors
///
/// `SessionNotFound`, or the layout rejection (unknown/disabled tag).
pub async fn insert_module(
    state: &AppState,
    session_id: Uuid,
    tag: &str,
    position: usize,
) -> Result<Placement, EditorError> {
    with_session(state, session_id, |session| {
        let (position, module) = session.layout.insert(tag, position)?;
        Ok(Placement { position, module })
    })
    .await
}

/// Swap a module with its predecessor.
///
/// # Errors
///
/// `SessionNotFound`, `InstanceNotFound`, or `PinnedModule`.
pub async fn move_module_up(state: &AppState, session_id: Uuid, instance_id: &str) -> Result<Shift, EditorError> {
    with_session(state, session_id, |session| session.layout.move_up(instance_id)).await
}

/// Swap a module with its successor.
///
/// # Errors
///
/// `SessionNotFound`, `InstanceNotFound`, or `PinnedModule`.
pub async fn move_module_down(
    state: &AppState,
    session_id: Uuid,
    instance_id: &str,
) -> Result<Shift, EditorError> {
    with_session(state, session_id, |session| session.layout.move_down(instance_id)).await
}

/// Clone a module in place.
///
/// # Errors
///
/// `SessionNotFound` or `InstanceNotFound`.
pub async fn duplicate_module(
    state: &AppState,
    session_id: Uuid,
    instance_id: &str,
) -> Result<Placement, EditorError> {
    with_session(state, session_id, |session| {
        let (position, module) = session.layout.duplicate(instance_id)?;
        Ok(Placement { position, module })
    })
    .await
}

/// Remove a module. Pinned category bar is rejected with a warning the
/// dispatch layer surfaces to the merchant.
///
/// # Errors
///
/// `SessionNotFound`, `InstanceNotFound`, or `PinnedModule`.
pub async fn remove_module(
    state: &AppState,
    session_id: Uuid,
    instance_id: &str,
) -> Result<ActiveModule, EditorError> {
    with_session(state, session_id, |session| session.layout.remove(instance_id)).await
}

/// Update the selection: a placed module, a catalog item, or nothing.
///
/// # Errors
///
/// `SessionNotFound`, `InstanceNotFound`, or `UnknownModule`.
pub async fn select(
    state: &AppState,
    session_id: Uuid,
    instance_id: Option<&str>,
    catalog_tag: Option<&str>,
) -> Result<Selection, EditorError> {
    with_session(state, session_id, |session| {
        match (instance_id, catalog_tag) {
            (Some(id), _) => session.layout.select_module(id)?,
            (None, Some(tag)) => session.layout.select_catalog_item(tag)?,
            (None, None) => session.layout.clear_selection(),
        }
        Ok(session.layout.selection().clone())
    })
    .await
}

/// Replace a module's settings.
///
/// # Errors
///
/// `SessionNotFound`, `InstanceNotFound`, or `SettingsMismatch`.
pub async fn configure_module(
    state: &AppState,
    session_id: Uuid,
    instance_id: &str,
    settings: ModuleSettings,
) -> Result<ActiveModule, EditorError> {
    with_session(state, session_id, |session| session.layout.configure(instance_id, settings)).await
}

#[cfg(test)]
#[path = "editor_test.rs"]
mod tests;
