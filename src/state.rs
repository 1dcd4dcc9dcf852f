//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the upstream commerce client and a map of live editor
//! sessions. Each session has its own in-memory layout sequence and
//! connected clients; nothing here persists — a layout lives exactly as
//! long as its session.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{RwLock, mpsc};
use uuid::Uuid;

use crate::frame::Frame;
use crate::layout::LayoutSequence;
use crate::upstream::CommerceApi;

// =============================================================================
// EDITOR SESSION
// =============================================================================

/// Per-session live state. One layout under edit, shared by every client
/// attached to the session.
pub struct EditorSession {
    pub layout: LayoutSequence,
    /// Connected clients: `client_id` -> sender for outgoing frames.
    pub clients: HashMap<Uuid, mpsc::Sender<Frame>>,
}

impl EditorSession {
    /// Fresh session with the category bar seeded in slot 0.
    #[must_use]
    pub fn new() -> Self {
        Self { layout: LayoutSequence::seeded(), clients: HashMap::new() }
    }
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// APP STATE
// =============================================================================

/// Shared application state. Clone is required by Axum — all inner fields
/// are Arc-wrapped or Clone.
#[derive(Clone)]
pub struct AppState {
    /// Optional commerce backend. `None` when upstream env vars are not
    /// configured; voucher/offer/account routes then answer 503 while the
    /// editor keeps working.
    pub upstream: Option<Arc<dyn CommerceApi>>,
    pub sessions: Arc<RwLock<HashMap<Uuid, EditorSession>>>,
}

impl AppState {
    #[must_use]
    pub fn new(upstream: Option<Arc<dyn CommerceApi>>) -> Self {
        Self { upstream, sessions: Arc::new(RwLock::new(HashMap::new())) }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
