//! WebSocket handler — bidirectional frame relay for the layout editor.
//!
//! DESIGN
//! ======
//! On upgrade, generates a client ID and enters a `select!` loop:
//! - Incoming client frames → parse + dispatch by syscall prefix
//! - Broadcast frames from session peers → forward to client
//!
//! Handler functions are pure business logic — they validate, mutate state,
//! and return an `Outcome`. The dispatch layer owns all outbound concerns:
//! reply to sender and broadcast to peers. Layout commands that land reach
//! every attached client, so two browser tabs on the same session stay in
//! lockstep.
//!
//! LIFECYCLE
//! =========
//! 1. Upgrade → send `session:connected` with `client_id`
//! 2. Client sends frames → dispatch → handler returns Outcome
//! 3. Dispatch applies Outcome (reply / broadcast / both)
//! 4. Close → broadcast `session:part` → detach client

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::frame::{Data, Frame};
use crate::services;
use crate::settings::ModuleSettings;
use crate::state::AppState;

// =============================================================================
// OUTCOME
// =============================================================================

/// Result returned by handler functions. The dispatch layer uses this to
/// decide who receives what — handlers never send frames directly.
enum Outcome {
    /// Broadcast done+data to ALL session clients including sender.
    /// Sender's copy carries `parent_id` for correlation.
    Broadcast(Data),
    /// Broadcast data to all session peers EXCLUDING sender. No reply to
    /// sender. Used for hover highlights (ephemeral).
    BroadcastExcludeSender(Data),
    /// Send done+data to sender only.
    Reply(Data),
    /// Send empty done to sender only.
    Done,
    /// Reply to sender with one payload, broadcast different data to peers.
    ReplyAndBroadcast { reply: Data, broadcast: Data },
}

// =============================================================================
// UPGRADE
// =============================================================================

pub async fn handle_ws(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_ws(socket, state))
}

// =============================================================================
// CONNECTION
// =============================================================================

async fn run_ws(mut socket: WebSocket, state: AppState) {
    let client_id = Uuid::new_v4();

    // Per-connection channel for receiving broadcast frames from peers.
    let (client_tx, mut client_rx) = mpsc::channel::<Frame>(256);

    let welcome =
        Frame::request("session:connected", Data::new()).with_data("client_id", client_id.to_string());
    if send_frame(&mut socket, &welcome).await.is_err() {
        return;
    }

    info!(%client_id, "ws: client connected");

    // Track which editor session this client has joined.
    let mut current_session: Option<Uuid> = None;

    loop {
        tokio::select! {
            msg = socket.recv() => {
                let Some(msg) = msg else { break };
                let Ok(msg) = msg else { break };
                match msg {
                    Message::Text(text) => {
                        dispatch_frame(&state, &mut socket, &mut current_session, client_id, &client_tx, &text).await;
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            Some(frame) = client_rx.recv() => {
                if send_frame(&mut socket, &frame).await.is_err() {
                    break;
                }
            }
        }
    }

    // Notify peers BEFORE detaching, so they still hold the sender list.
    if let Some(session_id) = current_session {
        let part_frame = Frame::request("session:part", Data::new())
            .with_session_id(session_id)
            .with_data("client_id", client_id.to_string());
        services::editor::broadcast(&state, session_id, &part_frame, Some(client_id)).await;

        services::editor::part_session(&state, session_id, client_id).await;
    }
    info!(%client_id, "ws: client disconnected");
}

// =============================================================================
// FRAME DISPATCH
// =============================================================================

/// Parse an incoming JSON frame, dispatch to handler, apply outcome.
async fn dispatch_frame(
    state: &AppState,
    socket: &mut WebSocket,
    current_session: &mut Option<Uuid>,
    client_id: Uuid,
    client_tx: &mpsc::Sender<Frame>,
    text: &str,
) {
    let sender_frames = process_inbound_text(state, current_session, client_id, client_tx, text).await;
    for frame in sender_frames {
        let _ = send_frame(socket, &frame).await;
    }
}

/// Parse and process one inbound text frame and return frames for the sender.
///
/// This keeps the websocket transport concerns separate from frame handling,
/// so tests can exercise dispatch and broadcast behavior end-to-end.
async fn process_inbound_text(
    state: &AppState,
    current_session: &mut Option<Uuid>,
    client_id: Uuid,
    client_tx: &mpsc::Sender<Frame>,
    text: &str,
) -> Vec<Frame> {
    let req: Frame = match serde_json::from_str(text) {
        Ok(r) => r,
        Err(e) => {
            warn!(%client_id, error = %e, "ws: invalid inbound frame");
            let err = Frame::request("gateway:error", Data::new())
                .with_data("message", format!("invalid json: {e}"));
            return vec![err];
        }
    };

    let prefix = req.prefix();
    let is_hover = req.syscall == "layout:hover";

    if !is_hover {
        info!(%client_id, id = %req.id, syscall = %req.syscall, status = ?req.status, "ws: recv frame");
    }

    // Dispatch to handler — returns Outcome or error Frame.
    let result = match prefix {
        "session" => handle_session(state, current_session, client_id, client_tx, &req).await,
        "layout" => handle_layout(state, *current_session, client_id, &req).await,
        _ => Err(req.error(format!("unknown prefix: {prefix}"))),
    };

    // Apply outcome — the dispatch layer owns all outbound logic.
    let session_id = *current_session;
    match result {
        Ok(Outcome::Broadcast(data)) => {
            let sender_frame = req.done_with(data);
            // Peers get a copy without parent_id (they didn't originate the request).
            let mut peer_frame = sender_frame.clone();
            peer_frame.id = Uuid::new_v4();
            peer_frame.parent_id = None;
            if let Some(sid) = session_id {
                services::editor::broadcast(state, sid, &peer_frame, Some(client_id)).await;
            }
            vec![sender_frame]
        }
        Ok(Outcome::BroadcastExcludeSender(data)) => {
            if let Some(sid) = session_id {
                let frame = Frame::request(&req.syscall, data).with_session_id(sid);
                services::editor::broadcast(state, sid, &frame, Some(client_id)).await;
            }
            vec![]
        }
        Ok(Outcome::Reply(data)) => {
            vec![req.done_with(data)]
        }
        Ok(Outcome::Done) => {
            vec![req.done()]
        }
        Ok(Outcome::ReplyAndBroadcast { reply, broadcast }) => {
            let sender_frame = req.done_with(reply);
            if let Some(sid) = session_id {
                let notif = Frame::request(&req.syscall, broadcast).with_session_id(sid);
                services::editor::broadcast(state, sid, &notif, Some(client_id)).await;
            }
            vec![sender_frame]
        }
        Err(err_frame) => {
            vec![err_frame]
        }
    }
}

// =============================================================================
// SESSION HANDLERS
// =============================================================================

async fn handle_session(
    state: &AppState,
    current_session: &mut Option<Uuid>,
    client_id: Uuid,
    client_tx: &mpsc::Sender<Frame>,
    req: &Frame,
) -> Result<Outcome, Frame> {
    let op = req.syscall.split_once(':').map_or("", |(_, op)| op);

    match op {
        "join" => {
            let Some(session_id) = req.session_id.or_else(|| {
                req.data
                    .get("session_id")
                    .and_then(|v| v.as_str())
                    .and_then(|s| s.parse().ok())
            }) else {
                return Err(req.error("session_id required"));
            };

            // Part the current session if already joined.
            if let Some(old_session) = current_session.take() {
                services::editor::part_session(state, old_session, client_id).await;
            }

            match services::editor::join_session(state, session_id, client_id, client_tx.clone()).await {
                Ok(snap) => {
                    *current_session = Some(session_id);

                    let mut reply = Data::new();
                    reply.insert("modules".into(), serde_json::to_value(&snap.modules).unwrap_or_default());
                    reply.insert(
                        "selection".into(),
                        serde_json::to_value(&snap.selection).unwrap_or_default(),
                    );

                    let mut broadcast = Data::new();
                    broadcast.insert("client_id".into(), serde_json::json!(client_id));

                    Ok(Outcome::ReplyAndBroadcast { reply, broadcast })
                }
                Err(e) => Err(req.error_from(&e)),
            }
        }
        _ => Err(req.error(format!("unknown session op: {op}"))),
    }
}

// =============================================================================
// LAYOUT HANDLERS
// =============================================================================

async fn handle_layout(
    state: &AppState,
    current_session: Option<Uuid>,
    client_id: Uuid,
    req: &Frame,
) -> Result<Outcome, Frame> {
    let Some(session_id) = current_session else {
        return Err(req.error("must join a session first"));
    };

    let op = req.syscall.split_once(':').map_or("", |(_, op)| op);

    match op {
        "insert" => {
            let Some(tag) = req.data.get("module_type").and_then(|v| v.as_str()) else {
                return Err(req.error("module_type required"));
            };
            let position = req
                .data
                .get("position")
                .and_then(serde_json::Value::as_u64)
                .and_then(|p| usize::try_from(p).ok())
                .unwrap_or(usize::MAX);

            match services::editor::insert_module(state, session_id, tag, position).await {
                Ok(placement) => Ok(Outcome::Broadcast(placement_to_data(&placement))),
                Err(e) => Err(req.error_from(&e)),
            }
        }
        "move_up" | "move_down" => {
            let instance_id = require_str(req, "instance_id")?;
            let result = if op == "move_up" {
                services::editor::move_module_up(state, session_id, instance_id).await
            } else {
                services::editor::move_module_down(state, session_id, instance_id).await
            };
            match result {
                Ok(crate::layout::Shift::Moved { from, to }) => {
                    let mut data = Data::new();
                    data.insert("instance_id".into(), serde_json::json!(instance_id));
                    data.insert("moved".into(), serde_json::json!(true));
                    data.insert("from".into(), serde_json::json!(from));
                    data.insert("to".into(), serde_json::json!(to));
                    Ok(Outcome::Broadcast(data))
                }
                // Boundary hits change nothing; peers don't need to hear about them.
                Ok(crate::layout::Shift::AtBoundary) => {
                    let mut data = Data::new();
                    data.insert("instance_id".into(), serde_json::json!(instance_id));
                    data.insert("moved".into(), serde_json::json!(false));
                    Ok(Outcome::Reply(data))
                }
                Err(e) => Err(req.error_from(&e)),
            }
        }
        "duplicate" => {
            let instance_id = require_str(req, "instance_id")?;
            match services::editor::duplicate_module(state, session_id, instance_id).await {
                Ok(placement) => Ok(Outcome::Broadcast(placement_to_data(&placement))),
                Err(e) => Err(req.error_from(&e)),
            }
        }
        "remove" => {
            let instance_id = require_str(req, "instance_id")?;
            match services::editor::remove_module(state, session_id, instance_id).await {
                Ok(removed) => {
                    let mut data = Data::new();
                    data.insert("instance_id".into(), serde_json::json!(removed.id));
                    Ok(Outcome::Broadcast(data))
                }
                Err(e) => Err(req.error_from(&e)),
            }
        }
        "select" => {
            let instance_id = req.data.get("instance_id").and_then(|v| v.as_str());
            let catalog_tag = req.data.get("module_type").and_then(|v| v.as_str());
            match services::editor::select(state, session_id, instance_id, catalog_tag).await {
                Ok(selection) => {
                    let mut data = Data::new();
                    data.insert("selection".into(), serde_json::to_value(&selection).unwrap_or_default());
                    Ok(Outcome::Broadcast(data))
                }
                Err(e) => Err(req.error_from(&e)),
            }
        }
        "configure" => {
            let instance_id = require_str(req, "instance_id")?.to_string();
            let Some(raw) = req.data.get("settings") else {
                return Err(req.error("settings required"));
            };
            let settings: ModuleSettings = match serde_json::from_value(raw.clone()) {
                Ok(s) => s,
                Err(e) => return Err(req.error(format!("invalid settings: {e}"))),
            };
            match services::editor::configure_module(state, session_id, &instance_id, settings).await {
                Ok(module) => {
                    let mut data = Data::new();
                    data.insert("module".into(), serde_json::to_value(&module).unwrap_or_default());
                    Ok(Outcome::Broadcast(data))
                }
                Err(e) => Err(req.error_from(&e)),
            }
        }
        "hover" => {
            // Ephemeral highlight, relayed verbatim to peers. `position` may
            // be null to clear the highlight.
            let mut data = Data::new();
            data.insert("client_id".into(), serde_json::json!(client_id));
            data.insert(
                "position".into(),
                req.data.get("position").cloned().unwrap_or(serde_json::Value::Null),
            );
            Ok(Outcome::BroadcastExcludeSender(data))
        }
        _ => Err(req.error(format!("unknown layout op: {op}"))),
    }
}

// =============================================================================
// HELPERS
// =============================================================================

fn require_str<'a>(req: &'a Frame, key: &str) -> Result<&'a str, Frame> {
    req.data
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| req.error(format!("{key} required")))
}

fn placement_to_data(placement: &services::editor::Placement) -> Data {
    let mut data = Data::new();
    data.insert("position".into(), serde_json::json!(placement.position));
    data.insert(
        "module".into(),
        serde_json::to_value(&placement.module).unwrap_or_default(),
    );
    data
}

async fn send_frame(socket: &mut WebSocket, frame: &Frame) -> Result<(), ()> {
    let json = match serde_json::to_string(frame) {
        Ok(j) => j,
        Err(e) => {
            warn!(error = %e, "ws: failed to serialize frame");
            return Err(());
        }
    };
    let is_hover = frame.syscall == "layout:hover";
    if !is_hover {
        if frame.status == crate::frame::Status::Error {
            let code = frame.data.get("code").and_then(|v| v.as_str()).unwrap_or("-");
            let message = frame.data.get("message").and_then(|v| v.as_str()).unwrap_or("-");
            warn!(id = %frame.id, syscall = %frame.syscall, code, message, "ws: send frame status=Error");
        } else {
            info!(id = %frame.id, syscall = %frame.syscall, status = ?frame.status, "ws: send frame");
        }
    }
    socket.send(Message::Text(json.into())).await.map_err(|_| ())
}

#[cfg(test)]
#[path = "ws_test.rs"]
mod tests;
