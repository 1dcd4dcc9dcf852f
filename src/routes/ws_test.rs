use super::*;
use crate::frame::Status;
use crate::state::test_helpers;
use serde_json::json;
use tokio::time::{Duration, timeout};

fn request_text(session_id: Uuid, syscall: &str, data: Data) -> String {
    let req = Frame::request(syscall, data).with_session_id(session_id);
    serde_json::to_string(&req).expect("request should serialize")
}

async fn recv_broadcast(rx: &mut mpsc::Receiver<Frame>) -> Frame {
    timeout(Duration::from_millis(500), rx.recv())
        .await
        .expect("broadcast receive timed out")
        .expect("broadcast channel closed unexpectedly")
}

async fn assert_no_broadcast(rx: &mut mpsc::Receiver<Frame>) {
    assert!(
        timeout(Duration::from_millis(80), rx.recv()).await.is_err(),
        "expected no broadcast frame"
    );
}

/// Join a session through the dispatch path and return the sender frames.
async fn join(
    state: &AppState,
    session_id: Uuid,
    current: &mut Option<Uuid>,
    client_id: Uuid,
    tx: &mpsc::Sender<Frame>,
) -> Vec<Frame> {
    let text = request_text(session_id, "session:join", Data::new());
    process_inbound_text(state, current, client_id, tx, &text).await
}

#[tokio::test]
async fn join_replies_with_snapshot() {
    let state = test_helpers::test_app_state();
    let session_id = test_helpers::seed_session(&state).await;
    let client = Uuid::new_v4();
    let (tx, _rx) = mpsc::channel::<Frame>(8);
    let mut current = None;

    let replies = join(&state, session_id, &mut current, client, &tx).await;
    assert_eq!(current, Some(session_id));
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].status, Status::Done);

    let modules = replies[0].data.get("modules").and_then(|v| v.as_array()).unwrap();
    assert_eq!(modules.len(), 1);
    assert_eq!(modules[0]["moduleType"], "categoryBar");
}

#[tokio::test]
async fn join_notifies_existing_peers() {
    let state = test_helpers::test_app_state();
    let session_id = test_helpers::seed_session(&state).await;

    let (tx_a, mut rx_a) = mpsc::channel::<Frame>(8);
    let mut current_a = None;
    join(&state, session_id, &mut current_a, Uuid::new_v4(), &tx_a).await;

    let (tx_b, _rx_b) = mpsc::channel::<Frame>(8);
    let mut current_b = None;
    join(&state, session_id, &mut current_b, Uuid::new_v4(), &tx_b).await;

    let notif = recv_broadcast(&mut rx_a).await;
    assert_eq!(notif.syscall, "session:join");
    assert_eq!(notif.status, Status::Request);
}

#[tokio::test]
async fn join_unknown_session_returns_error_code() {
    let state = test_helpers::test_app_state();
    let (tx, _rx) = mpsc::channel::<Frame>(8);
    let mut current = None;

    let replies = join(&state, Uuid::new_v4(), &mut current, Uuid::new_v4(), &tx).await;
    assert_eq!(replies[0].status, Status::Error);
    assert_eq!(replies[0].data["code"], "E_SESSION_NOT_FOUND");
    assert_eq!(current, None);
}

#[tokio::test]
async fn layout_op_before_join_is_rejected() {
    let state = test_helpers::test_app_state();
    let client = Uuid::new_v4();
    let (tx, _rx) = mpsc::channel::<Frame>(8);
    let mut current = None;

    let mut data = Data::new();
    data.insert("module_type".into(), json!("voucher"));
    let text = request_text(Uuid::new_v4(), "layout:insert", data);
    let replies = process_inbound_text(&state, &mut current, client, &tx, &text).await;

    assert_eq!(replies[0].status, Status::Error);
    assert_eq!(replies[0].data["message"], "must join a session first");
}

#[tokio::test]
async fn insert_broadcasts_to_peers() {
    let state = test_helpers::test_app_state();
    let session_id = test_helpers::seed_session(&state).await;

    let sender = Uuid::new_v4();
    let (tx_sender, mut rx_sender) = mpsc::channel::<Frame>(8);
    let mut current_sender = None;
    join(&state, session_id, &mut current_sender, sender, &tx_sender).await;

    let (tx_peer, mut rx_peer) = mpsc::channel::<Frame>(8);
    let mut current_peer = None;
    join(&state, session_id, &mut current_peer, Uuid::new_v4(), &tx_peer).await;
    let _ = recv_broadcast(&mut rx_sender).await; // peer's join notification

    let mut data = Data::new();
    data.insert("module_type".into(), json!("voucher"));
    data.insert("position".into(), json!(1));
    let text = request_text(session_id, "layout:insert", data);
    let replies = process_inbound_text(&state, &mut current_sender, sender, &tx_sender, &text).await;

    // Sender gets a correlated done frame.
    assert_eq!(replies[0].status, Status::Done);
    assert!(replies[0].parent_id.is_some());
    assert_eq!(replies[0].data["module"]["moduleType"], "voucher");

    // Peer gets an uncorrelated copy; sender's own channel stays quiet.
    let peer_copy = recv_broadcast(&mut rx_peer).await;
    assert_eq!(peer_copy.syscall, "layout:insert");
    assert!(peer_copy.parent_id.is_none());
    assert_eq!(peer_copy.data["position"], 1);
    assert_no_broadcast(&mut rx_sender).await;
}

#[tokio::test]
async fn insert_unknown_module_returns_error_code() {
    let state = test_helpers::test_app_state();
    let session_id = test_helpers::seed_session(&state).await;
    let client = Uuid::new_v4();
    let (tx, _rx) = mpsc::channel::<Frame>(8);
    let mut current = None;
    join(&state, session_id, &mut current, client, &tx).await;

    let mut data = Data::new();
    data.insert("module_type".into(), json!("heroVideo"));
    let text = request_text(session_id, "layout:insert", data);
    let replies = process_inbound_text(&state, &mut current, client, &tx, &text).await;

    assert_eq!(replies[0].status, Status::Error);
    assert_eq!(replies[0].data["code"], "E_UNKNOWN_MODULE");
}

#[tokio::test]
async fn remove_pinned_bar_returns_error_code() {
    let state = test_helpers::test_app_state();
    let session_id = test_helpers::seed_session(&state).await;
    let client = Uuid::new_v4();
    let (tx, _rx) = mpsc::channel::<Frame>(8);
    let mut current = None;

    let replies = join(&state, session_id, &mut current, client, &tx).await;
    let bar_id = replies[0].data["modules"][0]["id"].as_str().unwrap().to_string();

    let mut data = Data::new();
    data.insert("instance_id".into(), json!(bar_id));
    let text = request_text(session_id, "layout:remove", data);
    let replies = process_inbound_text(&state, &mut current, client, &tx, &text).await;

    assert_eq!(replies[0].status, Status::Error);
    assert_eq!(replies[0].data["code"], "E_PINNED_MODULE");
}

#[tokio::test]
async fn move_at_boundary_replies_without_broadcast() {
    let state = test_helpers::test_app_state();
    let session_id = test_helpers::seed_session(&state).await;

    let sender = Uuid::new_v4();
    let (tx_sender, _rx_sender) = mpsc::channel::<Frame>(8);
    let mut current_sender = None;
    join(&state, session_id, &mut current_sender, sender, &tx_sender).await;

    let (tx_peer, mut rx_peer) = mpsc::channel::<Frame>(8);
    let mut current_peer = None;
    join(&state, session_id, &mut current_peer, Uuid::new_v4(), &tx_peer).await;

    let mut data = Data::new();
    data.insert("module_type".into(), json!("voucher"));
    data.insert("position".into(), json!(1));
    let text = request_text(session_id, "layout:insert", data);
    let replies = process_inbound_text(&state, &mut current_sender, sender, &tx_sender, &text).await;
    let instance_id = replies[0].data["module"]["id"].as_str().unwrap().to_string();
    let _ = recv_broadcast(&mut rx_peer).await; // the insert

    // Already last: move_down hits the boundary.
    let mut data = Data::new();
    data.insert("instance_id".into(), json!(instance_id));
    let text = request_text(session_id, "layout:move_down", data);
    let replies = process_inbound_text(&state, &mut current_sender, sender, &tx_sender, &text).await;

    assert_eq!(replies[0].status, Status::Done);
    assert_eq!(replies[0].data["moved"], false);
    assert_no_broadcast(&mut rx_peer).await;
}

#[tokio::test]
async fn hover_excludes_sender() {
    let state = test_helpers::test_app_state();
    let session_id = test_helpers::seed_session(&state).await;

    let sender = Uuid::new_v4();
    let (tx_sender, mut rx_sender) = mpsc::channel::<Frame>(8);
    let mut current_sender = None;
    join(&state, session_id, &mut current_sender, sender, &tx_sender).await;

    let (tx_peer, mut rx_peer) = mpsc::channel::<Frame>(8);
    let mut current_peer = None;
    join(&state, session_id, &mut current_peer, Uuid::new_v4(), &tx_peer).await;
    let _ = recv_broadcast(&mut rx_sender).await; // peer's join notification

    let mut data = Data::new();
    data.insert("position".into(), json!(2));
    let text = request_text(session_id, "layout:hover", data);
    let replies = process_inbound_text(&state, &mut current_sender, sender, &tx_sender, &text).await;

    // Hover is fire-and-forget: no reply to the sender at all.
    assert!(replies.is_empty());
    let relayed = recv_broadcast(&mut rx_peer).await;
    assert_eq!(relayed.syscall, "layout:hover");
    assert_eq!(relayed.data["position"], 2);
    assert_no_broadcast(&mut rx_sender).await;
}

#[tokio::test]
async fn configure_with_mismatched_settings_returns_error_code() {
    let state = test_helpers::test_app_state();
    let session_id = test_helpers::seed_session(&state).await;
    let client = Uuid::new_v4();
    let (tx, _rx) = mpsc::channel::<Frame>(8);
    let mut current = None;

    let replies = join(&state, session_id, &mut current, client, &tx).await;
    let bar_id = replies[0].data["modules"][0]["id"].as_str().unwrap().to_string();

    let mut data = Data::new();
    data.insert("instance_id".into(), json!(bar_id));
    data.insert(
        "settings".into(),
        json!({"type": "countdown", "title": "x", "backgroundColor": "#fff"}),
    );
    let text = request_text(session_id, "layout:configure", data);
    let replies = process_inbound_text(&state, &mut current, client, &tx, &text).await;

    assert_eq!(replies[0].status, Status::Error);
    assert_eq!(replies[0].data["code"], "E_SETTINGS_MISMATCH");
}

#[tokio::test]
async fn invalid_json_returns_gateway_error() {
    let state = test_helpers::test_app_state();
    let client = Uuid::new_v4();
    let (tx, _rx) = mpsc::channel::<Frame>(8);
    let mut current = None;

    let replies = process_inbound_text(&state, &mut current, client, &tx, "{not json").await;
    assert_eq!(replies[0].syscall, "gateway:error");
}
