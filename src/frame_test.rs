use super::*;

#[test]
fn request_sets_fields() {
    let frame = Frame::request("layout:insert", Data::new());
    assert_eq!(frame.syscall, "layout:insert");
    assert_eq!(frame.status, Status::Request);
    assert!(frame.parent_id.is_none());
    assert!(frame.session_id.is_none());
    assert!(frame.ts > 0);
}

#[test]
fn reply_inherits_context() {
    let session_id = Uuid::new_v4();
    let req = Frame::request("layout:remove", Data::new()).with_session_id(session_id);
    let item = req.item(Data::new());

    assert_eq!(item.parent_id, Some(req.id));
    assert_eq!(item.session_id, Some(session_id));
    assert_eq!(item.syscall, "layout:remove");
    assert_eq!(item.status, Status::Item);
}

#[test]
fn done_with_carries_data() {
    let req = Frame::request("session:join", Data::new());
    let done = req.done_with(Data::from([("ok".to_string(), serde_json::json!(true))]));
    assert_eq!(done.status, Status::Done);
    assert_eq!(done.parent_id, Some(req.id));
    assert_eq!(done.data.get("ok").and_then(serde_json::Value::as_bool), Some(true));
}

#[test]
fn terminal_statuses() {
    assert!(Status::Done.is_terminal());
    assert!(Status::Error.is_terminal());
    assert!(Status::Cancel.is_terminal());
    assert!(!Status::Request.is_terminal());
    assert!(!Status::Item.is_terminal());
}

#[test]
fn prefix_extraction() {
    let frame = Frame::request("layout:move_up", Data::new());
    assert_eq!(frame.prefix(), "layout");

    let frame = Frame::request("noseparator", Data::new());
    assert_eq!(frame.prefix(), "noseparator");
}

#[test]
fn json_round_trip() {
    let session_id = Uuid::new_v4();
    let original = Frame::request("session:join", Data::new())
        .with_session_id(session_id)
        .with_data("module_type", "graphicCarousel");

    let json = serde_json::to_string(&original).expect("serialize");
    let restored: Frame = serde_json::from_str(&json).expect("deserialize");

    assert_eq!(restored.id, original.id);
    assert_eq!(restored.session_id, Some(session_id));
    assert_eq!(restored.syscall, "session:join");
    assert_eq!(
        restored.data.get("module_type").and_then(|v| v.as_str()),
        Some("graphicCarousel")
    );
}

#[test]
fn error_from_typed() {
    #[derive(Debug, thiserror::Error)]
    #[error("module instance not found")]
    struct NotFound;

    impl ErrorCode for NotFound {
        fn error_code(&self) -> &'static str {
            "E_INSTANCE_NOT_FOUND"
        }
    }

    let req = Frame::request("layout:remove", Data::new());
    let err = req.error_from(&NotFound);

    assert_eq!(err.status, Status::Error);
    assert_eq!(err.data.get("code").and_then(|v| v.as_str()), Some("E_INSTANCE_NOT_FOUND"));
    assert_eq!(
        err.data.get("message").and_then(|v| v.as_str()),
        Some("module instance not found")
    );
    assert_eq!(
        err.data.get("retryable").and_then(serde_json::Value::as_bool),
        Some(false)
    );
}
