use super::*;
use crate::state::test_helpers;

#[tokio::test]
async fn catalog_groups_cover_every_module() {
    let Json(groups) = catalog().await;
    let total: usize = groups.iter().map(|g| g.modules.len()).sum();
    assert_eq!(total, crate::catalog::all().len());
    assert_eq!(groups[0].category, crate::catalog::ModuleCategory::Navigation);
}

#[tokio::test]
async fn create_then_snapshot() {
    let state = test_helpers::test_app_state();
    let (status, Json(created)) = create_session(State(state.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let Json(snap) = snapshot(State(state), Path(created.session_id)).await.unwrap();
    assert_eq!(snap.modules.len(), 1);
    assert_eq!(snap.modules[0].module_type, crate::catalog::CATEGORY_BAR);
}

#[tokio::test]
async fn snapshot_of_unknown_session_is_404() {
    let state = test_helpers::test_app_state();
    let err = snapshot(State(state), Path(Uuid::new_v4())).await.unwrap_err();
    assert_eq!(err, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn preview_mode_defaults_to_mobile() {
    let state = test_helpers::test_app_state();
    let session_id = test_helpers::seed_session(&state).await;

    let Json(doc) = preview(
        State(state.clone()),
        Path(session_id),
        Query(PreviewQuery { mode: None }),
    )
    .await
    .unwrap();
    assert_eq!(doc.mode, ViewMode::Mobile);

    let Json(doc) = preview(
        State(state),
        Path(session_id),
        Query(PreviewQuery { mode: Some("desktop".into()) }),
    )
    .await
    .unwrap();
    assert_eq!(doc.mode, ViewMode::Desktop);
}

#[tokio::test]
async fn publish_reports_module_count() {
    let state = test_helpers::test_app_state();
    let session_id = test_helpers::seed_session(&state).await;

    let Json(resp) = publish(State(state), Path(session_id)).await.unwrap();
    assert!(!resp.published);
    assert_eq!(resp.modules, 1);
}
