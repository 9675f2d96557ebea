//! `HttpOkrApi` against a mock Goals-OKR service.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header::AUTHORIZATION};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use axum::{Json, Router};
use okr_board::api::{HttpOkrApi, OkrApi};
use okr_board::board::{BoardController, BoardSession, BoardSource, DropOutcome, DropTarget};
use okr_board::config::API_PREFIX;
use okr_board::errors::{ApiError, BoardError};
use okr_common::{
    ItemKey, ItemType, KanbanColumn, KanbanItem, Language, UpdateNotesRequest,
    UpdatePositionRequest,
};
use serde_json::json;
use tokio::sync::Mutex;

#[derive(Default)]
struct MockState {
    items: Vec<KanbanItem>,
    auth: Vec<Option<String>>,
}

type Shared = Arc<Mutex<MockState>>;

fn card(
    id: i64,
    item_type: ItemType,
    item_id: i64,
    column: KanbanColumn,
    position: i32,
) -> KanbanItem {
    KanbanItem {
        id,
        user_id: Some(1),
        item_type,
        item_id,
        column_name: column,
        position,
        notes: None,
        number: None,
        read_only: false,
        created_at: None,
        updated_at: None,
    }
}

async fn list_items(
    State(state): State<Shared>,
    Path(user_id): Path<i64>,
    headers: HeaderMap,
) -> Json<Vec<KanbanItem>> {
    let mut state = state.lock().await;
    let auth = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.auth.push(auth);
    Json(
        state
            .items
            .iter()
            .filter(|i| i.user_id == Some(user_id))
            .cloned()
            .collect(),
    )
}

async fn update_position(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    Json(body): Json<UpdatePositionRequest>,
) -> Response {
    if body.position < 0 {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Position must be a non-negative integer" })),
        )
            .into_response();
    }
    let mut state = state.lock().await;
    match state.items.iter_mut().find(|i| i.id == id) {
        Some(item) => {
            item.column_name = body.column_name;
            item.position = body.position;
            Json(item.clone()).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn update_notes(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateNotesRequest>,
) -> Response {
    let mut state = state.lock().await;
    match state.items.iter_mut().find(|i| i.id == id) {
        Some(item) => {
            item.notes = body.notes;
            Json(item.clone()).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn delete_item(State(state): State<Shared>, Path(id): Path<i64>) -> StatusCode {
    let mut state = state.lock().await;
    let before = state.items.len();
    state.items.retain(|i| i.id != id);
    if state.items.len() == before {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::NO_CONTENT
    }
}

async fn user_goal_instance(Path(id): Path<i64>) -> Response {
    match id {
        12 => {
            Json(json!({ "id": 12, "userId": 1, "goalId": 100, "number": "G-1" })).into_response()
        }
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn goal(Path(id): Path<i64>) -> Response {
    match id {
        100 => Json(json!({
            "id": 100,
            "lifeDomainId": 10,
            "titleNl": "Gezondheid",
            "titleEn": "Health"
        }))
        .into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn user_initiative() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "boom")
}

async fn wheels() -> Json<serde_json::Value> {
    Json(json!([{ "id": 1, "wheelKey": "WHEEL_OF_LIFE", "nameEn": "Wheel of Life" }]))
}

async fn life_domains() -> Json<serde_json::Value> {
    Json(json!([{ "id": 10, "domainKey": "HEALTH", "titleEn": "Health", "wheelId": 1 }]))
}

async fn broken_objective() -> &'static str {
    "this is not json"
}

fn router(state: Shared) -> Router {
    let api = Router::new()
        .route("/users/{user_id}/kanban-items", get(list_items))
        .route("/kanban-items/{id}/position", put(update_position))
        .route("/kanban-items/{id}/notes", put(update_notes))
        .route("/kanban-items/{id}", axum::routing::delete(delete_item))
        .route("/user-goal-instances/{id}", get(user_goal_instance))
        .route("/goals/{id}", get(goal))
        .route("/initiatives/{id}", get(user_initiative))
        .route("/objectives/{id}", get(broken_objective))
        .route("/wheels", get(wheels))
        .route("/life-domains", get(life_domains))
        .with_state(state);
    Router::new().nest(API_PREFIX, api)
}

/// Start the mock service; returns the API root and the shared state.
async fn start(items: Vec<KanbanItem>) -> (String, Shared) {
    let state: Shared = Arc::new(Mutex::new(MockState {
        items,
        ..Default::default()
    }));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router(state.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}{}", addr, API_PREFIX), state)
}

fn client(root: &str, token: Option<&str>) -> HttpOkrApi {
    HttpOkrApi::new(root, token.map(str::to_string), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_list_sends_bearer_token() {
    let (root, state) = start(vec![card(1, ItemType::Goal, 12, KanbanColumn::Todo, 0)]).await;

    let items = client(&root, Some("t0k")).list_kanban_items(1).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].column_name, KanbanColumn::Todo);

    client(&root, None).list_kanban_items(1).await.unwrap();

    let state = state.lock().await;
    assert_eq!(state.auth[0].as_deref(), Some("Bearer t0k"));
    assert_eq!(state.auth[1], None);
}

#[tokio::test]
async fn test_not_found_is_distinguishable() {
    let (root, _) = start(Vec::new()).await;
    let err = client(&root, None).get_goal(404).await.unwrap_err();
    assert!(err.is_not_found(), "{err:?}");
}

#[tokio::test]
async fn test_server_error_keeps_body() {
    let (root, _) = start(Vec::new()).await;
    let err = client(&root, None).get_user_initiative(3).await.unwrap_err();
    match err {
        ApiError::Status { status, message, .. } => {
            assert_eq!(status, 500);
            assert_eq!(message, "boom");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_error_field_becomes_message() {
    let (root, _) = start(vec![card(1, ItemType::Goal, 12, KanbanColumn::Todo, 0)]).await;
    let err = client(&root, None)
        .update_position(1, KanbanColumn::Done, -1)
        .await
        .unwrap_err();
    match err {
        ApiError::Status { status, message, .. } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Position must be a non-negative integer");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let (root, _) = start(Vec::new()).await;
    let err = client(&root, None).get_objective(1).await.unwrap_err();
    assert!(matches!(err, ApiError::Decode { .. }), "{err:?}");
}

#[tokio::test]
async fn test_mutations_round_trip() {
    let (root, state) = start(vec![card(1, ItemType::Goal, 12, KanbanColumn::Todo, 0)]).await;
    let api = client(&root, None);

    let moved = api.update_position(1, KanbanColumn::InReview, 3).await.unwrap();
    assert_eq!(moved.column_name, KanbanColumn::InReview);
    assert_eq!(moved.position, 3);

    let noted = api.update_notes(1, Some("halfway".into())).await.unwrap();
    assert_eq!(noted.notes.as_deref(), Some("halfway"));

    api.delete_kanban_item(1).await.unwrap();
    assert!(state.lock().await.items.is_empty());
    assert!(api.delete_kanban_item(1).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = client(&format!("http://{}{}", addr, API_PREFIX), None);
    let err = api.list_wheels().await.unwrap_err();
    assert!(matches!(err, ApiError::Transport { .. }), "{err:?}");
}

#[tokio::test]
async fn test_controller_over_http() {
    let (root, state) = start(vec![
        card(1, ItemType::Goal, 12, KanbanColumn::Todo, 0),
        card(2, ItemType::Goal, 99, KanbanColumn::InProgress, 0),
    ])
    .await;
    let session = BoardSession {
        language: Language::Nl,
        current_user: Some(1),
        wip_limits: Default::default(),
    };
    let mut controller =
        BoardController::new(Arc::new(client(&root, None)), session, BoardSource::User(1));
    controller.load().await.unwrap();

    let key = ItemKey::new(ItemType::Goal, 12);
    assert_eq!(controller.titles().title(&key), Some("Gezondheid"));
    assert_eq!(controller.titles().life_domain_id(&key), Some(10));
    // Card 2 has no instance on the server and falls back.
    assert_eq!(
        controller.titles().title_or_fallback(&ItemKey::new(ItemType::Goal, 99)),
        ItemKey::new(ItemType::Goal, 99).fallback_title()
    );

    let outcome = controller
        .move_item(1, DropTarget::Column(KanbanColumn::InProgress))
        .await
        .unwrap();
    assert!(matches!(outcome, DropOutcome::Moved { position: 1, .. }));
    {
        let state = state.lock().await;
        let moved = state.items.iter().find(|i| i.id == 1).unwrap();
        assert_eq!(moved.column_name, KanbanColumn::InProgress);
        assert_eq!(moved.position, 1);
    }
    assert_eq!(
        controller.items().iter().find(|i| i.id == 1).unwrap().column_name,
        KanbanColumn::InProgress,
        "board reloaded after the move"
    );

    let confirmation = controller.request_delete(1).unwrap();
    assert!(confirmation.prompt.contains("\"Gezondheid\""));
    controller.confirm_delete(confirmation).await.unwrap();
    assert_eq!(controller.items().len(), 1);

    let err = controller.update_notes(1, Some("gone".into())).await.unwrap_err();
    assert!(matches!(err, BoardError::ItemNotFound { id: 1 }));
}
