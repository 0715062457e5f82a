// tests/survey_tests.rs

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use lms_client::api::HttpApi;
use lms_client::error::ClientError;
use lms_client::session::SessionIdentity;
use lms_client::stores::survey::SurveyStore;

/// Shared state behind the mock remote API.
#[derive(Default)]
struct MockApiState {
    responses: Mutex<Vec<serde_json::Value>>,
    requests: AtomicUsize,
    reject_submit: AtomicBool,
    fail_list: AtomicBool,
}

async fn spawn_mock_api() -> (String, Arc<MockApiState>) {
    let state = Arc::new(MockApiState::default());

    let app = Router::new()
        .route("/survey-responses/{user_id}", get(list_responses))
        .route("/survey-responses", post(submit_response))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (address, state)
}

async fn list_responses(
    State(state): State<Arc<MockApiState>>,
    Path(_user_id): Path<String>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)> {
    state.requests.fetch_add(1, Ordering::SeqCst);
    if state.fail_list.load(Ordering::SeqCst) {
        return Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": "survey lookup failed" })),
        ));
    }

    let responses = state.responses.lock().unwrap().clone();
    Ok(Json(serde_json::json!({ "responses": responses })))
}

/// The canonical stored response carries a server-issued timestamp.
async fn submit_response(
    State(state): State<Arc<MockApiState>>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)> {
    state.requests.fetch_add(1, Ordering::SeqCst);
    if state.reject_submit.load(Ordering::SeqCst) {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({ "error": "answers out of range" })),
        ));
    }

    let response = serde_json::json!({
        "categoryId": body["categoryId"],
        "answers": body["answers"],
        "timestamp": "2024-01-01T00:00:00Z"
    });
    state.responses.lock().unwrap().push(response.clone());
    Ok(Json(serde_json::json!({ "response": response })))
}

fn identity(user_id: &str) -> SessionIdentity {
    SessionIdentity {
        user_id: Some(user_id.to_string()),
        role: None,
    }
}

fn unique_user() -> String {
    format!("u_{}", &uuid::Uuid::new_v4().to_string()[..8])
}

fn seeded_response(category_id: &str, answers: &[i64], timestamp: &str) -> serde_json::Value {
    serde_json::json!({
        "categoryId": category_id,
        "answers": answers,
        "timestamp": timestamp
    })
}

#[tokio::test]
async fn add_response_appends_canonical_entry() {
    // Arrange
    let (address, _state) = spawn_mock_api().await;
    let api = Arc::new(HttpApi::new(&address).unwrap());
    let store = SurveyStore::new(api, identity(&unique_user()));
    store.initialize().await;

    // Act
    let response = store.add_response("cat1", vec![4, 5, 3]).await.unwrap();

    // Assert: the local entry is exactly the server's canonical object
    assert_eq!(response.category_id, "cat1");
    assert_eq!(response.answers, vec![4, 5, 3]);
    assert_eq!(
        response.timestamp,
        "2024-01-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap()
    );
    let list = store.responses();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0], response);
}

#[tokio::test]
async fn prior_entries_remain_unchanged_and_ordered() {
    // Arrange
    let (address, state) = spawn_mock_api().await;
    {
        let mut responses = state.responses.lock().unwrap();
        responses.push(seeded_response("cat1", &[5, 5], "2023-12-01T08:00:00Z"));
        responses.push(seeded_response("cat2", &[3], "2023-12-02T08:00:00Z"));
    }
    let api = Arc::new(HttpApi::new(&address).unwrap());
    let store = SurveyStore::new(api, identity(&unique_user()));
    store.initialize().await;
    assert_eq!(store.responses().len(), 2);

    // Act
    store.add_response("cat3", vec![1, 2]).await.unwrap();

    // Assert
    let list = store.responses();
    assert_eq!(list.len(), 3);
    assert_eq!(list[0].category_id, "cat1");
    assert_eq!(list[1].category_id, "cat2");
    assert_eq!(list[2].category_id, "cat3");
}

#[tokio::test]
async fn add_response_failure_leaves_list_unchanged() {
    // Arrange
    let (address, state) = spawn_mock_api().await;
    state
        .responses
        .lock()
        .unwrap()
        .push(seeded_response("cat1", &[5], "2023-12-01T08:00:00Z"));
    let api = Arc::new(HttpApi::new(&address).unwrap());
    let store = SurveyStore::new(api, identity(&unique_user()));
    store.initialize().await;
    state.reject_submit.store(true, Ordering::SeqCst);

    // Act
    let err = store.add_response("cat2", vec![9]).await.unwrap_err();

    // Assert: the remote message is surfaced, the list is untouched
    assert_eq!(err.message(), "answers out of range");
    assert!(matches!(err, ClientError::Remote { status: 422, .. }));
    let list = store.responses();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].category_id, "cat1");
}

#[tokio::test]
async fn add_response_without_identity_is_rejected() {
    // Arrange
    let (address, state) = spawn_mock_api().await;
    let api = Arc::new(HttpApi::new(&address).unwrap());
    let store = SurveyStore::new(api, SessionIdentity::default());
    store.initialize().await;

    // Act
    let err = store.add_response("cat1", vec![4]).await.unwrap_err();

    // Assert: explicit failure, no request issued
    assert!(matches!(err, ClientError::NotAuthenticated));
    assert!(!err.message().is_empty());
    assert!(store.responses().is_empty());
    assert_eq!(state.requests.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn initialize_failure_yields_empty_list() {
    // Arrange
    let (address, state) = spawn_mock_api().await;
    state
        .responses
        .lock()
        .unwrap()
        .push(seeded_response("cat1", &[5], "2023-12-01T08:00:00Z"));
    state.fail_list.store(true, Ordering::SeqCst);
    let api = Arc::new(HttpApi::new(&address).unwrap());
    let store = SurveyStore::new(api, identity(&unique_user()));

    // Act
    store.initialize().await;

    // Assert
    assert!(store.responses().is_empty());
    assert!(!store.is_loading());
}
